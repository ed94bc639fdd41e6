pub mod cpu;
mod error;
pub mod frontend;
pub mod machine;

pub use error::GbError;
pub use frontend::{Color, Display, Input, DMG_PALETTE};
pub use machine::{Button, CartridgeHeader, GameBoy, GameBoyConfig, JoypadState};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
