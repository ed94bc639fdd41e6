//! Collaborator interfaces between the core and its host.
//!
//! The core never opens a window or polls an OS event queue. A host hands
//! `GameBoy::run` something that can show a frame and something that can
//! report button state.

use crate::machine::JoypadState;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn new_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }
}

/// Default DMG greyscale: shade 0 is white, shade 3 is black.
pub const DMG_PALETTE: [Color; 4] = [
    Color::WHITE,
    Color::new_rgb(0xAA, 0xAA, 0xAA),
    Color::new_rgb(0x55, 0x55, 0x55),
    Color::BLACK,
];

/// Receives every completed frame.
///
/// `frame` holds `SCREEN_WIDTH * SCREEN_HEIGHT` shade indices (0..=3) in
/// row-major order; `palette` maps each shade to a color.
pub trait Display {
    fn present(&mut self, frame: &[u8], palette: &[Color; 4]);
}

/// Source of button state and of the request to stop.
pub trait Input {
    /// Current state of all eight buttons.
    fn poll(&mut self) -> JoypadState;

    /// Checked once per frame; returning true makes `GameBoy::run` return.
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Expand a shade-index frame into packed RGB24 using `palette`.
pub fn frame_to_rgb24(frame: &[u8], palette: &[Color; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() * 3);
    for &shade in frame {
        let (r, g, b) = palette[(shade & 0x03) as usize].rgb();
        out.extend_from_slice(&[r, g, b]);
    }
    out
}
