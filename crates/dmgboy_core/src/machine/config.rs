use typed_builder::TypedBuilder;

use crate::frontend::{Color, DMG_PALETTE};

const DEFAULT_FRAME_RATE: f64 = 59.7275;

/// Knobs for a [`GameBoy`](super::GameBoy) instance.
///
/// ```
/// use dmgboy_core::GameBoyConfig;
///
/// let config = GameBoyConfig::builder().frame_pacing(false).build();
/// assert_eq!(config.cycles_per_frame(), 70_224);
/// ```
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct GameBoyConfig {
    /// Sleep between frames so `run` tracks real time.
    #[builder(default = true)]
    pub frame_pacing: bool,
    /// Shades used when presenting the 2-bit framebuffer.
    #[builder(default = DMG_PALETTE)]
    pub palette: [Color; 4],
    /// Frames per second. NaN, infinite and sub-1 Hz values fall back to
    /// the DMG refresh rate.
    #[builder(default = DEFAULT_FRAME_RATE)]
    pub frame_rate: f64,
    /// Master clock in Hz.
    #[builder(default = 4_194_304)]
    pub clock_hz: u32,
}

impl Default for GameBoyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GameBoyConfig {
    /// Clock cycles in one frame, rounded to the nearest cycle.
    pub fn cycles_per_frame(&self) -> u32 {
        (f64::from(self.clock_hz) / self.effective_frame_rate()).round() as u32
    }

    pub(super) fn has_valid_frame_rate(&self) -> bool {
        (1.0..=f64::MAX).contains(&self.frame_rate)
    }

    /// `frame_rate`, or the DMG default when it is unusable.
    pub fn effective_frame_rate(&self) -> f64 {
        if self.has_valid_frame_rate() {
            self.frame_rate
        } else {
            DEFAULT_FRAME_RATE
        }
    }
}
