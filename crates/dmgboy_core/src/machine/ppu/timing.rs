use super::{Interrupt, Lcdc, Ppu, PpuMode, StatSelect};

const OAM_SCAN_DOTS: u32 = 80;
const DRAWING_DOTS: u32 = 172;
const HBLANK_DOTS: u32 = 204;
const LINE_DOTS: u32 = 456;

const VISIBLE_LINES: u8 = 144;
const TOTAL_LINES: u8 = 154;

/// Dots in one full frame: 144 visible lines plus 10 VBlank lines.
pub(crate) const FRAME_DOTS: u32 = LINE_DOTS * TOTAL_LINES as u32;

impl Ppu {
    #[inline]
    fn mode_length(&self) -> u32 {
        match self.mode {
            PpuMode::OamScan => OAM_SCAN_DOTS,
            PpuMode::Drawing => DRAWING_DOTS,
            PpuMode::HBlank => HBLANK_DOTS,
            PpuMode::VBlank => LINE_DOTS,
        }
    }

    /// Advance the timing state machine by `cycles` dots.
    ///
    /// Any number of mode changes may happen in one call. Nothing moves
    /// while the LCD is off.
    pub fn update(&mut self, cycles: u32) {
        if !self.lcdc.contains(Lcdc::LCD_ENABLE) {
            return;
        }

        self.dots += cycles;
        while self.dots >= self.mode_length() {
            self.dots -= self.mode_length();
            self.advance_mode();
            self.update_stat_line();
        }
    }

    fn advance_mode(&mut self) {
        match self.mode {
            PpuMode::OamScan => self.mode = PpuMode::Drawing,
            PpuMode::Drawing => {
                self.bufferize_scanline();
                self.mode = PpuMode::HBlank;
            }
            PpuMode::HBlank => {
                self.ly += 1;
                if self.ly >= VISIBLE_LINES {
                    self.mode = PpuMode::VBlank;
                    self.requested |= Interrupt::VBLANK;
                } else {
                    self.mode = PpuMode::OamScan;
                }
            }
            PpuMode::VBlank => {
                self.ly += 1;
                if self.ly >= TOTAL_LINES {
                    self.ly = 0;
                    self.mode = PpuMode::OamScan;
                    self.frame_ready = true;
                    self.frames += 1;
                }
            }
        }
    }

    /// Recompute the composite STAT condition and request the STAT
    /// interrupt on a false-to-true transition only.
    pub(super) fn update_stat_line(&mut self) {
        let select = self.stat_select;
        let mode_line = match self.mode {
            PpuMode::HBlank => select.contains(StatSelect::HBLANK),
            PpuMode::VBlank => select.contains(StatSelect::VBLANK),
            PpuMode::OamScan => select.contains(StatSelect::OAM),
            PpuMode::Drawing => false,
        };
        let lyc_line = self.ly == self.lyc && select.contains(StatSelect::LYC);
        let line = self.lcdc.contains(Lcdc::LCD_ENABLE) && (mode_line || lyc_line);

        if line && !self.stat_line {
            self.requested |= Interrupt::STAT;
        }
        self.stat_line = line;
    }
}
