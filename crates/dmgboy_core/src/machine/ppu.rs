//! Picture processing unit.
//!
//! Owns VRAM, OAM and the LCD registers, runs the four-mode timing state
//! machine and composes the framebuffer one scanline at a time.

mod dma;
mod render;
mod timing;

pub(crate) use dma::OamDma;
pub(crate) use timing::FRAME_DOTS;

use super::{Interrupt, MemoryMapped};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const SCY_ADDR: u16 = 0xFF42;
pub const SCX_ADDR: u16 = 0xFF43;
pub const LY_ADDR: u16 = 0xFF44;
pub const LYC_ADDR: u16 = 0xFF45;
pub const DMA_ADDR: u16 = 0xFF46;
pub const BGP_ADDR: u16 = 0xFF47;
pub const OBP0_ADDR: u16 = 0xFF48;
pub const OBP1_ADDR: u16 = 0xFF49;
pub const WY_ADDR: u16 = 0xFF4A;
pub const WX_ADDR: u16 = 0xFF4B;

const VRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;

bitflags::bitflags! {
    /// LCDC (0xFF40).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Lcdc: u8 {
        const BG_ENABLE          = 1 << 0;
        const OBJ_ENABLE         = 1 << 1;
        const OBJ_TALL           = 1 << 2;
        const BG_MAP_HIGH        = 1 << 3;
        const TILE_DATA_UNSIGNED = 1 << 4;
        const WINDOW_ENABLE      = 1 << 5;
        const WINDOW_MAP_HIGH    = 1 << 6;
        const LCD_ENABLE         = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Interrupt-select bits of STAT (0xFF41).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StatSelect: u8 {
        const HBLANK = 1 << 3;
        const VBLANK = 1 << 4;
        const OAM    = 1 << 5;
        const LYC    = 1 << 6;
    }
}

/// PPU mode as reported in STAT bits 1-0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PpuMode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Drawing = 3,
}

pub struct Ppu {
    vram: Box<[u8; VRAM_SIZE]>,
    oam: [u8; OAM_SIZE],

    lcdc: Lcdc,
    stat_select: StatSelect,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    dma_reg: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    mode: PpuMode,
    /// Dots spent in the current mode.
    dots: u32,
    /// Last value of the composite STAT condition; the interrupt fires
    /// only on its rising edge.
    stat_line: bool,

    /// One shade index (0..=3) per pixel.
    framebuffer: Box<[u8; SCREEN_WIDTH * SCREEN_HEIGHT]>,
    frame_ready: bool,
    frames: u64,

    dma: Option<OamDma>,
    requested: Interrupt,

    #[cfg(test)]
    pub(super) scanlines_rendered: u32,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// PPU with post-boot registers, at the start of a frame.
    pub fn new() -> Self {
        Self {
            vram: Box::new([0; VRAM_SIZE]),
            oam: [0; OAM_SIZE],
            lcdc: Lcdc::from_bits_retain(0x91),
            stat_select: StatSelect::empty(),
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            dma_reg: 0xFF,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            mode: PpuMode::OamScan,
            dots: 0,
            stat_line: false,
            framebuffer: Box::new([0; SCREEN_WIDTH * SCREEN_HEIGHT]),
            frame_ready: false,
            frames: 0,
            dma: None,
            requested: Interrupt::empty(),
            #[cfg(test)]
            scanlines_rendered: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    #[inline]
    pub fn ly(&self) -> u8 {
        self.ly
    }

    #[inline]
    pub fn lcd_enabled(&self) -> bool {
        self.lcdc.contains(Lcdc::LCD_ENABLE)
    }

    /// Frames completed since power-on.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer[..]
    }

    /// True once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    #[inline]
    pub fn dma_active(&self) -> bool {
        self.dma.is_some()
    }

    pub(crate) fn take_dma(&mut self) -> Option<OamDma> {
        self.dma.take()
    }

    pub(crate) fn resume_dma(&mut self, dma: OamDma) {
        self.dma = Some(dma);
    }

    /// OAM write on behalf of the DMA engine, bypassing mode checks.
    pub(crate) fn dma_write_oam(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.oam.get_mut(index) {
            *slot = value;
        }
    }

    fn read_stat(&self) -> u8 {
        let coincidence = if self.ly == self.lyc { 0x04 } else { 0x00 };
        0x80 | self.stat_select.bits() | coincidence | self.mode as u8
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_enabled();
        self.lcdc = Lcdc::from_bits_retain(value);
        let now_on = self.lcd_enabled();

        if was_on && !now_on {
            log::debug!("LCD off at LY={}", self.ly);
            self.dots = 0;
            self.ly = 0;
            self.mode = PpuMode::HBlank;
            self.stat_line = false;
            self.framebuffer.fill(0);
        } else if !was_on && now_on {
            log::debug!("LCD on");
            self.dots = 0;
            self.ly = 0;
            self.mode = PpuMode::OamScan;
            self.update_stat_line();
        }
    }
}

impl MemoryMapped for Ppu {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0x8000..=0x9FFF | 0xFE00..=0xFE9F | LCDC_ADDR..=WX_ADDR)
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            LCDC_ADDR => self.lcdc.bits(),
            STAT_ADDR => self.read_stat(),
            SCY_ADDR => self.scy,
            SCX_ADDR => self.scx,
            LY_ADDR => self.ly,
            LYC_ADDR => self.lyc,
            DMA_ADDR => self.dma_reg,
            BGP_ADDR => self.bgp,
            OBP0_ADDR => self.obp0,
            OBP1_ADDR => self.obp1,
            WY_ADDR => self.wy,
            WX_ADDR => self.wx,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = value,
            LCDC_ADDR => self.write_lcdc(value),
            STAT_ADDR => {
                self.stat_select = StatSelect::from_bits_truncate(value);
                self.update_stat_line();
            }
            SCY_ADDR => self.scy = value,
            SCX_ADDR => self.scx = value,
            // LY is read-only.
            LY_ADDR => {}
            LYC_ADDR => {
                self.lyc = value;
                self.update_stat_line();
            }
            DMA_ADDR => {
                self.dma_reg = value;
                log::debug!("OAM DMA from 0x{:04X}", u16::from(value) << 8);
                self.dma = Some(OamDma::new(value));
            }
            BGP_ADDR => self.bgp = value,
            OBP0_ADDR => self.obp0 = value,
            OBP1_ADDR => self.obp1 = value,
            WY_ADDR => self.wy = value,
            WX_ADDR => self.wx = value,
            _ => {}
        }
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}
