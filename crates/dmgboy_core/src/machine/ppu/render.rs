use super::{Lcdc, Ppu};
use crate::SCREEN_WIDTH;

const MAX_SPRITES_PER_LINE: usize = 10;
const OAM_ENTRIES: usize = 40;

/// One OAM entry. Y and X are stored with a +16/+8 offset.
#[derive(Clone, Copy, Debug)]
struct Sprite {
    y: u8,
    x: u8,
    tile: u8,
    flags: u8,
}

impl Sprite {
    fn from_oam(bytes: &[u8]) -> Self {
        Self {
            y: bytes[0],
            x: bytes[1],
            tile: bytes[2],
            flags: bytes[3],
        }
    }

    #[inline]
    fn top(&self) -> i16 {
        i16::from(self.y) - 16
    }

    #[inline]
    fn left(&self) -> i16 {
        i16::from(self.x) - 8
    }

    #[inline]
    fn behind_bg(&self) -> bool {
        self.flags & 0x80 != 0
    }

    #[inline]
    fn flip_y(&self) -> bool {
        self.flags & 0x40 != 0
    }

    #[inline]
    fn flip_x(&self) -> bool {
        self.flags & 0x20 != 0
    }

    #[inline]
    fn uses_obp1(&self) -> bool {
        self.flags & 0x10 != 0
    }
}

/// Combine the two bit-planes of a tile row at `bit` (7 = leftmost).
#[inline]
fn color_index(lo: u8, hi: u8, bit: u8) -> u8 {
    (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01)
}

/// Map a 2-bit color index through a DMG palette register.
#[inline]
fn shade(palette: u8, index: u8) -> u8 {
    (palette >> (index * 2)) & 0x03
}

impl Ppu {
    #[inline]
    fn vram_at(&self, addr: u16) -> u8 {
        self.vram[(addr - 0x8000) as usize & 0x1FFF]
    }

    /// Both bit-planes of `row` of the tile starting at `tile_addr`.
    #[inline]
    fn tile_row(&self, tile_addr: u16, row: u8) -> (u8, u8) {
        let addr = tile_addr + u16::from(row) * 2;
        (self.vram_at(addr), self.vram_at(addr + 1))
    }

    /// BG/window tile data: unsigned from 0x8000, or signed around 0x9000.
    fn bg_tile_address(&self, index: u8) -> u16 {
        if self.lcdc.contains(Lcdc::TILE_DATA_UNSIGNED) {
            0x8000 + u16::from(index) * 16
        } else {
            0x9000u16.wrapping_add_signed(i16::from(index as i8) * 16)
        }
    }

    /// Raw color index at (`x`, `y`) of the 256x256 map selected by
    /// `map_high`.
    fn map_color(&self, map_high: bool, x: u8, y: u8) -> u8 {
        let map_base: u16 = if map_high { 0x9C00 } else { 0x9800 };
        let entry = map_base + u16::from(y / 8) * 32 + u16::from(x / 8);
        let tile = self.vram_at(entry);
        let (lo, hi) = self.tile_row(self.bg_tile_address(tile), y % 8);
        color_index(lo, hi, 7 - (x % 8))
    }

    /// Compose line LY into the framebuffer: background or window first,
    /// then sprites on top.
    pub(super) fn bufferize_scanline(&mut self) {
        #[cfg(test)]
        {
            self.scanlines_rendered += 1;
        }

        let ly = self.ly;
        let row = usize::from(ly) * SCREEN_WIDTH;
        if row + SCREEN_WIDTH > self.framebuffer.len() {
            return;
        }

        // Raw BG indices, kept for the sprite priority check.
        let mut bg_line = [0u8; SCREEN_WIDTH];
        let window_line = self.lcdc.contains(Lcdc::WINDOW_ENABLE) && ly >= self.wy;

        for (x, raw) in bg_line.iter_mut().enumerate() {
            let x = x as u8;
            if !self.lcdc.contains(Lcdc::BG_ENABLE) {
                *raw = 0;
            } else if window_line && u16::from(x) + 7 >= u16::from(self.wx) {
                *raw = self.map_color(
                    self.lcdc.contains(Lcdc::WINDOW_MAP_HIGH),
                    x.wrapping_add(7).wrapping_sub(self.wx),
                    ly - self.wy,
                );
            } else {
                *raw = self.map_color(
                    self.lcdc.contains(Lcdc::BG_MAP_HIGH),
                    x.wrapping_add(self.scx),
                    ly.wrapping_add(self.scy),
                );
            }
        }

        for (x, &raw) in bg_line.iter().enumerate() {
            self.framebuffer[row + x] = shade(self.bgp, raw);
        }

        if self.lcdc.contains(Lcdc::OBJ_ENABLE) {
            self.compose_sprites(&bg_line);
        }
    }

    /// Sprites overlapping LY, the first ten in OAM order.
    fn line_sprites(&self, height: i16) -> Vec<Sprite> {
        let ly = i16::from(self.ly);
        self.oam
            .chunks_exact(4)
            .take(OAM_ENTRIES)
            .map(Sprite::from_oam)
            .filter(|s| (s.top()..s.top() + height).contains(&ly))
            .take(MAX_SPRITES_PER_LINE)
            .collect()
    }

    fn compose_sprites(&mut self, bg_line: &[u8; SCREEN_WIDTH]) {
        let tall = self.lcdc.contains(Lcdc::OBJ_TALL);
        let height: i16 = if tall { 16 } else { 8 };
        let sprites = self.line_sprites(height);
        if sprites.is_empty() {
            return;
        }

        let ly = i16::from(self.ly);
        let row = usize::from(self.ly) * SCREEN_WIDTH;

        for x in 0..SCREEN_WIDTH as i16 {
            // Lowest X wins; on a tie the earlier OAM entry wins.
            let mut winner: Option<(i16, Sprite, u8)> = None;
            for sprite in &sprites {
                let col = x - sprite.left();
                if !(0..8).contains(&col) {
                    continue;
                }

                let mut line = (ly - sprite.top()) as u8;
                if sprite.flip_y() {
                    line = height as u8 - 1 - line;
                }
                let tile = if tall { sprite.tile & 0xFE } else { sprite.tile };
                let (lo, hi) = self.tile_row(0x8000 + u16::from(tile) * 16, line);
                let bit = if sprite.flip_x() { col as u8 } else { 7 - col as u8 };
                let index = color_index(lo, hi, bit);
                if index == 0 {
                    continue;
                }

                if winner.map_or(true, |(left, _, _)| sprite.left() < left) {
                    winner = Some((sprite.left(), *sprite, index));
                }
            }

            let Some((_, sprite, index)) = winner else {
                continue;
            };
            if sprite.behind_bg() && bg_line[x as usize] != 0 {
                continue;
            }
            let palette = if sprite.uses_obp1() { self.obp1 } else { self.obp0 };
            self.framebuffer[row + x as usize] = shade(palette, index);
        }
    }
}
