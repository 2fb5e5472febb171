use super::*;

use crate::bitmap::{INDEX_MASK, LAYER_BG, LAYER_CHAR, LAYER_FG, LAYER_SPRITE};
use crate::sprite;
use crate::tilemap::TileInfo;

/// Palette index filling the field before any layer lands.
const BACKDROP_INDEX: u16 = 0x100;

const SPRITE_PALETTE_BASE: u16 = 0x000;
const CHAR_PALETTE_BASE: u16 = 0x100;
const FG_PALETTE_BASE: u16 = 0x200;
const BG_PALETTE_BASE: u16 = 0x300;

impl Mainboard {
    /// Composite one frame from current state.
    ///
    /// Layers land back to front — background, foreground, characters,
    /// sprites — into the indexed bitmap, which then resolves through the
    /// palette cache into the RGBA framebuffer. Identical state composites
    /// to a byte-identical frame.
    pub fn draw_frame(&mut self) {
        self.framebuffer.fill(0);
        self.bitmap.fill(BACKDROP_INDEX);

        {
            let ram = &self.bg_ram;
            self.bg_tilemap
                .draw(&mut self.bitmap, BG_PALETTE_BASE, LAYER_BG, |index| {
                    scroll_tile_info(ram, index)
                });
        }
        if !env::bg_only() {
            let ram = &self.fg_ram;
            self.fg_tilemap
                .draw(&mut self.bitmap, FG_PALETTE_BASE, LAYER_FG, |index| {
                    scroll_tile_info(ram, index)
                });
            let ram = &self.char_ram;
            self.char_tilemap
                .draw(&mut self.bitmap, CHAR_PALETTE_BASE, LAYER_CHAR, |index| {
                    char_tile_info(ram, index)
                });
            if !env::no_sprites() {
                sprite::draw(
                    &mut self.bitmap,
                    &self.sprite_ram,
                    &self.sprite_rom,
                    SPRITE_PALETTE_BASE,
                    LAYER_SPRITE,
                );
            }
        }

        // the CRT shows 224 of the 256 lines, starting 16 down
        for y in 0..SCREEN_HEIGHT {
            let src = self.bitmap.row(y + VISIBLE_TOP);
            let dst = &mut self.framebuffer[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH];
            for (dst, &pixel) in dst.iter_mut().zip(src) {
                *dst = self.palette.color((pixel & INDEX_MASK) as usize);
            }
        }
    }
}

/// Character cells: the low byte and the two LSBs of the high byte form a
/// 10-bit tile code, the four MSBs the color.
fn char_tile_info(ram: &[u8], index: usize) -> TileInfo {
    let lo = ram[index];
    let hi = ram[index + 0x400];
    TileInfo {
        code: (hi as u16 & 0x03) << 8 | lo as u16,
        color: hi >> 4,
    }
}

/// The 16x16 scroll layers carry 11-bit codes in halves of 0x200.
fn scroll_tile_info(ram: &[u8], index: usize) -> TileInfo {
    let lo = ram[index];
    let hi = ram[index + 0x200];
    TileInfo {
        code: (hi as u16 & 0x07) << 8 | lo as u16,
        color: hi >> 4,
    }
}
