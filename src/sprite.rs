//! Sprite rasterizer.
//!
//! Sprite RAM holds 256 descriptors of 8 bytes:
//!
//! ```text
//!  byte     bit        usage
//! --------+----------+----------------
//!       0 | xxxx---- | code bank
//!         | -----x-- | visible
//!         | ------x- | flip y
//!         | -------x | flip x
//!       1 | xxxxxxxx | code low byte
//!       2 | ------xx | size (8, 16, 32, 64 px square)
//!       3 | xx------ | priority
//!         | --x----- | y sign
//!         | ---x---- | x sign
//!         | ----xxxx | color
//!       4 | xxxxxxxx | y position
//!       5 | xxxxxxxx | x position
//! ```
//!
//! Sprites are built from 8x8 tiles; a larger sprite picks consecutive
//! codes through the fixed [`LAYOUT`] order. Descriptors earlier in RAM
//! have priority over later ones, and the 2-bit priority field selects
//! which tile layers obscure the sprite.

use bitflags::bitflags;

use crate::bitmap::{Bitmap, LAYER_BG, LAYER_CHAR, LAYER_FG, LAYER_SHIFT, LAYER_SPRITE};
use crate::tile::TileRom;

const SPRITE_BYTES: usize = 8;

bitflags! {
    /// Control bits in descriptor byte 0 (the high nibble is the code bank).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct SpriteCtrl: u8 {
        const FLIP_X = 0x01;
        const FLIP_Y = 0x02;
        const VISIBLE = 0x04;
    }
}

/// Tile order within a 64x64 sprite; smaller sprites use the top-left
/// portion. The pattern is fixed by the sprite generator's address wiring.
const LAYOUT: [[u8; 8]; 8] = [
    [0, 1, 4, 5, 16, 17, 20, 21],
    [2, 3, 6, 7, 18, 19, 22, 23],
    [8, 9, 12, 13, 24, 25, 28, 29],
    [10, 11, 14, 15, 26, 27, 30, 31],
    [32, 33, 36, 37, 48, 49, 52, 53],
    [34, 35, 38, 39, 50, 51, 54, 55],
    [40, 41, 44, 45, 56, 57, 60, 61],
    [42, 43, 46, 47, 58, 59, 62, 63],
];

/// Tile layers that obscure a sprite with the given priority field.
/// Every mask contains the sprite tag itself, so earlier descriptors are
/// never painted over by later ones.
fn priority_mask(priority: u8) -> u16 {
    match priority & 0x03 {
        0 => LAYER_SPRITE,
        1 => LAYER_SPRITE | LAYER_CHAR,
        2 => LAYER_SPRITE | LAYER_CHAR | LAYER_FG,
        _ => LAYER_SPRITE | LAYER_CHAR | LAYER_FG | LAYER_BG,
    }
}

/// Draw every enabled sprite in `ram` into `dst`, in ascending RAM order.
pub(crate) fn draw(dst: &mut Bitmap, ram: &[u8], rom: &TileRom, palette_base: u16, layer: u16) {
    for desc in ram.chunks_exact(SPRITE_BYTES) {
        let ctrl = SpriteCtrl::from_bits_truncate(desc[0]);
        if !ctrl.contains(SpriteCtrl::VISIBLE) {
            continue;
        }

        let size = desc[2] & 0x03;
        let side = 1usize << size; // tiles per side
        let mut code = desc[1] as u16 | ((desc[0] as u16 & 0xF0) << 4);
        // the generator ignores the low code bits of multi-tile sprites
        code &= !((1 << (2 * size)) - 1);

        let attrs = desc[3];
        let color = (attrs as u16 & 0x0F) << 4;
        let mask = priority_mask(attrs >> 6);
        // sign bits pull the sprite off the top/left edge
        let x0 = desc[5] as i32 - ((attrs as i32 & 0x10) << 4);
        let y0 = desc[4] as i32 - ((attrs as i32 & 0x20) << 3);

        let flip_x = ctrl.contains(SpriteCtrl::FLIP_X);
        let flip_y = ctrl.contains(SpriteCtrl::FLIP_Y);

        for ty in 0..side {
            for tx in 0..side {
                let cell_x = if flip_x { side - 1 - tx } else { tx };
                let cell_y = if flip_y { side - 1 - ty } else { ty };
                let sx = x0 + 8 * cell_x as i32;
                let sy = y0 + 8 * cell_y as i32;
                let tile = code + LAYOUT[ty][tx] as u16;
                draw_tile(
                    dst,
                    rom,
                    tile,
                    palette_base | color,
                    layer,
                    mask,
                    flip_x,
                    flip_y,
                    sx,
                    sy,
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_tile(
    dst: &mut Bitmap,
    rom: &TileRom,
    code: u16,
    color_base: u16,
    layer: u16,
    mask: u16,
    flip_x: bool,
    flip_y: bool,
    sx: i32,
    sy: i32,
) {
    for y in 0..8i32 {
        let py = sy + y;
        if py < 0 || py >= dst.height() as i32 {
            continue;
        }
        let src_y = if flip_y { 7 - y } else { y };
        for x in 0..8i32 {
            let px = sx + x;
            if px < 0 || px >= dst.width() as i32 {
                continue;
            }
            let src_x = if flip_x { 7 - x } else { x };
            let pen = rom.pixel(code as usize, src_x as usize, src_y as usize) & 0x0F;
            if pen == 0 {
                continue;
            }
            let (px, py) = (px as usize, py as usize);
            if dst.tag(px, py) & mask != 0 {
                continue;
            }
            dst.set_pixel(px, py, layer << LAYER_SHIFT | color_base | pen as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::INDEX_MASK;
    use crate::tile::layout_8x8;

    // 64 sprite tiles; tile t is solid pen (t % 15) + 1.
    fn sprite_rom() -> TileRom {
        let mut src = vec![0u8; 64 * 32];
        for tile in 0..64 {
            let pen = (tile % 15) as u8 + 1;
            src[tile * 32..(tile + 1) * 32].fill(pen << 4 | pen);
        }
        TileRom::decode(&layout_8x8(), &src, 64)
    }

    fn descriptor(bytes: [u8; 6]) -> Vec<u8> {
        let mut ram = bytes.to_vec();
        ram.extend_from_slice(&[0, 0]);
        ram
    }

    #[test]
    fn invisible_sprites_draw_nothing() {
        let mut dst = Bitmap::new(256, 256);
        let ram = descriptor([0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0), 0);
    }

    #[test]
    fn visible_sprite_stamps_color_and_tag() {
        let mut dst = Bitmap::new(256, 256);
        // tile 1 (pen 2), color 5, at (16, 32)
        let ram = descriptor([0x04, 0x01, 0x00, 0x05, 32, 16]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(16, 32) & INDEX_MASK, 5 << 4 | 2);
        assert_eq!(dst.tag(16, 32), LAYER_SPRITE);
        assert_eq!(dst.pixel(15, 32), 0);
        assert_eq!(dst.pixel(16 + 8, 32), 0);
    }

    #[test]
    fn sixteen_pixel_sprite_uses_layout_order() {
        let mut dst = Bitmap::new(256, 256);
        // size 1 => 2x2 tiles from code 4: layout picks 4, 5 / 6, 7
        let ram = descriptor([0x04, 0x04, 0x01, 0x00, 0, 0]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 5); // tile 4, pen 5
        assert_eq!(dst.pixel(8, 0) & 0x0F, 6); // tile 5
        assert_eq!(dst.pixel(0, 8) & 0x0F, 7); // tile 6
        assert_eq!(dst.pixel(8, 8) & 0x0F, 8); // tile 7
    }

    #[test]
    fn code_is_aligned_to_the_sprite_size() {
        let mut dst = Bitmap::new(256, 256);
        // code 7 with size 1 aligns down to 4
        let ram = descriptor([0x04, 0x07, 0x01, 0x00, 0, 0]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 5);
    }

    #[test]
    fn flips_mirror_tile_placement() {
        let mut dst = Bitmap::new(256, 256);
        // 2x2 tiles, flipped both ways: tile 4 lands bottom-right
        let ram = descriptor([0x04 | 0x03, 0x04, 0x01, 0x00, 0, 0]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(15, 15) & 0x0F, 5);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 8); // tile 7 now top-left
    }

    #[test]
    fn sign_bits_clip_off_the_edge() {
        let mut dst = Bitmap::new(256, 256);
        // x = 250 - 256 = -6: columns 0 and 1 visible
        let ram = descriptor([0x04, 0x01, 0x00, 0x10, 0, 250]);
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 2);
        assert_eq!(dst.pixel(1, 0) & 0x0F, 2);
        assert_eq!(dst.pixel(2, 0), 0);
        assert_eq!(dst.pixel(255, 0), 0);
    }

    #[test]
    fn earlier_sprites_win_over_later_ones() {
        let mut dst = Bitmap::new(256, 256);
        let mut ram = descriptor([0x04, 0x01, 0x00, 0x00, 0, 0]); // pen 2
        ram.extend(descriptor([0x04, 0x02, 0x00, 0x00, 0, 0])); // pen 3, same spot
        draw(&mut dst, &ram, &sprite_rom(), 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 2);
    }

    #[test]
    fn priority_field_hides_sprites_behind_layers() {
        let rom = sprite_rom();
        // a char-layer pixel already on screen
        let mut dst = Bitmap::new(256, 256);
        dst.set_pixel(0, 0, LAYER_CHAR << LAYER_SHIFT | 0x155);

        // priority 1: obscured by the char layer
        let ram = descriptor([0x04, 0x01, 0x00, 0x40, 0, 0]);
        draw(&mut dst, &ram, &rom, 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & INDEX_MASK, 0x155);
        assert_eq!(dst.pixel(1, 0) & 0x0F, 2); // next to it the sprite shows

        // priority 0: in front of everything
        let mut dst = Bitmap::new(256, 256);
        dst.set_pixel(0, 0, LAYER_CHAR << LAYER_SHIFT | 0x155);
        let ram = descriptor([0x04, 0x01, 0x00, 0x00, 0, 0]);
        draw(&mut dst, &ram, &rom, 0, LAYER_SPRITE);
        assert_eq!(dst.pixel(0, 0) & 0x0F, 2);
    }
}
