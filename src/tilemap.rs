//! Dirty-tracked scrolling tilemap engine.
//!
//! Each tilemap pre-rasters its whole map into a scratch bitmap and only
//! re-rasters cells whose backing RAM changed since the last frame. The
//! scratch is then merged into the frame bitmap at the latched horizontal
//! scroll with wraparound.

use crate::bitmap::{Bitmap, LAYER_SHIFT};
use crate::tile::TileRom;

/// Pen 0 never lands in the frame bitmap.
const TRANSPARENT_PEN: u8 = 0;

/// Cell description produced by the owning RAM region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TileInfo {
    pub code: u16,
    pub color: u8,
}

pub(crate) struct Tilemap {
    rom: TileRom,
    cols: usize,
    rows: usize,
    scroll_x: u16,
    dirty: Vec<bool>,
    scratch: Bitmap,
}

impl Tilemap {
    pub(crate) fn new(rom: TileRom, cols: usize, rows: usize) -> Self {
        let scratch = Bitmap::new(cols * rom.tile_width(), rows * rom.tile_height());
        Self {
            rom,
            cols,
            rows,
            scroll_x: 0,
            // every cell rasters on the first draw
            dirty: vec![true; cols * rows],
            scratch,
        }
    }

    /// Queue cell `index` for re-rasterization. Marking is a set operation;
    /// marking twice before a draw is the same as marking once.
    pub(crate) fn mark_tile_dirty(&mut self, index: usize) {
        let len = self.dirty.len();
        self.dirty[index % len] = true;
    }

    /// Queue the whole map, e.g. after a power cycle.
    pub(crate) fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    pub(crate) fn set_scroll_x(&mut self, value: u16) {
        self.scroll_x = value;
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self, index: usize) -> bool {
        self.dirty[index]
    }

    #[cfg(test)]
    pub(crate) fn scroll_x(&self) -> u16 {
        self.scroll_x
    }

    #[cfg(test)]
    pub(crate) fn dirty_count(&self) -> usize {
        self.dirty.iter().filter(|&&d| d).count()
    }

    /// Re-raster dirty cells through `tile_info`, then merge the map into
    /// `dst` at the current scroll. Opaque pixels carry
    /// `palette_base | color << 4 | pen` and the layer tag.
    pub(crate) fn draw<F>(&mut self, dst: &mut Bitmap, palette_base: u16, layer: u16, tile_info: F)
    where
        F: Fn(usize) -> TileInfo,
    {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let index = row * self.cols + col;
                if !self.dirty[index] {
                    continue;
                }
                let info = tile_info(index);
                self.draw_tile(&info, palette_base, layer, col, row);
                self.dirty[index] = false;
            }
        }

        dst.merge_scrolled(&self.scratch, self.scroll_x);
    }

    fn draw_tile(&mut self, info: &TileInfo, palette_base: u16, layer: u16, col: usize, row: usize) {
        let w = self.rom.tile_width();
        let h = self.rom.tile_height();
        let sx = col * w;
        let sy = row * h;
        let color = (info.color as u16) << 4;

        for y in 0..h {
            let pens = self.rom.row(info.code as usize, y);
            let out = &mut self.scratch.row_mut(sy + y)[sx..sx + w];
            for (x, out) in out.iter_mut().enumerate() {
                let pen = pens[x] & 0x0F;
                let tag = if pen != TRANSPARENT_PEN { layer } else { 0 };
                *out = tag << LAYER_SHIFT | palette_base | color | pen as u16;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{INDEX_MASK, LAYER_CHAR};
    use crate::tile::{layout_8x8, TileRom};

    // Two 8x8 tiles: tile 0 blank, tile 1 solid pen 3.
    fn two_tile_rom() -> TileRom {
        let mut src = vec![0u8; 64];
        src[32..].fill(0x33);
        TileRom::decode(&layout_8x8(), &src, 2)
    }

    fn cell_info(code: u16, color: u8) -> impl Fn(usize) -> TileInfo {
        move |index| {
            if index == 0 {
                TileInfo { code, color }
            } else {
                TileInfo::default()
            }
        }
    }

    #[test]
    fn dirty_cells_raster_with_palette_and_tag() {
        let mut map = Tilemap::new(two_tile_rom(), 4, 4);
        let mut dst = Bitmap::new(32, 32);
        map.draw(&mut dst, 0x100, LAYER_CHAR, cell_info(1, 5));

        // cell 0 is tile 1 with color 5: index 0x100 | 5 << 4 | 3
        assert_eq!(dst.pixel(0, 0) & INDEX_MASK, 0x153);
        assert_eq!(dst.tag(0, 0), LAYER_CHAR);
        // cell 1 is the blank tile; its pixels stay transparent
        assert_eq!(dst.pixel(8, 0), 0);
    }

    #[test]
    fn clean_cells_are_not_rerastered() {
        let mut map = Tilemap::new(two_tile_rom(), 4, 4);
        let mut dst = Bitmap::new(32, 32);
        map.draw(&mut dst, 0x100, LAYER_CHAR, cell_info(1, 5));
        assert_eq!(map.dirty_count(), 0);

        // the RAM now claims a different color, but nothing was marked
        let mut dst2 = Bitmap::new(32, 32);
        map.draw(&mut dst2, 0x100, LAYER_CHAR, cell_info(1, 7));
        assert_eq!(dst2.pixel(0, 0) & INDEX_MASK, 0x153);

        map.mark_tile_dirty(0);
        let mut dst3 = Bitmap::new(32, 32);
        map.draw(&mut dst3, 0x100, LAYER_CHAR, cell_info(1, 7));
        assert_eq!(dst3.pixel(0, 0) & INDEX_MASK, 0x173);
    }

    #[test]
    fn marking_twice_equals_marking_once() {
        let mut map = Tilemap::new(two_tile_rom(), 4, 4);
        let mut dst = Bitmap::new(32, 32);
        map.draw(&mut dst, 0, LAYER_CHAR, cell_info(0, 0));
        map.mark_tile_dirty(3);
        map.mark_tile_dirty(3);
        assert_eq!(map.dirty_count(), 1);
        assert!(map.is_dirty(3));
    }

    #[test]
    fn mark_wraps_out_of_range_indices() {
        let mut map = Tilemap::new(two_tile_rom(), 4, 4);
        let mut dst = Bitmap::new(32, 32);
        map.draw(&mut dst, 0, LAYER_CHAR, cell_info(0, 0));
        map.mark_tile_dirty(16 + 2);
        assert!(map.is_dirty(2));
    }

    #[test]
    fn scroll_shifts_the_merge_window() {
        let mut map = Tilemap::new(two_tile_rom(), 4, 4);
        let mut dst = Bitmap::new(32, 32);
        map.set_scroll_x(8);
        // cell 0 (solid) sits at map x 0..8; with scroll 8 it appears at
        // screen x 24..32 via wraparound
        map.draw(&mut dst, 0x100, LAYER_CHAR, cell_info(1, 0));
        assert_eq!(dst.pixel(0, 0), 0);
        assert_eq!(dst.pixel(24, 0) & INDEX_MASK, 0x103);
    }
}
