use super::*;

impl Mainboard {
    pub(super) fn mem_read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=PROGRAM_ROM_END => self.program_rom[addr as usize],
            RAM_START..=RAM_END => self.ram_read(addr),
            BANK_WINDOW_START..=BANK_WINDOW_END => {
                let offset = (addr - BANK_WINDOW_START) as usize;
                self.banked_rom[self.current_bank as usize * BANK_WINDOW_SIZE + offset]
            }
            _ => self.io_read(addr),
        }
    }

    fn ram_read(&self, addr: u16) -> u8 {
        match addr {
            WORK_RAM_START..=WORK_RAM_END => self.work_ram[(addr - WORK_RAM_START) as usize],
            CHAR_RAM_START..=CHAR_RAM_END => self.char_ram[(addr - CHAR_RAM_START) as usize],
            FG_RAM_START..=FG_RAM_END => self.fg_ram[(addr - FG_RAM_START) as usize],
            BG_RAM_START..=BG_RAM_END => self.bg_ram[(addr - BG_RAM_START) as usize],
            SPRITE_RAM_START..=SPRITE_RAM_END => self.sprite_ram[(addr - SPRITE_RAM_START) as usize],
            PALETTE_RAM_START..=PALETTE_RAM_END => {
                self.palette_ram[(addr - PALETTE_RAM_START) as usize]
            }
            _ => 0x00,
        }
    }

    /// A RAM write, plus its side effect: video RAM marks the touched cell
    /// dirty (each cell has two bytes, one per half of the region, sharing
    /// one dirty bit) and palette RAM folds the byte into the color cache.
    pub(super) fn ram_write(&mut self, addr: u16, data: u8) {
        match addr {
            WORK_RAM_START..=WORK_RAM_END => {
                self.work_ram[(addr - WORK_RAM_START) as usize] = data;
            }
            CHAR_RAM_START..=CHAR_RAM_END => {
                let offset = (addr - CHAR_RAM_START) as usize;
                self.char_ram[offset] = data;
                self.char_tilemap.mark_tile_dirty(offset & 0x3FF);
            }
            FG_RAM_START..=FG_RAM_END => {
                let offset = (addr - FG_RAM_START) as usize;
                self.fg_ram[offset] = data;
                self.fg_tilemap.mark_tile_dirty(offset & 0x1FF);
            }
            BG_RAM_START..=BG_RAM_END => {
                let offset = (addr - BG_RAM_START) as usize;
                self.bg_ram[offset] = data;
                self.bg_tilemap.mark_tile_dirty(offset & 0x1FF);
            }
            SPRITE_RAM_START..=SPRITE_RAM_END => {
                self.sprite_ram[(addr - SPRITE_RAM_START) as usize] = data;
            }
            PALETTE_RAM_START..=PALETTE_RAM_END => {
                let offset = (addr - PALETTE_RAM_START) as usize;
                self.palette_ram[offset] = data;
                self.palette.update(offset, data);
            }
            _ => debug_assert!(false, "ram_write outside the RAM window: {addr:#06X}"),
        }
    }
}
