//! The main CPU board: memory map, bank switching, video RAM, input ports
//! and the vertical-blank interrupt generator.
//!
//! The board hangs off the CPU's pin bus: [`TickBus::tick`] is invoked once
//! per bus cycle, advances the sync counters, and decodes the transaction
//! against the address map. Writes land in RAM and update the palette
//! cache, dirty bits and latches as a side effect; the per-frame compositor
//! then only has to re-raster what actually changed.

use crate::bitmap::Bitmap;
use crate::cpu::{Pins, TickBus};
use crate::palette::PaletteCache;
use crate::roms::{self, RomError, RomSet};
use crate::tile::{layout_16x16, layout_8x8, TileRom};
use crate::tilemap::Tilemap;

mod env;
mod io;
mod mapping;
mod render;


pub use io::Key;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 224;

/// The composite bitmap covers a full 256x256 field; the visible window
/// starts 16 lines down.
const BUFFER_WIDTH: usize = 256;
const BUFFER_HEIGHT: usize = 256;
const VISIBLE_TOP: usize = 16;

pub const CPU_FREQ_HZ: u32 = 4_000_000;

/// Ticks between vertical syncs: a 60 Hz field at 4 MHz.
pub(crate) const VSYNC_PERIOD: i32 = 66_667;
/// Ticks the INT line is held: 42 blanked lines of a 525-line field.
pub(crate) const VBLANK_DURATION: i32 = 5_333;

const WORK_RAM_SIZE: usize = 0x1000;
const CHAR_RAM_SIZE: usize = 0x800;
const FG_RAM_SIZE: usize = 0x400;
const BG_RAM_SIZE: usize = 0x400;
const SPRITE_RAM_SIZE: usize = 0x800;
const PALETTE_RAM_SIZE: usize = 0x800;

const PROGRAM_ROM_END: u16 = 0xBFFF;

const RAM_START: u16 = 0xC000;
const RAM_END: u16 = 0xEFFF;
const WORK_RAM_START: u16 = 0xC000;
const WORK_RAM_END: u16 = 0xCFFF;
const CHAR_RAM_START: u16 = 0xD000;
const CHAR_RAM_END: u16 = 0xD7FF;
const FG_RAM_START: u16 = 0xD800;
const FG_RAM_END: u16 = 0xDBFF;
const BG_RAM_START: u16 = 0xDC00;
const BG_RAM_END: u16 = 0xDFFF;
const SPRITE_RAM_START: u16 = 0xE000;
const SPRITE_RAM_END: u16 = 0xE7FF;
const PALETTE_RAM_START: u16 = 0xE800;
const PALETTE_RAM_END: u16 = 0xEFFF;

const BANK_WINDOW_START: u16 = 0xF000;
const BANK_WINDOW_END: u16 = 0xF7FF;
const BANK_WINDOW_SIZE: usize = 0x800;

const IO_START: u16 = 0xF800;

/// Rygar's main board.
///
/// One value owns every piece of machine state; the CPU core mutates it
/// through the bus callback during execution, the host between frames
/// (input, compositor). Nothing here is shared or locked.
pub struct Mainboard {
    work_ram: [u8; WORK_RAM_SIZE],
    pub(crate) char_ram: [u8; CHAR_RAM_SIZE],
    pub(crate) fg_ram: [u8; FG_RAM_SIZE],
    pub(crate) bg_ram: [u8; BG_RAM_SIZE],
    pub(crate) sprite_ram: [u8; SPRITE_RAM_SIZE],
    palette_ram: [u8; PALETTE_RAM_SIZE],

    program_rom: Vec<u8>,
    banked_rom: Vec<u8>,
    pub(crate) current_bank: u8,

    // input registers, written by the host between frames
    pub(crate) joystick: u8,
    pub(crate) buttons: u8,
    pub(crate) sys: u8,

    // raw scroll latch bytes; byte 2 would be scroll-y, which the game
    // never drives
    fg_scroll: [u8; 3],
    bg_scroll: [u8; 3],

    pub(crate) char_tilemap: Tilemap,
    pub(crate) fg_tilemap: Tilemap,
    pub(crate) bg_tilemap: Tilemap,
    sprite_rom: TileRom,

    pub(crate) palette: PaletteCache,

    bitmap: Bitmap,
    framebuffer: Vec<u32>,

    pub(crate) vsync_count: i32,
    pub(crate) vblank_count: i32,
}

impl Mainboard {
    /// Build the board from a ROM set: validates image sizes, maps the
    /// program regions and decodes all four tile ROMs.
    pub fn new(roms: &RomSet) -> Result<Self, RomError> {
        roms.validate()?;

        let char_rom = TileRom::decode(&layout_8x8(), roms.chars, 1024);
        let fg_rom = TileRom::decode(&layout_16x16(), &roms::concat_chunks(&roms.fg), 1024);
        let bg_rom = TileRom::decode(&layout_16x16(), &roms::concat_chunks(&roms.bg), 1024);
        let sprite_rom = TileRom::decode(&layout_8x8(), &roms::concat_chunks(&roms.sprites), 4096);

        log::info!(
            "board up: {:#x} bytes program rom, {:#x} bytes banked rom",
            roms.program_lo.len() + roms.program_hi.len(),
            roms.banked.len()
        );

        Ok(Self {
            work_ram: [0; WORK_RAM_SIZE],
            char_ram: [0; CHAR_RAM_SIZE],
            fg_ram: [0; FG_RAM_SIZE],
            bg_ram: [0; BG_RAM_SIZE],
            sprite_ram: [0; SPRITE_RAM_SIZE],
            palette_ram: [0; PALETTE_RAM_SIZE],
            program_rom: roms.program(),
            banked_rom: roms.banked.to_vec(),
            current_bank: 0,
            joystick: 0,
            buttons: 0,
            sys: 0,
            fg_scroll: [0; 3],
            bg_scroll: [0; 3],
            char_tilemap: Tilemap::new(char_rom, 32, 32),
            fg_tilemap: Tilemap::new(fg_rom, 32, 16),
            bg_tilemap: Tilemap::new(bg_rom, 32, 16),
            sprite_rom,
            palette: PaletteCache::new(),
            bitmap: Bitmap::new(BUFFER_WIDTH, BUFFER_HEIGHT),
            framebuffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            vsync_count: VSYNC_PERIOD,
            vblank_count: 0,
        })
    }

    /// Power-cycle everything except the ROMs.
    pub fn reset(&mut self) {
        log::debug!("board reset");
        self.work_ram.fill(0);
        self.char_ram.fill(0);
        self.fg_ram.fill(0);
        self.bg_ram.fill(0);
        self.sprite_ram.fill(0);
        self.palette_ram.fill(0);
        self.current_bank = 0;
        self.joystick = 0;
        self.buttons = 0;
        self.sys = 0;
        self.fg_scroll = [0; 3];
        self.bg_scroll = [0; 3];
        for map in [
            &mut self.char_tilemap,
            &mut self.fg_tilemap,
            &mut self.bg_tilemap,
        ] {
            map.set_scroll_x(0);
            map.mark_all_dirty();
        }
        self.palette.reset();
        self.vsync_count = VSYNC_PERIOD;
        self.vblank_count = 0;
    }

    /// The finished frame: `SCREEN_WIDTH x SCREEN_HEIGHT` RGBA pixels
    /// (R,G,B,A byte order in memory on little-endian hosts).
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    fn mem_write(&mut self, addr: u16, data: u8) {
        match addr {
            RAM_START..=RAM_END => self.ram_write(addr, data),
            IO_START..=u16::MAX => self.io_write(addr, data),
            // writes into ROM fall off the bus
            _ => {}
        }
    }
}

impl TickBus for Mainboard {
    fn tick(&mut self, num_ticks: u32, pins: Pins) -> Pins {
        let mut pins = pins;

        // sync counters run ahead of the decode
        self.vsync_count -= num_ticks as i32;
        if self.vsync_count <= 0 {
            self.vsync_count += VSYNC_PERIOD;
            self.vblank_count = VBLANK_DURATION;
        }
        if self.vblank_count > 0 {
            self.vblank_count -= num_ticks as i32;
            pins.raise(Pins::INT);
        } else {
            self.vblank_count = 0;
        }

        if pins.any(Pins::MREQ) {
            let addr = pins.addr();
            if pins.any(Pins::WR) {
                self.mem_write(addr, pins.data());
            } else if pins.any(Pins::RD) {
                pins.set_data(self.mem_read(addr));
            }
        } else if pins.all(Pins::IORQ | Pins::M1) {
            // interrupt acknowledge: the line drops and stays down until
            // the next vertical blank reloads it
            pins.clear(Pins::INT);
            self.vblank_count = 0;
        }

        pins
    }
}
