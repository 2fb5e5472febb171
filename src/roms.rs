//! Mask-ROM images for the main board.
//!
//! ROM contents arrive as opaque byte slices; loading them from disk or
//! embedding them is the host's business. The board only checks that each
//! image has the length the PCB sockets expect and stitches the split
//! video ROMs back into linear dumps before tile decoding.

use thiserror::Error;

pub const PROGRAM_LO_LEN: usize = 0x8000;
pub const PROGRAM_HI_LEN: usize = 0x4000;
pub const BANKED_LEN: usize = 0x8000;
pub const CHAR_ROM_LEN: usize = 0x8000;
pub const VIDEO_CHUNK_LEN: usize = 0x8000;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("{name} ROM has wrong length: expected {expected:#x} bytes, got {got:#x}")]
    BadLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },
}

/// The full Rygar ROM set.
///
/// `program_lo` maps at CPU `0x0000..=0x7FFF`, `program_hi` at
/// `0x8000..=0xBFFF`, and `banked` is the 32 KiB image windowed 2 KiB at a
/// time into `0xF000..=0xF7FF`. The character ROM and the four-way split
/// foreground, background and sprite ROMs hold planar tile data.
pub struct RomSet<'a> {
    pub program_lo: &'a [u8],
    pub program_hi: &'a [u8],
    pub banked: &'a [u8],
    pub chars: &'a [u8],
    pub fg: [&'a [u8]; 4],
    pub bg: [&'a [u8]; 4],
    pub sprites: [&'a [u8]; 4],
}

impl RomSet<'_> {
    pub(crate) fn validate(&self) -> Result<(), RomError> {
        check("program (lo)", self.program_lo, PROGRAM_LO_LEN)?;
        check("program (hi)", self.program_hi, PROGRAM_HI_LEN)?;
        check("banked", self.banked, BANKED_LEN)?;
        check("char", self.chars, CHAR_ROM_LEN)?;
        for (chunks, name) in [
            (&self.fg, "foreground"),
            (&self.bg, "background"),
            (&self.sprites, "sprite"),
        ] {
            for chunk in chunks.iter() {
                check(name, chunk, VIDEO_CHUNK_LEN)?;
            }
        }
        Ok(())
    }

    /// Program ROM as one linear region covering `0x0000..=0xBFFF`.
    pub(crate) fn program(&self) -> Vec<u8> {
        let mut rom = Vec::with_capacity(PROGRAM_LO_LEN + PROGRAM_HI_LEN);
        rom.extend_from_slice(self.program_lo);
        rom.extend_from_slice(self.program_hi);
        rom
    }
}

/// Stitch the four chunks of a split video ROM into one dump.
pub(crate) fn concat_chunks(chunks: &[&[u8]; 4]) -> Vec<u8> {
    let mut rom = Vec::with_capacity(chunks.iter().map(|c| c.len()).sum());
    for chunk in chunks {
        rom.extend_from_slice(chunk);
    }
    rom
}

fn check(name: &'static str, rom: &[u8], expected: usize) -> Result<(), RomError> {
    if rom.len() != expected {
        return Err(RomError::BadLength {
            name,
            expected,
            got: rom.len(),
        });
    }
    Ok(())
}
