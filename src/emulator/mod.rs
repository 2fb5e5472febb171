//! Machine façade tying the CPU core, the board and the host clock
//! together.


use crate::bus::{Key, Mainboard, CPU_FREQ_HZ};
use crate::clock::Clock;
use crate::cpu::Cpu;
use crate::roms::{RomError, RomSet};

/// Pixel aspect of the cabinet monitor.
pub const DISPLAY_ASPECT: (u32, u32) = (4, 3);

/// The whole machine. The host hands it a CPU core and the ROM set, then
/// calls [`run_frame`](Self::run_frame) once per display frame and reads
/// the framebuffer back.
pub struct Emulator<C> {
    pub cpu: C,
    pub board: Mainboard,
    clock: Clock,
}

impl<C: Cpu<Mainboard>> Emulator<C> {
    pub fn new(cpu: C, roms: &RomSet) -> Result<Self, RomError> {
        Ok(Self {
            cpu,
            board: Mainboard::new(roms)?,
            clock: Clock::new(CPU_FREQ_HZ),
        })
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.board.reset();
    }

    /// Run the machine for a `delta_micros` microsecond host frame: execute
    /// the CPU for the equivalent tick budget, then composite the frame.
    ///
    /// The core is re-entered with the remaining budget until the budget is
    /// spent; overshoot carries into the next frame through the clock. A
    /// zero delta executes nothing but still composites from current state.
    pub fn run_frame(&mut self, delta_micros: u32) {
        let budget = self.clock.ticks_to_run(delta_micros);
        let mut executed = 0;
        while executed < budget {
            let ran = self.cpu.exec(&mut self.board, budget - executed);
            if ran == 0 {
                // a core that stops making progress must not wedge the frame
                debug_assert!(false, "cpu core executed zero ticks");
                break;
            }
            executed += ran;
        }
        self.clock.ticks_executed(budget, executed);

        self.board.draw_frame();
    }

    /// The current frame, `bus::SCREEN_WIDTH x bus::SCREEN_HEIGHT` RGBA
    /// pixels.
    pub fn framebuffer(&self) -> &[u32] {
        self.board.framebuffer()
    }

    pub fn key_down(&mut self, key: Key) {
        self.board.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.board.key_up(key);
    }
}
