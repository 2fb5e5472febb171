//! Host-time to CPU-tick conversion.

/// Converts host frame deltas into whole CPU ticks, carrying the overshoot
/// of the previous frame so the long-run tick rate matches the crystal.
pub struct Clock {
    freq_hz: u32,
    overflow_ticks: u32,
}

impl Clock {
    pub fn new(freq_hz: u32) -> Self {
        Self {
            freq_hz,
            overflow_ticks: 0,
        }
    }

    /// Number of ticks to run for a `micros` microsecond host delta, with
    /// the previous overshoot already deducted. A zero delta yields zero
    /// ticks.
    pub fn ticks_to_run(&mut self, micros: u32) -> u32 {
        let ticks = (self.freq_hz as u64 * micros as u64 / 1_000_000) as u32;
        if ticks <= self.overflow_ticks {
            self.overflow_ticks -= ticks;
            0
        } else {
            let run = ticks - self.overflow_ticks;
            self.overflow_ticks = 0;
            run
        }
    }

    /// Record how many ticks actually ran against the requested budget.
    /// The excess is deducted from the next frame.
    pub fn ticks_executed(&mut self, requested: u32, executed: u32) {
        self.overflow_ticks += executed.saturating_sub(requested);
    }
}
