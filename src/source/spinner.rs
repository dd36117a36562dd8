use std::time::Duration;

use super::{done_line, format_elapsed, ReadStatus, Stopwatch};

/// Symbols cycled by a live spinner.
pub const WHEEL: [char; 4] = ['/', '-', '\\', '|'];

/// Shows elapsed time and a turning wheel when no size is known.
#[derive(Debug)]
pub struct Spinner {
    cycle: usize,
    clock: Stopwatch,
    elapsed: Option<Duration>,
}

impl Spinner {
    pub fn new() -> Self {
        Self::with_clock(Stopwatch::start())
    }

    pub(crate) fn with_clock(clock: Stopwatch) -> Self {
        Self {
            cycle: 0,
            clock,
            elapsed: None,
        }
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStatus for Spinner {
    fn status(&mut self) -> String {
        if let Some(elapsed) = self.elapsed {
            return done_line(elapsed);
        }
        self.cycle = (self.cycle + 1) % WHEEL.len();
        format!(
            "{}    {}   ",
            format_elapsed(self.clock.elapsed()),
            WHEEL[self.cycle]
        )
    }

    fn mark_done(&mut self) {
        self.elapsed = Some(self.clock.elapsed_at_least_one_tick());
    }

    fn is_done(&self) -> bool {
        self.elapsed.is_some()
    }
}
