//! Abstractions over the two time sources used by the benchmarks: a free-running CPU cycle counter
//! for fine-grained measurements, and a coarser microsecond wall clock for human-readable elapsed
//! times.

/// A free-running hardware counter that increments once per CPU clock cycle.
///
/// Implementations must be cheap to read (ideally a single instruction) and must not have any side
/// effects, since they're read from within measured sections.
pub trait CycleCounter {
    /// Returns the current counter value.
    fn cycles(&self) -> u32;
}

/// A monotonic wall clock with microsecond resolution.
pub trait WallClock {
    /// Returns the number of microseconds elapsed since some fixed point in the past (e.g. boot).
    fn micros(&self) -> u64;
}

/// The time elapsed over a measurement [Window].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    /// The elapsed wall-clock time, in microseconds.
    pub micros: u64,
    /// The number of CPU cycles elapsed.
    pub cycles: u32,
}

/// A measurement window, opened before and closed after the code being measured.
///
/// The cycle delta is computed with wrapping arithmetic on the 32-bit counter, which yields the
/// right result as long as the counter wraps at most once within the window. At 160MHz a wrap takes
/// almost 27 seconds, far longer than any window we open.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    start_micros: u64,
    start_cycles: u32,
}

impl Window {
    /// Opens a window by taking the start readings. The wall clock is read first so that the cycle
    /// counter reading sits as close as possible to the measured code.
    #[inline(always)]
    pub fn open<T: CycleCounter + WallClock>(clock: &T) -> Self {
        let start_micros = clock.micros();
        let start_cycles = clock.cycles();
        Window {
            start_micros,
            start_cycles,
        }
    }

    /// Closes the window by taking the end readings, and returns the deltas.
    #[inline(always)]
    pub fn close<T: CycleCounter + WallClock>(self, clock: &T) -> Elapsed {
        let end_cycles = clock.cycles();
        let end_micros = clock.micros();
        Elapsed {
            micros: end_micros.saturating_sub(self.start_micros),
            cycles: end_cycles.wrapping_sub(self.start_cycles),
        }
    }
}
