//! Provides the time sources for the benchmarks: the CPU's machine performance counter, which is
//! used as the cycle counter, and the system timer, which is used as the wall clock.

#[cfg(feature = "esp32c3")]
use esp32c3_hal as hal;
#[cfg(feature = "esp32c6")]
use esp32c6_hal as hal;

use core::arch::asm;
use hal::{clock::Clocks, prelude::*, systimer::SystemTimer};
use log::debug;
use membench::clock::{CycleCounter, WallClock};

/// The address of the Machine Performance Counter Event Register.
const MPCER: usize = 0x7E0;
/// The address of the Machine Performance Counter Mode Register.
const MPCMR: usize = 0x7E1;
/// The address of the Machine Performance Counter Count Register.
const MPCCR: usize = 0x7E2;

/// The CPU clock speed the benchmarks are calibrated for.
const EXPECTED_CPU_CLOCK_MHZ: u32 = 160;

#[derive(Debug)]
pub enum Error {
    /// The CPU clock is misconfigured (it must be set to 160MHz).
    IncorrectCpuClockError,
}
pub type Result<T> = core::result::Result<T, Error>;

/// The events the performance counter can count. See the "Performance Counter" section of the
/// technical reference manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Event {
    Cycles = 1 << 0,
    Instructions = 1 << 1,
    LoadHazards = 1 << 2,
    JumpHazards = 1 << 3,
    IdleCycles = 1 << 4,
}

/// A clock backed by the performance counter and the system timer.
///
/// The performance counter counts CPU cycles by default, but can be switched to count other events
/// with [BenchClock::count]. The [CycleCounter] implementation then returns that event's count.
pub struct BenchClock {
    event: Event,
}

impl BenchClock {
    /// Creates a new instance, and enables the performance counter in cycle counting mode.
    ///
    /// Returns an [Error::IncorrectCpuClockError] if the CPU isn't running at 160MHz, since the
    /// cycle counts wouldn't be comparable with those taken at the usual clock speed otherwise.
    pub fn new(clocks: &Clocks) -> Result<BenchClock> {
        if clocks.cpu_clock.to_MHz() != EXPECTED_CPU_CLOCK_MHZ {
            return Err(Error::IncorrectCpuClockError);
        }
        let mut clock = BenchClock {
            event: Event::Cycles,
        };
        clock.count(Event::Cycles);
        Ok(clock)
    }

    /// Makes the performance counter count the given event, and restarts it.
    pub fn count(&mut self, event: Event) {
        unsafe {
            asm!(
                "csrw {mpcer}, {event}",
                "csrw {mpcmr}, 0", // Disable the counter.
                "csrw {mpcmr}, 1", // Enable the counter.
                event = in(reg) event as u32,
                mpcer = const(MPCER),
                mpcmr = const(MPCMR),
            );
        }
        self.event = event;
        debug!("Performance counter now counting {:?}", event);
    }

    /// The event the performance counter is currently counting.
    pub fn event(&self) -> Event {
        self.event
    }
}

impl CycleCounter for BenchClock {
    /// Reads the performance counter. This is a single `csrr` instruction.
    #[inline(always)]
    fn cycles(&self) -> u32 {
        let count: u32;
        unsafe {
            asm!(
                "csrr {count}, {mpccr}",
                count = out(reg) count,
                mpccr = const(MPCCR),
                options(nostack),
            );
        }
        count
    }
}

impl WallClock for BenchClock {
    #[inline(always)]
    fn micros(&self) -> u64 {
        SystemTimer::now() * 1_000_000 / SystemTimer::TICKS_PER_SECOND
    }
}
