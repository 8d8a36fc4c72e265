//! Measures the average number of CPU cycles spent per operation (CPI) of a fixed arithmetic
//! workload.

use crate::clock::{CycleCounter, Elapsed, WallClock, Window};
use core::fmt::{self, Display, Formatter};
use core::hint::black_box;
use core::num::NonZeroI32;

/// The default number of workload iterations.
pub const ITERATIONS: u32 = 1000;
/// The number of arithmetic operations performed by each workload iteration.
pub const OPS_PER_ITERATION: u32 = 5;

const DEFAULT_RHS: NonZeroI32 = match NonZeroI32::new(128) {
    Some(rhs) => rhs,
    None => panic!("divisor must be non-zero"),
};

/// The two operands the workload operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operands {
    pub lhs: i32,
    /// The right hand side operand, which is also used as a divisor.
    pub rhs: NonZeroI32,
}

impl Default for Operands {
    fn default() -> Self {
        Operands {
            lhs: 233,
            rhs: DEFAULT_RHS,
        }
    }
}

/// Runs `iterations` iterations of the workload: an addition of both operands, an addition of a
/// constant, a remainder, a multiplication and a division.
///
/// Every operand is passed through [black_box] before use and every result after, so that the
/// operations can neither be hoisted out of the loop nor eliminated.
#[inline(always)]
pub fn run_workload(operands: Operands, iterations: u32) {
    for _ in 0..iterations {
        let lhs = black_box(operands.lhs);
        let rhs = black_box(operands.rhs).get();
        black_box(lhs.wrapping_add(rhs));
        black_box(lhs.wrapping_add(10));
        black_box(lhs.wrapping_rem(rhs));
        black_box(lhs.wrapping_mul(rhs));
        black_box(lhs.wrapping_div(rhs));
    }
}

/// The result of a CPI measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpiMeasurement {
    /// The number of workload iterations that were run.
    pub iterations: u32,
    /// The time the workload took. If the performance counter was counting something other than
    /// CPU cycles (e.g. retired instructions), then the `cycles` field holds that count instead.
    pub elapsed: Elapsed,
}

impl CpiMeasurement {
    /// The total number of operations the workload performed.
    pub fn ops(&self) -> u64 {
        self.iterations as u64 * OPS_PER_ITERATION as u64
    }

    /// Returns the average number of cycles per operation, or `None` if no operations were run.
    pub fn cpi(&self) -> Option<f32> {
        match self.ops() {
            0 => None,
            ops => Some(self.elapsed.cycles as f32 / ops as f32),
        }
    }
}

/// Runs the workload for `iterations` iterations and measures how long it took.
///
/// Like the memory benchmarks, the workload runs inside a critical section.
pub fn measure<T: CycleCounter + WallClock>(
    operands: Operands,
    iterations: u32,
    clock: &T,
) -> CpiMeasurement {
    let elapsed = critical_section::with(|_| {
        let window = Window::open(clock);
        run_workload(operands, iterations);
        window.close(clock)
    });
    CpiMeasurement {
        iterations,
        elapsed,
    }
}

/// Returns the number of cycles per retired instruction, or `None` if no instructions were counted.
pub fn cycles_per_instruction(cycles: u32, instructions: u32) -> Option<f32> {
    match instructions {
        0 => None,
        instructions => Some(cycles as f32 / instructions as f32),
    }
}

/// Formats the metrics of a [CpiMeasurement]: total cycles, total time and CPI (with two decimals).
pub struct Metrics<'a>(pub &'a CpiMeasurement);

impl<'a> Display for Metrics<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Metrics ---")?;
        writeln!(f, "Total cycles: {}", self.0.elapsed.cycles)?;
        writeln!(f, "Total time (us): {}", self.0.elapsed.micros)?;
        match self.0.cpi() {
            Some(cpi) => write!(f, "CPI: {cpi:.2}"),
            None => write!(f, "CPI: insufficient data"),
        }
    }
}
