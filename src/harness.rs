//! The compute loop whose cost is measured for each memory class.

use crate::clock::{CycleCounter, Elapsed, WallClock, Window};
use core::hint::black_box;

/// The number of elements in each benchmark buffer.
pub const VECTOR_SIZE: usize = 20;
/// The number of passes over the buffer per measurement.
pub const ITERATIONS: u32 = 1000;
/// The value every benchmark buffer is filled with before it is measured.
pub const FILL_VALUE: i32 = 1;
/// The default scalar each buffer element is multiplied with.
pub const MULTIPLIER: i32 = 5;

/// The number of element operations performed by a single measurement.
pub const OPS_PER_MEASUREMENT: u32 = ITERATIONS * VECTOR_SIZE as u32;
const _: () = assert!(OPS_PER_MEASUREMENT > 0);

/// A buffer of the size every memory class is benchmarked with.
pub type Vector = [i32; VECTOR_SIZE];

/// Parameters shared by all measurements of a benchmark run, so that the results for the different
/// memory classes are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    /// The scalar each element is multiplied with.
    pub multiplier: i32,
    /// The value buffers are filled with before being measured.
    pub fill_value: i32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            multiplier: MULTIPLIER,
            fill_value: FILL_VALUE,
        }
    }
}

/// The result of measuring the compute loop over a single buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// The elapsed wall-clock time, in microseconds.
    pub micros: u64,
    /// The total number of CPU cycles spent in the loop.
    pub cycles: u32,
    /// The number of cycles per element operation, truncated.
    pub cycles_per_op: u32,
}

impl From<Elapsed> for Measurement {
    fn from(elapsed: Elapsed) -> Self {
        Measurement {
            micros: elapsed.micros,
            cycles: elapsed.cycles,
            cycles_per_op: elapsed.cycles / OPS_PER_MEASUREMENT,
        }
    }
}

/// Runs the compute loop over `buffer`, computing `buffer[j] * multiplier` for each element,
/// [ITERATIONS] times, and returns the time it took.
///
/// The buffer reference and the results are passed through [black_box] on every iteration. This
/// forces the buffer to be re-read from its memory region on each pass, and keeps the compiler from
/// eliding the multiplications, without adding any instructions of its own to the loop.
///
/// The loop runs inside a critical section, so that interrupts can't add cycles to the
/// measurement.
pub fn measure<T: CycleCounter + WallClock>(
    buffer: &Vector,
    multiplier: i32,
    clock: &T,
) -> Measurement {
    let elapsed = critical_section::with(|_| {
        let window = Window::open(clock);
        let mut results: Vector = [0; VECTOR_SIZE];
        for _ in 0..ITERATIONS {
            let buffer = black_box(buffer);
            for (result, value) in results.iter_mut().zip(buffer.iter()) {
                *result = value.wrapping_mul(multiplier);
            }
            black_box(&results);
        }
        window.close(clock)
    });
    Measurement::from(elapsed)
}

/// Returns whether two measurements of the same code agree to within `tolerance_percent` of the
/// larger of the two cycle counts.
///
/// Repeated runs on the same hardware are never exactly equal (caches, bus arbitration and the
/// like add some jitter), so this is the check to use when validating that a benchmark is
/// repeatable.
pub fn within_tolerance(a: u32, b: u32, tolerance_percent: u32) -> bool {
    let larger = a.max(b) as u64;
    let diff = a.abs_diff(b) as u64;
    diff * 100 <= larger * tolerance_percent as u64
}
