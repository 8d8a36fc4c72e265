//! Platform-independent building blocks for measuring the performance of a single-core
//! microcontroller: cycle-accurate measurement windows, the memory latency benchmark and its
//! report, and the cycles-per-instruction benchmark.
//!
//! Chip-specific code (reading the hardware counters, placing buffers in specific memory regions)
//! lives in the `membench_esp` crate.

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod cpi;
pub mod harness;
pub mod memory;
pub mod report;
