//! This binary compares the cost of reading data from each of the chip's memory regions.
//!
//! It runs the same compute loop (multiplying each element of a small buffer by a constant) over a
//! buffer placed in internal data RAM, RAM shared with the instruction bus, RTC RAM, external RAM
//! (when available) and flash, and prints the cycle counts along with a bar chart comparing them.
//!
//! The whole suite is then run a second time, to check that the results are repeatable.
//!
//! It is currently only supported on ESP32-C6 chips.

#![no_std]
#![no_main]

#[cfg(feature = "esp32c6")]
use esp32c6_hal as hal;

use esp_backtrace as _;
use hal::{clock::ClockControl, peripherals::Peripherals, prelude::*};
use log::{error, info, warn};
use membench::harness::{BenchConfig, ITERATIONS, VECTOR_SIZE};
use membench::memory;
use membench::report::{Analysis, Chart};
use membench_esp::external_ram::NoExternalRam;
use membench_esp::perf_counter::BenchClock;
use membench_esp::regions;

/// The maximum difference between the cycle counts of two runs over the same memory class before
/// we flag the results as unrepeatable.
const JITTER_TOLERANCE_PERCENT: u32 = 5;

#[entry]
fn main() -> ! {
    let peripherals = Peripherals::take();
    let system = peripherals.PCR.split();
    let clocks = ClockControl::max(system.clock_control).freeze();
    esp_println::logger::init_logger_from_env();
    info!("Booted up!");

    let clock = match BenchClock::new(&clocks) {
        Ok(clock) => clock,
        Err(err) => {
            error!("Cannot run the benchmark: {:?}", err);
            membench_esp::park();
        }
    };
    let mut regions = regions::take().unwrap();
    let config = BenchConfig::default();
    memory::init_regions(&mut regions, &config);

    info!("Memory comparison");
    info!("Iterations: {ITERATIONS} | Vector size: {VECTOR_SIZE}");
    let results = memory::run_suite(&regions, &mut NoExternalRam, &config, &clock);
    info!("\n{}", Chart(&results));
    info!("Measurement complete");
    info!("\n{}", Analysis(&results));

    info!("--- Repeating the measurements");
    let repeated = memory::run_suite(&regions, &mut NoExternalRam, &config, &clock);
    let drifted = results.drifted(&repeated, JITTER_TOLERANCE_PERCENT);
    if drifted.is_empty() {
        info!("All results repeated to within {JITTER_TOLERANCE_PERCENT}%");
    }
    for class in drifted {
        warn!(
            "{}: {} vs {} cycles, more than {JITTER_TOLERANCE_PERCENT}% apart",
            class.label(),
            results.cycles(class),
            repeated.cycles(class),
        );
    }

    membench_esp::park();
}
