//! This binary measures the average number of CPU cycles per operation (CPI) of a small arithmetic
//! workload: five operations (two additions, a remainder, a multiplication and a division) on two
//! operands, repeated a fixed number of times.
//!
//! It then reruns the workload with the performance counter counting retired instructions instead
//! of cycles, to also report the number of cycles per actual instruction, which includes the loop
//! overhead and the operand loads the workload performs.

#![no_std]
#![no_main]

#[cfg(feature = "esp32c3")]
use esp32c3_hal as hal;
#[cfg(feature = "esp32c6")]
use esp32c6_hal as hal;

use esp_backtrace as _;
use hal::{clock::ClockControl, peripherals::Peripherals, prelude::*};
use log::{error, info, warn};
use membench::cpi::{self, Metrics, Operands, ITERATIONS};
use membench_esp::perf_counter::{BenchClock, Event};

#[entry]
fn main() -> ! {
    let peripherals = Peripherals::take();
    #[cfg(feature = "esp32c3")]
    let system = peripherals.SYSTEM.split();
    #[cfg(feature = "esp32c6")]
    let system = peripherals.PCR.split();
    let clocks = ClockControl::max(system.clock_control).freeze();
    esp_println::logger::init_logger_from_env();
    info!("Booted up!");

    let mut clock = match BenchClock::new(&clocks) {
        Ok(clock) => clock,
        Err(err) => {
            error!("Cannot run the benchmark: {:?}", err);
            membench_esp::park();
        }
    };

    let operands = Operands::default();
    info!("Starting CPI benchmark with {ITERATIONS} iterations...");
    let measurement = cpi::measure(operands, ITERATIONS, &clock);
    info!("\n{}", Metrics(&measurement));

    clock.count(Event::Instructions);
    let instructions = cpi::measure(operands, ITERATIONS, &clock).elapsed.cycles;
    clock.count(Event::Cycles);
    match cpi::cycles_per_instruction(measurement.elapsed.cycles, instructions) {
        Some(cycles_per_instr) => info!(
            "Retired instructions: {instructions} | cycles per retired instruction: \
            {cycles_per_instr:.2}"
        ),
        None => warn!("Retired instructions: insufficient data"),
    }

    membench_esp::park();
}
