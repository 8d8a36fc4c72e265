#![no_std]
// We use this feature to write inline assembly with readable register names.
#![feature(asm_const)]

// This crate contains ESP chipset-specific code. The `regions` module is not compatible with the
// ESP32-C3 chip right now.

pub mod external_ram;
pub mod perf_counter;
#[cfg(not(feature = "esp32c3"))]
pub mod regions;

/// Parks the CPU once a benchmark is done. There is nothing to return to on bare metal, so this
/// takes the place of returning from `main`.
pub fn park() -> ! {
    loop {
        unsafe { core::arch::asm!("wfi") };
    }
}
