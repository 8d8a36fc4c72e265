//! Places one benchmark buffer in each of the chip's statically addressable memory regions.
//!
//! On the ESP32-C6 the internal HP SRAM is unified: the same memory is reachable through both the
//! instruction and data buses, at the same addresses. Data placed in the `.rwtext` section (where
//! `#[ram]` functions live) is therefore readable with regular loads.

#[cfg(feature = "esp32c6")]
use esp32c6_hal as hal;

use core::cell::Cell;
use core::ptr::addr_of_mut;
use critical_section::Mutex;
use hal::prelude::*;
use membench::harness::{Vector, FILL_VALUE, VECTOR_SIZE};
use membench::memory::Regions;

/// Lives in the default data sections, in internal SRAM accessed through the data bus.
static mut DRAM_VECTOR: Vector = [0; VECTOR_SIZE];

/// Lives in the same section as the code placed in RAM using `#[ram]`.
#[link_section = ".rwtext"]
static mut IRAM_VECTOR: Vector = [0; VECTOR_SIZE];

/// Lives in the low power (RTC) SRAM, which retains its contents in deep sleep.
#[ram(rtc_fast)]
static mut RTC_VECTOR: Vector = [0; VECTOR_SIZE];

/// Immutable statics are placed in `.rodata`, which is mapped from flash through the cache.
static FLASH_VECTOR: Vector = [FILL_VALUE; VECTOR_SIZE];

static TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

/// Returns the statically placed buffers. Returns `None` if they have already been taken, so that
/// there is never more than one mutable reference to each.
pub fn take() -> Option<Regions<'static>> {
    let already_taken = critical_section::with(|cs| TAKEN.borrow(cs).replace(true));
    if already_taken {
        return None;
    }
    // SAFETY: the TAKEN flag guarantees that these references are only ever handed out once, and
    // nothing else in this crate accesses the statics.
    unsafe {
        Some(Regions {
            dram: &mut *addr_of_mut!(DRAM_VECTOR),
            iram: &mut *addr_of_mut!(IRAM_VECTOR),
            rtc: &mut *addr_of_mut!(RTC_VECTOR),
            flash: &FLASH_VECTOR,
        })
    }
}
