//! External RAM support.
//!
//! Neither the ESP32-C3 nor the ESP32-C6 has an interface for external PSRAM, so allocations always
//! fail on these chips. The memory latency benchmark then reports the PSRAM class as unavailable.

use membench::harness::Vector;
use membench::memory::ExternalRam;

/// An [ExternalRam] for chips without external RAM.
pub struct NoExternalRam;

impl ExternalRam for NoExternalRam {
    type Buffer = &'static mut Vector;

    fn allocate(&mut self) -> Option<Self::Buffer> {
        None
    }
}
