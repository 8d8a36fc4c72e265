//! Describes the memory classes that are benchmarked, and runs the compute loop over a buffer in
//! each of them.

use crate::clock::{CycleCounter, WallClock};
use crate::harness::{self, BenchConfig, Measurement, Vector};
use crate::report::MeasurementLine;
use core::ops::DerefMut;
use log::{debug, info, warn};

/// A physical memory region with its own latency characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryClass {
    /// Fast internal data RAM.
    Dram,
    /// Internal RAM that is also accessible through the instruction bus.
    Iram,
    /// RAM that retains its contents across deep sleep.
    Rtc,
    /// External RAM, attached over a serial (SPI) bus. Not present on all chips/boards.
    Psram,
    /// Read-only data stored in flash, accessed through the cache.
    Flash,
}

impl MemoryClass {
    /// The number of memory classes.
    pub const COUNT: usize = 5;
    /// All memory classes, in the order they are measured and reported.
    pub const ALL: [MemoryClass; Self::COUNT] = [
        MemoryClass::Dram,
        MemoryClass::Iram,
        MemoryClass::Rtc,
        MemoryClass::Psram,
        MemoryClass::Flash,
    ];

    /// A short label, used in the report.
    pub fn label(self) -> &'static str {
        match self {
            MemoryClass::Dram => "DRAM",
            MemoryClass::Iram => "IRAM",
            MemoryClass::Rtc => "RTC",
            MemoryClass::Psram => "PSRAM",
            MemoryClass::Flash => "FLASH",
        }
    }
}

/// A source of buffers in external RAM.
///
/// This is the only memory class whose availability is only known at runtime, so allocations can
/// fail. The returned buffer is released when it is dropped.
pub trait ExternalRam {
    type Buffer: DerefMut<Target = Vector>;

    /// Allocates a buffer in external RAM, or returns `None` if no external RAM is available (or
    /// it is exhausted).
    fn allocate(&mut self) -> Option<Self::Buffer>;
}

/// The statically placed benchmark buffers, one per memory class (except [MemoryClass::Psram],
/// which is allocated at runtime from an [ExternalRam]).
///
/// The placement of each buffer is the caller's responsibility, since it's a link-time property.
pub struct Regions<'a> {
    pub dram: &'a mut Vector,
    pub iram: &'a mut Vector,
    pub rtc: &'a mut Vector,
    pub flash: &'a Vector,
}

/// The measurements for each memory class, in the order they were taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    entries: heapless::Vec<(MemoryClass, Option<Measurement>), { MemoryClass::COUNT }>,
}

impl Results {
    /// Records the result for `class`. `None` means the class was not available.
    ///
    /// Recording the same class twice replaces the earlier result.
    pub fn record(&mut self, class: MemoryClass, measurement: Option<Measurement>) {
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == class) {
            entry.1 = measurement;
            return;
        }
        // There's room for every class, and each class is only stored once.
        let _ = self.entries.push((class, measurement));
    }

    /// Returns the measurement for `class`, if it was measured.
    pub fn get(&self, class: MemoryClass) -> Option<&Measurement> {
        self.entries
            .iter()
            .find(|(c, _)| *c == class)
            .and_then(|(_, m)| m.as_ref())
    }

    /// Returns the total cycle count for `class`. Classes that were unavailable or not measured
    /// count as zero cycles.
    pub fn cycles(&self, class: MemoryClass) -> u32 {
        self.get(class).map_or(0, |m| m.cycles)
    }

    /// Iterates over the recorded classes and their measurements.
    pub fn iter(&self) -> impl Iterator<Item = &(MemoryClass, Option<Measurement>)> {
        self.entries.iter()
    }

    /// Returns the classes whose cycle counts differ between `self` and `other` by more than
    /// `tolerance_percent`.
    pub fn drifted(
        &self,
        other: &Results,
        tolerance_percent: u32,
    ) -> heapless::Vec<MemoryClass, { MemoryClass::COUNT }> {
        MemoryClass::ALL
            .into_iter()
            .filter(|class| {
                !harness::within_tolerance(
                    self.cycles(*class),
                    other.cycles(*class),
                    tolerance_percent,
                )
            })
            .collect()
    }
}

/// Fills the writable buffers with the configured value. The flash buffer is read-only and must
/// have been initialized with the same value at compile time.
pub fn init_regions(regions: &mut Regions, config: &BenchConfig) {
    regions.dram.fill(config.fill_value);
    regions.iram.fill(config.fill_value);
    regions.rtc.fill(config.fill_value);
    if regions.flash.iter().any(|v| *v != config.fill_value) {
        warn!(
            "FLASH buffer does not hold the fill value {}, results may not be comparable",
            config.fill_value
        );
    }
}

/// Measures the compute loop over each memory class in turn, logging a line per class, and returns
/// the results.
///
/// The external RAM buffer is allocated right before it is measured and released right after. If
/// the allocation fails the class is skipped and recorded as unavailable.
pub fn run_suite<T, E>(
    regions: &Regions,
    external_ram: &mut E,
    config: &BenchConfig,
    clock: &T,
) -> Results
where
    T: CycleCounter + WallClock,
    E: ExternalRam,
{
    let mut results = Results::default();
    for class in MemoryClass::ALL {
        let measurement = match class {
            MemoryClass::Dram => Some(measure_buffer(class, regions.dram, config, clock)),
            MemoryClass::Iram => Some(measure_buffer(class, regions.iram, config, clock)),
            MemoryClass::Rtc => Some(measure_buffer(class, regions.rtc, config, clock)),
            MemoryClass::Flash => Some(measure_buffer(class, regions.flash, config, clock)),
            MemoryClass::Psram => match external_ram.allocate() {
                Some(mut buffer) => {
                    buffer.fill(config.fill_value);
                    let measurement = measure_buffer(class, &buffer, config, clock);
                    drop(buffer);
                    Some(measurement)
                }
                None => {
                    warn!("{}: not available", class.label());
                    None
                }
            },
        };
        if let Some(measurement) = measurement {
            info!("{}", MeasurementLine { class, measurement });
        }
        results.record(class, measurement);
    }
    results
}

fn measure_buffer<T: CycleCounter + WallClock>(
    class: MemoryClass,
    buffer: &Vector,
    config: &BenchConfig,
    clock: &T,
) -> Measurement {
    debug!("{}: buffer at {:p}", class.label(), buffer);
    harness::measure(buffer, config.multiplier, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::FakeClock;
    use crate::harness::{FILL_VALUE, VECTOR_SIZE};

    /// Backs "external RAM" with the host heap, counting live allocations.
    struct HeapRam {
        live: std::rc::Rc<core::cell::Cell<usize>>,
    }

    struct HeapBuffer {
        data: Box<Vector>,
        live: std::rc::Rc<core::cell::Cell<usize>>,
    }

    impl core::ops::Deref for HeapBuffer {
        type Target = Vector;
        fn deref(&self) -> &Vector {
            &self.data
        }
    }

    impl DerefMut for HeapBuffer {
        fn deref_mut(&mut self) -> &mut Vector {
            &mut self.data
        }
    }

    impl Drop for HeapBuffer {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl ExternalRam for HeapRam {
        type Buffer = HeapBuffer;
        fn allocate(&mut self) -> Option<HeapBuffer> {
            self.live.set(self.live.get() + 1);
            Some(HeapBuffer {
                data: Box::new([0; VECTOR_SIZE]),
                live: self.live.clone(),
            })
        }
    }

    struct NoRam;

    impl ExternalRam for NoRam {
        type Buffer = Box<Vector>;
        fn allocate(&mut self) -> Option<Box<Vector>> {
            None
        }
    }

    struct Buffers {
        dram: Vector,
        iram: Vector,
        rtc: Vector,
        flash: Vector,
    }

    impl Buffers {
        fn new() -> Self {
            Buffers {
                dram: [0; VECTOR_SIZE],
                iram: [0; VECTOR_SIZE],
                rtc: [0; VECTOR_SIZE],
                flash: [FILL_VALUE; VECTOR_SIZE],
            }
        }

        fn regions(&mut self) -> Regions {
            Regions {
                dram: &mut self.dram,
                iram: &mut self.iram,
                rtc: &mut self.rtc,
                flash: &self.flash,
            }
        }
    }

    #[test]
    fn init_fills_writable_regions() {
        let mut buffers = Buffers::new();
        init_regions(&mut buffers.regions(), &BenchConfig::default());
        assert_eq!([FILL_VALUE; VECTOR_SIZE], buffers.dram);
        assert_eq!([FILL_VALUE; VECTOR_SIZE], buffers.iram);
        assert_eq!([FILL_VALUE; VECTOR_SIZE], buffers.rtc);
    }

    #[test]
    fn suite_measures_every_class() {
        let mut buffers = Buffers::new();
        let mut ram = HeapRam {
            live: Default::default(),
        };
        let clock = FakeClock::new(40_000, 100);
        let results = run_suite(
            &buffers.regions(),
            &mut ram,
            &BenchConfig::default(),
            &clock,
        );

        let classes: Vec<_> = results.iter().map(|(class, _)| *class).collect();
        assert_eq!(MemoryClass::ALL.to_vec(), classes);
        for class in MemoryClass::ALL {
            let measurement = results.get(class).unwrap();
            assert_eq!(40_000, measurement.cycles);
            assert_eq!(2, measurement.cycles_per_op);
            assert_eq!(100, measurement.micros);
        }
        // The external RAM buffer was released.
        assert_eq!(0, ram.live.get());
    }

    #[test]
    fn suite_skips_unavailable_external_ram() {
        let mut buffers = Buffers::new();
        let clock = FakeClock::new(40_000, 100);
        let results = run_suite(
            &buffers.regions(),
            &mut NoRam,
            &BenchConfig::default(),
            &clock,
        );

        assert_eq!(None, results.get(MemoryClass::Psram));
        assert_eq!(0, results.cycles(MemoryClass::Psram));
        assert_eq!(40_000, results.cycles(MemoryClass::Flash));
        assert_eq!(MemoryClass::COUNT, results.iter().count());
    }

    #[test]
    fn record_replaces_existing_entry() {
        let mut results = Results::default();
        let measurement = Measurement {
            micros: 1,
            cycles: 2,
            cycles_per_op: 0,
        };
        results.record(MemoryClass::Rtc, None);
        results.record(MemoryClass::Rtc, Some(measurement));
        assert_eq!(1, results.iter().count());
        assert_eq!(Some(&measurement), results.get(MemoryClass::Rtc));
    }

    #[test]
    fn drifted_classes() {
        let measured = |cycles| {
            Some(Measurement {
                micros: 0,
                cycles,
                cycles_per_op: 0,
            })
        };
        let mut first = Results::default();
        let mut second = Results::default();
        first.record(MemoryClass::Dram, measured(1000));
        second.record(MemoryClass::Dram, measured(1010));
        first.record(MemoryClass::Rtc, measured(1000));
        second.record(MemoryClass::Rtc, measured(2000));
        first.record(MemoryClass::Psram, None);
        second.record(MemoryClass::Psram, None);

        assert_eq!(&[MemoryClass::Rtc], first.drifted(&second, 5).as_slice());
    }

    #[test]
    fn labels() {
        let labels: Vec<_> = MemoryClass::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(vec!["DRAM", "IRAM", "RTC", "PSRAM", "FLASH"], labels);
    }
}
