//! Renders benchmark results in a human-readable format.
//!
//! Each piece of output is a wrapper struct whose [core::fmt::Display] implementation does the
//! formatting, so that it can be passed straight to a logging macro without an intermediate buffer.

use crate::harness::Measurement;
use crate::memory::{MemoryClass, Results};
use core::fmt::{self, Display, Formatter, Write};

/// The length of the bar drawn for the slowest memory class.
pub const BAR_WIDTH: usize = 50;

const SEPARATOR: &str = "----------------------------------------";

/// Printed instead of a value whose computation would divide by zero.
const INSUFFICIENT_DATA: &str = "insufficient data";

/// Formats a single measurement as one line: label, wall-clock time, total cycles and cycles per
/// operation.
pub struct MeasurementLine {
    pub class: MemoryClass,
    pub measurement: Measurement,
}

impl Display for MeasurementLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6}: {:5} us | {:5} cycles | {:3} cycles/op",
            self.class.label(),
            self.measurement.micros,
            self.measurement.cycles,
            self.measurement.cycles_per_op
        )
    }
}

/// Returns the length of the bar representing `cycles`, scaled such that `max_cycles` maps to
/// [BAR_WIDTH]. Returns `None` if `max_cycles` is zero, in which case no meaningful scale exists.
pub fn bar_length(cycles: u32, max_cycles: u32) -> Option<usize> {
    if max_cycles == 0 {
        return None;
    }
    let length = cycles as u64 * BAR_WIDTH as u64 / max_cycles as u64;
    Some((length as usize).min(BAR_WIDTH))
}

struct Bar(usize);

impl Display for Bar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_char('█')?;
        }
        Ok(())
    }
}

/// Formats a horizontal bar chart comparing the total cycle counts of all recorded classes,
/// relative to the slowest one. Unavailable classes are drawn with zero cycles.
pub struct Chart<'a>(pub &'a Results);

impl<'a> Display for Chart<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relative performance:")?;
        writeln!(f, "{SEPARATOR}")?;
        let max_cycles = self
            .0
            .iter()
            .map(|(class, _)| self.0.cycles(*class))
            .max()
            .unwrap_or(0);
        if max_cycles == 0 {
            writeln!(f, "{INSUFFICIENT_DATA}: no cycles were recorded")?;
        } else {
            for (class, _) in self.0.iter() {
                let cycles = self.0.cycles(*class);
                let length = bar_length(cycles, max_cycles).unwrap_or(0);
                writeln!(f, "{:<6}: {} {} cycles", class.label(), Bar(length), cycles)?;
            }
        }
        write!(f, "{SEPARATOR}")
    }
}

/// Returns `numerator / denominator`, or `None` if the denominator is zero.
pub fn ratio(numerator: u32, denominator: u32) -> Option<u32> {
    numerator.checked_div(denominator)
}

/// Formats a short analysis of the results: how IRAM and RTC memory compare to DRAM, and whether
/// PSRAM performs well.
pub struct Analysis<'a>(pub &'a Results);

impl<'a> Display for Analysis<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let dram = self.0.cycles(MemoryClass::Dram);
        let iram = self.0.cycles(MemoryClass::Iram);
        let rtc = self.0.cycles(MemoryClass::Rtc);
        let psram = self.0.cycles(MemoryClass::Psram);

        writeln!(f, "Analysis:")?;
        match ratio(dram, iram) {
            Some(factor) => writeln!(f, "- IRAM is {factor}x faster than DRAM")?,
            None => writeln!(f, "- IRAM vs DRAM: {INSUFFICIENT_DATA}")?,
        }
        match ratio(rtc, dram) {
            Some(factor) => writeln!(f, "- RTC is {factor}x slower than DRAM")?,
            None => writeln!(f, "- RTC vs DRAM: {INSUFFICIENT_DATA}")?,
        }
        let verdict = if psram > 0 && (psram as u64) < 2 * dram as u64 {
            "good"
        } else {
            "poor"
        };
        write!(f, "- PSRAM shows {verdict} performance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(cycles: [u32; MemoryClass::COUNT]) -> Results {
        let mut results = Results::default();
        for (class, cycles) in MemoryClass::ALL.into_iter().zip(cycles) {
            let measurement = (cycles > 0).then_some(Measurement {
                micros: 0,
                cycles,
                cycles_per_op: 0,
            });
            results.record(class, measurement);
        }
        results
    }

    #[test]
    fn format_measurement_line() {
        let line = MeasurementLine {
            class: MemoryClass::Rtc,
            measurement: Measurement {
                micros: 153,
                cycles: 24_512,
                cycles_per_op: 1,
            },
        };
        assert_eq!(
            "RTC   :   153 us | 24512 cycles |   1 cycles/op",
            line.to_string()
        );
    }

    #[test]
    fn bar_lengths_scale_to_max() {
        assert_eq!(Some(BAR_WIDTH), bar_length(1234, 1234));
        assert_eq!(Some(25), bar_length(500, 1000));
        assert_eq!(Some(0), bar_length(0, 1000));
        assert_eq!(Some(49), bar_length(999, 1000));
        assert_eq!(Some(BAR_WIDTH), bar_length(u32::MAX, u32::MAX));
        assert_eq!(None, bar_length(0, 0));
        assert_eq!(None, bar_length(10, 0));
    }

    #[test]
    fn bar_lengths_never_exceed_width() {
        for max in [1, 7, 50, 999, 1_000_000] {
            for cycles in [0, 1, max / 3, max / 2, max] {
                let length = bar_length(cycles, max).unwrap();
                assert!(length <= BAR_WIDTH);
            }
            assert_eq!(Some(BAR_WIDTH), bar_length(max, max));
        }
    }

    #[test]
    fn format_chart() {
        let chart = Chart(&results([200, 100, 400, 0, 1000]));
        assert_eq!(
            "Relative performance:\n\
             ----------------------------------------\n\
             DRAM  : ██████████ 200 cycles\n\
             IRAM  : █████ 100 cycles\n\
             RTC   : ████████████████████ 400 cycles\n\
             PSRAM :  0 cycles\n\
             FLASH : ██████████████████████████████████████████████████ 1000 cycles\n\
             ----------------------------------------",
            chart.to_string()
        );
    }

    #[test]
    fn format_chart_without_cycles() {
        let chart = Chart(&results([0; MemoryClass::COUNT]));
        assert_eq!(
            "Relative performance:\n\
             ----------------------------------------\n\
             insufficient data: no cycles were recorded\n\
             ----------------------------------------",
            chart.to_string()
        );
        // Same for a chart without any entries.
        assert!(Chart(&Results::default())
            .to_string()
            .contains("insufficient data"));
    }

    #[test]
    fn format_analysis() {
        let analysis = Analysis(&results([2000, 1000, 9000, 3000, 5000]));
        assert_eq!(
            "Analysis:\n\
             - IRAM is 2x faster than DRAM\n\
             - RTC is 4x slower than DRAM\n\
             - PSRAM shows good performance",
            analysis.to_string()
        );
    }

    #[test]
    fn format_analysis_with_missing_data() {
        let analysis = Analysis(&results([0, 0, 9000, 0, 5000]));
        assert_eq!(
            "Analysis:\n\
             - IRAM vs DRAM: insufficient data\n\
             - RTC vs DRAM: insufficient data\n\
             - PSRAM shows poor performance",
            analysis.to_string()
        );
    }

    #[test]
    fn slow_psram_is_poor() {
        let analysis = Analysis(&results([1000, 1000, 1000, 2000, 1000]));
        assert!(analysis.to_string().ends_with("PSRAM shows poor performance"));
    }
}
