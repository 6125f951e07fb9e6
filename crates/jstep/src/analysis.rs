//! Dynamic analysis: argument synthesis and confidence calibration.
//!
//! Argument tuples are drawn from a seeded xorshift64 generator, so the same
//! seed always produces the same tuples. Outcome frequencies over all runs
//! are turned into `label;N%` confidence lines.

use jstep_bytecode::{Descriptor, TypeCode};
use jstep_core::Outcome;

use crate::config::AnalysisSettings;

/// Labels reported by `analyze`, in output order
pub const REPORTED: [Outcome; 6] = [
    Outcome::Ok,
    Outcome::DivideByZero,
    Outcome::AssertionError,
    Outcome::IndexOutOfBounds,
    Outcome::NullPointer,
    Outcome::StepLimitExceeded,
];

/// Seeded xorshift64 generator
#[derive(Debug, Clone)]
pub struct Sampler {
    state: u64,
}

impl Sampler {
    const FALLBACK_SEED: u64 = 0x853c_49e6_748f_ea9b;

    /// Create a sampler; a zero seed is replaced, since xorshift never leaves zero
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Next raw value
    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.state = s;
        s
    }

    /// Uniform-ish int in `lo..=hi`
    pub fn int_in(&mut self, lo: i32, hi: i32) -> i32 {
        debug_assert!(lo <= hi);
        let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
        (i64::from(lo) + (self.next_u64() % span) as i64) as i32
    }
}

/// Range of values a parameter is sampled from
fn sample_bounds(ty: &TypeCode, range: i32) -> (i32, i32) {
    let range = range.max(0);
    match ty {
        TypeCode::Byte => (-range.min(128), range.min(127)),
        TypeCode::Char => (0x20, 0x7e),
        _ => (-range, range),
    }
}

/// `0` followed by up to `extra` distinct non-zero samples
fn int_values(ty: &TypeCode, extra: usize, range: i32, sampler: &mut Sampler) -> Vec<i32> {
    let (lo, hi) = sample_bounds(ty, range);
    let mut values = vec![0];
    let mut attempts = 0;
    while values.len() < extra + 1 && attempts < extra * 16 {
        attempts += 1;
        let v = sampler.int_in(lo, hi);
        if !values.contains(&v) {
            values.push(v);
        }
    }
    values
}

/// Argument literal for a sampled int of the given type
fn format_int(ty: &TypeCode, value: i32) -> String {
    match ty {
        TypeCode::Char => match u8::try_from(value).map(char::from) {
            Ok('\'') => r"'\''".to_string(),
            Ok('\\') => r"'\\'".to_string(),
            Ok(c) if c.is_ascii_graphic() || c == ' ' => format!("'{c}'"),
            _ => value.to_string(),
        },
        TypeCode::Float => format!("{value}.0"),
        _ => value.to_string(),
    }
}

/// Candidate argument literals for one parameter
fn parameter_values(
    ty: &TypeCode,
    extra: usize,
    settings: &AnalysisSettings,
    sampler: &mut Sampler,
) -> Vec<String> {
    match ty {
        TypeCode::Boolean => vec!["true".to_string(), "false".to_string()],
        TypeCode::Reference(_) | TypeCode::Array(_) => vec!["null".to_string()],
        TypeCode::Int | TypeCode::Byte | TypeCode::Char | TypeCode::Float => {
            int_values(ty, extra, settings.sample_range, sampler)
                .into_iter()
                .map(|v| format_int(ty, v))
                .collect()
        }
    }
}

/// Argument tuples to run for a descriptor
pub fn synthesize(descriptor: &Descriptor, settings: &AnalysisSettings) -> Vec<String> {
    let mut sampler = Sampler::new(settings.seed);
    let extra = match descriptor.params.len() {
        1 => settings.int_samples,
        _ => settings.pair_samples.saturating_sub(1),
    };

    let mut tuples: Vec<Vec<String>> = vec![Vec::new()];
    for ty in &descriptor.params {
        let values = parameter_values(ty, extra, settings, &mut sampler);
        tuples = tuples
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut tuple = prefix.clone();
                    tuple.push(v.clone());
                    tuple
                })
            })
            .collect();
    }

    tuples
        .into_iter()
        .map(|tuple| format!("({})", tuple.join(", ")))
        .collect()
}

/// Outcome counts over a batch of runs
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: [usize; Outcome::ALL.len()],
    runs: usize,
    faults: usize,
}

impl Tally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run that produced an outcome
    pub fn record(&mut self, outcome: Outcome) {
        self.runs += 1;
        if let Some(i) = Outcome::ALL.iter().position(|o| *o == outcome) {
            self.counts[i] += 1;
        }
    }

    /// Record a run that faulted
    pub fn record_fault(&mut self) {
        self.runs += 1;
        self.faults += 1;
    }

    /// Runs that ended with `outcome`
    pub fn count(&self, outcome: Outcome) -> usize {
        Outcome::ALL
            .iter()
            .position(|o| *o == outcome)
            .map_or(0, |i| self.counts[i])
    }

    /// All recorded runs, faults included
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Runs that faulted
    pub fn faults(&self) -> usize {
        self.faults
    }

    /// Frequency of `outcome` in percent, rounded down
    pub fn percent(&self, outcome: Outcome) -> u32 {
        if self.runs == 0 {
            return 0;
        }
        (self.count(outcome) * 100 / self.runs) as u32
    }
}

/// Map a frequency to a reported confidence
pub fn calibrate(percent: u32, settings: &AnalysisSettings) -> u32 {
    if percent >= settings.floor {
        (percent + settings.boost).min(settings.ceiling)
    } else {
        percent.min(settings.ceiling)
    }
}

/// `label;N%` lines for every reported label
pub fn report_lines(tally: &Tally, settings: &AnalysisSettings) -> Vec<String> {
    REPORTED
        .iter()
        .map(|outcome| {
            let confidence = calibrate(tally.percent(*outcome), settings);
            format!("{};{}%", outcome.label(), confidence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AnalysisSettings {
        AnalysisSettings::default()
    }

    fn descriptor(s: &str) -> Descriptor {
        s.parse().unwrap()
    }

    #[test]
    fn test_sampler_is_deterministic() {
        let mut a = Sampler::new(42);
        let mut b = Sampler::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut zero = Sampler::new(0);
        assert_ne!(zero.next_u64(), 0);
    }

    #[test]
    fn test_sampler_respects_bounds() {
        let mut sampler = Sampler::new(7);
        for _ in 0..1000 {
            let v = sampler.int_in(-3, 3);
            assert!((-3..=3).contains(&v));
        }
        for _ in 0..100 {
            let _ = sampler.int_in(i32::MIN, i32::MAX);
        }
    }

    #[test]
    fn test_no_parameters() {
        assert_eq!(synthesize(&descriptor("()V"), &settings()), vec!["()"]);
    }

    #[test]
    fn test_single_boolean() {
        assert_eq!(
            synthesize(&descriptor("(Z)V"), &settings()),
            vec!["(true)", "(false)"]
        );
    }

    #[test]
    fn test_single_int_starts_with_zero() {
        let tuples = synthesize(&descriptor("(I)I"), &settings());
        assert_eq!(tuples.len(), 9);
        assert_eq!(tuples[0], "(0)");
        let mut unique = tuples.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), tuples.len());
    }

    #[test]
    fn test_int_pairs_are_a_cross_product() {
        let tuples = synthesize(&descriptor("(II)I"), &settings());
        assert_eq!(tuples.len(), 16);
        assert_eq!(tuples[0], "(0, 0)");
    }

    #[test]
    fn test_mixed_parameters() {
        let tuples = synthesize(&descriptor("(ZI)V"), &settings());
        assert_eq!(tuples.len(), 8);
        assert!(tuples.iter().all(|t| t.starts_with("(true, ") || t.starts_with("(false, ")));
    }

    #[test]
    fn test_byte_and_char_samples() {
        let settings = AnalysisSettings {
            sample_range: 1000,
            ..settings()
        };
        for tuple in synthesize(&descriptor("(B)V"), &settings) {
            let inner = tuple.trim_start_matches('(').trim_end_matches(')');
            assert!(inner.parse::<i8>().is_ok(), "{tuple}");
        }
        let chars = synthesize(&descriptor("(C)V"), &settings);
        assert_eq!(chars[0], "(0)");
        assert!(chars[1..].iter().all(|t| t.starts_with("('")));
    }

    #[test]
    fn test_tiny_range_stops_sampling() {
        let settings = AnalysisSettings {
            sample_range: 1,
            ..settings()
        };
        let tuples = synthesize(&descriptor("(I)V"), &settings);
        assert!(tuples.len() <= 3);
    }

    #[test]
    fn test_calibration() {
        let s = settings();
        assert_eq!(calibrate(0, &s), 0);
        assert_eq!(calibrate(19, &s), 19);
        assert_eq!(calibrate(20, &s), 69);
        assert_eq!(calibrate(50, &s), 98);
        assert_eq!(calibrate(100, &s), 98);
    }

    #[test]
    fn test_report_lines() {
        let mut tally = Tally::new();
        tally.record(Outcome::Ok);
        tally.record(Outcome::AssertionError);
        tally.record(Outcome::AssertionError);
        tally.record(Outcome::UncaughtException);
        tally.record_fault();
        assert_eq!(tally.runs(), 5);
        assert_eq!(tally.faults(), 1);
        assert_eq!(
            report_lines(&tally, &settings()),
            vec![
                "ok;69%",
                "divide by zero;0%",
                "assertion error;89%",
                "out of bounds;0%",
                "null pointer;0%",
                "*;0%",
            ]
        );
    }
}
