//! Single-substitution detection sweep for the check character

use super::codec::{validate, Serial, SERIAL_LEN};

const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A single-character substitution that still validates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Zero-based position in the serial
    pub position: usize,
    /// Replacement character
    pub replacement: char,
    /// The mutated serial
    pub serial: String,
}

/// Outcome of sweeping every single-character substitution of a serial
#[derive(Debug, Clone)]
pub struct CoverageReport {
    /// Number of substitutions tried (7 positions x 35 alternatives)
    pub total: usize,
    /// Substitutions rejected by `validate`
    pub detected: usize,
    /// Substitutions that still pass `validate`
    pub undetected: Vec<Mutation>,
}

impl CoverageReport {
    /// Fraction of substitutions caught, in `[0, 1]`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.detected as f64 / self.total as f64
    }
}

/// Try every alternative character at every position of `serial`
///
/// Weights 7 and 1 are coprime with 36, so any change at those positions
/// moves the checksum. Weight 3 shares the factor 3 with 36: a change whose
/// digit delta is a multiple of 12 goes unnoticed there.
pub fn detection_coverage(serial: &Serial) -> CoverageReport {
    let original: Vec<char> = serial.as_str().chars().collect();
    let mut report = CoverageReport {
        total: 0,
        detected: 0,
        undetected: Vec::new(),
    };

    for position in 0..SERIAL_LEN {
        for replacement in ALPHABET.chars().filter(|&c| c != original[position]) {
            let mut mutated = original.clone();
            mutated[position] = replacement;
            let mutated: String = mutated.into_iter().collect();

            report.total += 1;
            if validate(&mutated) {
                report.undetected.push(Mutation {
                    position,
                    replacement,
                    serial: mutated,
                });
            } else {
                report.detected += 1;
            }
        }
    }

    report
}
