//! Serial encoding and structural validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the base-36 payload
pub const PAYLOAD_LEN: usize = 6;

/// Length of a full serial (payload + check character)
pub const SERIAL_LEN: usize = PAYLOAD_LEN + 1;

/// Positional weights applied to the payload digits
pub const CHECK_WEIGHTS: [u32; PAYLOAD_LEN] = [7, 3, 1, 7, 3, 1];

/// Largest sequence number that fits in the 6-character payload (36^6 - 1)
pub const MAX_SEQUENCE: u64 = 36u64.pow(PAYLOAD_LEN as u32) - 1;

const RADIX: u64 = 36;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Serial encoding/validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerialError {
    /// Sequence number does not fit in the payload width
    #[error("sequence number {0} exceeds serial capacity")]
    Overflow(u64),

    /// Input is not exactly the expected number of characters
    #[error("expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input contains a non-alphanumeric character
    #[error("invalid character {found:?} at position {position}")]
    InvalidCharacter { position: usize, found: char },

    /// Check character does not match the payload
    #[error("check character mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: char, found: char },
}

/// A structurally valid, uppercase certificate serial
///
/// Only constructed through [`encode`] or [`Serial::parse`], so the check
/// character always matches the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Serial(String);

impl Serial {
    /// Parse and normalize a submitted serial
    ///
    /// Accepts either case; the stored form is uppercase.
    pub fn parse(input: &str) -> Result<Self, SerialError> {
        let actual = input.chars().count();
        if actual != SERIAL_LEN {
            return Err(SerialError::InvalidLength {
                expected: SERIAL_LEN,
                actual,
            });
        }

        if let Some((position, found)) = input
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
        {
            return Err(SerialError::InvalidCharacter { position, found });
        }

        let normalized = input.to_ascii_uppercase();
        let (payload, check) = normalized.split_at(PAYLOAD_LEN);
        let expected = check_char(payload)?;
        let found = check.chars().next().unwrap_or_default();

        if expected != found {
            return Err(SerialError::ChecksumMismatch { expected, found });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 6-character base-36 payload
    pub fn payload(&self) -> &str {
        &self.0[..PAYLOAD_LEN]
    }

    /// The trailing check character
    pub fn check(&self) -> char {
        self.0.as_bytes()[PAYLOAD_LEN] as char
    }

    /// Decode the sequence number carried in the payload
    pub fn sequence_number(&self) -> u64 {
        self.payload()
            .bytes()
            .filter_map(digit_value)
            .fold(0u64, |acc, d| acc * RADIX + u64::from(d))
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Serial {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Serial {
    type Error = SerialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Serial> for String {
    fn from(serial: Serial) -> Self {
        serial.0
    }
}

impl AsRef<str> for Serial {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode a sequence number as a 7-character serial
///
/// Pure and deterministic. Fails with [`SerialError::Overflow`] once the
/// sequence no longer fits in six base-36 digits.
pub fn encode(sequence: u64) -> Result<Serial, SerialError> {
    if sequence > MAX_SEQUENCE {
        return Err(SerialError::Overflow(sequence));
    }

    let mut buf = [b'0'; SERIAL_LEN];
    let mut rest = sequence;
    for slot in buf[..PAYLOAD_LEN].iter_mut().rev() {
        *slot = ALPHABET[(rest % RADIX) as usize];
        rest /= RADIX;
    }
    buf[PAYLOAD_LEN] = ALPHABET[weighted_sum(&buf[..PAYLOAD_LEN]) as usize % ALPHABET.len()];

    // buf only ever holds ALPHABET bytes
    Ok(Serial(buf.iter().map(|&b| b as char).collect()))
}

/// Structural integrity check for a submitted serial
///
/// True iff the input is 7 alphanumeric characters (any case) whose last
/// character matches the weighted checksum of the first six. Says nothing
/// about whether the serial was ever issued.
pub fn validate(serial: &str) -> bool {
    Serial::parse(serial).is_ok()
}

/// Compute the check character for a 6-character payload
pub fn check_char(payload: &str) -> Result<char, SerialError> {
    let actual = payload.chars().count();
    if actual != PAYLOAD_LEN {
        return Err(SerialError::InvalidLength {
            expected: PAYLOAD_LEN,
            actual,
        });
    }

    let upper = payload.to_ascii_uppercase();
    if let Some((position, found)) = upper
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
    {
        return Err(SerialError::InvalidCharacter { position, found });
    }

    let sum = weighted_sum(upper.as_bytes());
    Ok(ALPHABET[sum as usize % ALPHABET.len()] as char)
}

fn weighted_sum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .zip(CHECK_WEIGHTS)
        .map(|(&b, w)| digit_value(b).unwrap_or(0) * w)
        .sum()
}

fn digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'A'..=b'Z' => Some(u32::from(b - b'A') + 10),
        b'a'..=b'z' => Some(u32::from(b - b'a') + 10),
        _ => None,
    }
}
