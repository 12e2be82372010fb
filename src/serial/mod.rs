//! Certificate serial codec
//!
//! A serial is a 6-character base-36 payload (the zero-padded sequence
//! number) followed by one weighted check character.

mod codec;
mod coverage;

pub use codec::{
    check_char, encode, validate, Serial, SerialError, CHECK_WEIGHTS, MAX_SEQUENCE, PAYLOAD_LEN,
    SERIAL_LEN,
};
pub use coverage::{detection_coverage, CoverageReport, Mutation};
