//! Public verification and holder sharing controls

mod gate;
mod sharing;

pub use gate::VerificationGate;
pub use sharing::SharingControl;
