//! Verification station: binds acquisition, verification and the presenter.
//!
//! The station owns the scan mode and at most one camera session. Decoded
//! payloads from any source go through the same dispatch path:
//! - **Dispatch**: presenter enters Pending and hands out a token
//! - **Verify**: one backend request, bounded by a timeout
//! - **Settle**: the classified outcome is applied if the token is still current

mod runner;
mod types;

pub use runner::VerificationStation;
pub use types::{ScanStatus, StationSettings};
