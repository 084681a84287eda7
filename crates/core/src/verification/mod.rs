//! Ticket verification against the booking backend.
//!
//! Split in two: a [`TicketVerifier`] that performs the single network
//! request, and [`classify`], a pure function that turns its result into the
//! [`VerificationOutcome`] the presenter shows.

mod classify;
mod client;
mod types;

pub use classify::*;
pub use client::*;
pub use types::*;
