//! Errors surfaced by the layout engine.
//!
//! None of these are fatal: every one leaves the engine in the state it had
//! before the failing call.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// A table radius that cannot produce a usable layout (non-positive,
    /// infinite or NaN).
    #[error("table radius must be a positive finite number, got {0}")]
    InvalidScaleInput(f64),
    #[error("no body named {0:?} in the catalog")]
    UnknownBody(String),
    #[error("the solar system has not been placed on a surface yet")]
    NotPlaced,
    #[error("the solar system is already placed")]
    AlreadyPlaced,
    /// The simulated date would leave the calendar range `time` supports.
    #[error("simulated date out of range")]
    DateOutOfRange,
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
