//! Typed client for the challenge platform's public HTTP API.
//!
//! The platform exposes a fixed HTTP/JSON surface; this crate consumes it
//! as-is. [`payload`] mirrors the wire field names and converts into the
//! domain types of the `roster` crate; [`client`] performs the requests.
pub mod client;
pub mod error;
pub mod payload;

pub use client::{DEFAULT_BASE_URL, PlatformClient};
pub use error::{ApiError, Result};
pub use payload::{ChallengeDetail, UserSummary};
