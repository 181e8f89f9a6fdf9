//! Paced HTTP transport for department directory pages.
//!
//! Issues GET or form POST requests one at a time with a fixed delay before
//! each live request, an explicit timeout, and bounded retry with exponential
//! backoff for transient failures.

mod client;
mod errors;
mod request;
mod stats;

pub use self::client::{Client, ClientConfig, DEFAULT_USER_AGENT};
pub use self::errors::Error;
pub use self::request::{FetchRequest, Method};
pub use self::stats::{FetchStats, RequestTracker};
