//! # middleware
//!
//! Ready-made middleware for the handler chain: message logging and a sender allowlist.

mod logging_allowlist;

pub use logging_allowlist::{AllowlistMiddleware, LoggingMiddleware};

#[cfg(test)]
mod test;
