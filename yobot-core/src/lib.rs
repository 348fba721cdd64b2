//! # yobot-core
//!
//! Core types and traits for the YoAI bot framework: [`Transport`], [`Context`], raw update and
//! sender types, update decoding, errors, and tracing initialization. Transport-agnostic; used by
//! handler-chain and yobot-yoai.

pub mod context;
pub mod decode;
pub mod error;
pub mod logger;
pub mod transport;
pub mod types;

pub use context::{Context, PHOTO_CAPTION};
pub use decode::decode_content;
pub use error::{Result, TransportError, TransportErrorKind, YobotError};
pub use logger::init_tracing;
pub use transport::Transport;
pub use types::{FetchResponse, RawUpdate, Sender};
