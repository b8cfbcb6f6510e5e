//! Swing analysis worker.
//!
//! This crate provides:
//! - Environment configuration
//! - Job processing with timeout and cancellation
//! - Structured job logging and Prometheus metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, SwingLogger};
pub use processor::SwingProcessor;
