pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::WorkerConfig;

pub use crate::adapters::{ChannelSink, ChannelTransport, JsonLinesSink, JsonLinesTransport, SapProductClient};
pub use crate::core::{reducer::AccepterPolicy, worker::Worker, worker::WorkerStats};
pub use crate::utils::error::{Result, WorkerError};
