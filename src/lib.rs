//! jmxpoll - periodic JMX attribute sampler.
//!
//! This library provides the core functionality shared between:
//! - `jmxpoll` - continuous monitor printing one CSV line per interval
//! - `jmxpoll-dump` - one-shot `key: value` dump of selected attributes
//!
//! Modules:
//! - `model` - attribute specs, values and per-tick records
//! - `resolver` / `flatten` / `collector` - from bean specs to a flat record
//! - `sampler` - the tick loop and its scheduling contract
//! - `dump` - one-shot `key: value` output
//! - `target` - management channel (Jolokia, mock)
//! - `locator` - finding the target process in `/proc`
//! - `config` - beans file and runtime settings
//! - `fmt` - value and line rendering

pub mod collector;
pub mod config;
pub mod dump;
pub mod error;
pub mod flatten;
pub mod fmt;
pub mod locator;
pub mod model;
pub mod resolver;
pub mod sampler;
pub mod target;

pub use error::{MonitorError, Result};
