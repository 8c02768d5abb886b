//! Management channel to the monitored process.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │      SampleCollector / AttributeResolver      │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!               ┌────────▼─────────┐
//!               │ TargetConnection │ (trait)
//!               └────────┬─────────┘
//!                        │
//!           ┌────────────┴────────────┐
//!           │                         │
//!  ┌────────▼─────────┐      ┌────────▼────────┐
//!  │ JolokiaConnection│      │   MockTarget    │
//!  │ (HTTP/JSON)      │      │   (Testing)     │
//!  └──────────────────┘      └─────────────────┘
//! ```
//!
//! Adapters decide whether a value is scalar or structured when converting
//! the wire representation into [`AttributeValue`].

mod jolokia;
pub mod mock;

pub use jolokia::JolokiaConnection;
pub use mock::MockTarget;

use crate::error::Result;
use crate::model::{AttributeDescriptor, AttributeValue};

/// Blocking access to a target's management attributes.
pub trait TargetConnection {
    /// Establishes the channel. Called once before the first read.
    fn open(&mut self) -> Result<()>;

    /// Releases the channel. Safe to call more than once.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Returns every attribute the bean exposes, in the order the target reports them.
    fn attribute_infos(&mut self, bean: &str) -> Result<Vec<AttributeDescriptor>>;

    /// Reads the live value of one attribute.
    fn read_attribute(&mut self, bean: &str, attribute: &str) -> Result<AttributeValue>;
}
