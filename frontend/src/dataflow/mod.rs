//! Dataflow primitives shared by the view layer.
//!
//! - **[`Relay`]** - type-safe event streaming over unbounded channels; the
//!   coordinator consumes one as its operation queue.

pub mod relay;

pub use relay::{Relay, RelayError, relay};
