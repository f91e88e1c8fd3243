//! Aggregation engine.
//!
//! Pure data-shaping functions from the source tables to renderable
//! series. Nothing here touches the filesystem or terminal.

pub mod aggregate;

pub use aggregate::*;
