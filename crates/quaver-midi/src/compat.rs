//! Compatibility layer for no_std + alloc.

pub use alloc::{string::String, vec::Vec};
