//! Typed media descriptors built from untyped lookup query strings.

pub mod descriptor;

pub use descriptor::*;
