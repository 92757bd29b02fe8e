//! `?`-parameterised SQL fragment building blocks for the filterer pipeline.
//!
//! This crate knows nothing about filter expressions or schemas; it only
//! provides the low-level pieces the lowerer composes: a dynamic argument
//! [`Value`], a [`Fragment`] accumulator, and the `LIKE` escaping rule.

mod escape;
mod fragment;
mod value;

pub use escape::escape_like_arg;
pub use fragment::Fragment;
pub use value::Value;
