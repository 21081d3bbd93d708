//! Core compute primitives.
//!
//! Every classifier in the crate consumes a dense row-major [`Matrix`].

mod matrix;

pub use matrix::Matrix;
