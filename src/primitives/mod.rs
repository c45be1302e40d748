//! Core numeric primitives (Vector, Matrix).
//!
//! Row-major value types shared by every pipeline stage.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
