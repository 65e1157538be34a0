//! Small vector library shared by the light-transport kernel.

pub mod matrix;
pub mod numbers;
pub mod util;
pub mod vector;

pub use util::{max, min};
