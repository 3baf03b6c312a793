//! Pipeline module - parameter grid and the sequential experiment runner.

mod grid;
mod runner;

pub use grid::*;
pub use runner::*;
