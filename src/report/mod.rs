//! Chart rendering and artifact output.

pub mod chart;
pub mod generator;

pub use chart::SIZE_FACTOR;
pub use generator::{format_grid_table, write_gene, OutputOptions};
