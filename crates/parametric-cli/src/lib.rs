//! Library side of the `parametric` command-line tool.

pub mod logging;
pub mod tables;
pub mod workspace;
