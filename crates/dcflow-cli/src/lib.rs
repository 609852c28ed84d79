pub mod case;
pub mod cli;
pub mod common;
pub mod report;
