#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod git;
pub mod graph;
pub mod util;
