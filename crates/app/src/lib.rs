//! Shared command-line handling for the demo binaries.

pub mod args;
