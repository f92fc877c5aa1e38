//! Quadrant CLI library.
//!
//! This crate provides the command-line interface over the scheduling and
//! priority engines.

pub mod cli;
pub mod commands;
