//! CLI module for the rendez command-line interface.
//!
//! This module provides command handlers that load a scenario file (an
//! appointment type plus staff and seed commitments) and run the slot
//! pipeline or a booking against it.

mod commands;
mod output;
pub mod scenario;

pub use commands::*;
