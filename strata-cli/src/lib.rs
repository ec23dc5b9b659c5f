//! Strata CLI - applies the bundled SQL migrations to PostgreSQL.
//!
//! Reads a YAML config, connects to the target database, checks that every
//! applied migration still matches its source file, then applies the new
//! ones in name order, one transaction each.

pub mod bundled;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
