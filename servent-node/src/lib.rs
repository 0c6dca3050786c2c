//! Gnutella servent node library.
//!
//! This library provides the pieces of the `servent` binary: argument
//! parsing, configuration, the run sequence and signal handling. It is also
//! used by the integration tests.

pub mod cli;
pub mod config;
pub mod node;
pub mod shutdown;
