//! SCAI Press backend library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod config;
pub mod error;
pub mod irys;
pub mod paper;
pub mod routes;
pub mod state;
pub mod upload;
