//! Infrastructure layer - Adapters, persistence and configuration
//!
//! Everything here implements a port from `circle-application` or feeds the
//! composition root: entity adapters (router, loopback, scripted), the JSONL
//! transcript writer, and figment-based configuration loading with registry
//! bootstrap.

pub mod adapters;
pub mod config;
pub mod transcript;
