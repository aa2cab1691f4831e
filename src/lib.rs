//! Netemu Studio
//!
//! Orchestration and post-processing for a Linux network emulation
//! testbed: namespaces, veth links, netem shaping, packet captures, and
//! function-time analysis of instrumented client/server traces.
//!
//! This crate provides the core implementation for the `netemu` CLI.
//!
//! ## Getting Started
//!
//! ```bash
//! netemu setup --dry-run
//! netemu analyze --flow ../tcp-app-rx-flow --trace ../trace-func-call-server --tag server
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod testbed;
pub mod utils;
