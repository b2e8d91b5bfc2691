//! Shared test infrastructure
//!
//! Seeded message generation, delta chunking and tracing setup.

#![allow(dead_code)]

mod generators;

pub use generators::{Gen, Message};

/// Route `tracing` output through the test harness. Filter with RUST_LOG,
/// e.g. `RUST_LOG=chatwidget_core=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
