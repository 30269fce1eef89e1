// Library target exists for the integration tests under tests/; the binary
// entry point is main.rs, which declares the same module tree. Some items are
// only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod app;
pub mod config;
pub mod event;
pub mod game;
pub mod store;
