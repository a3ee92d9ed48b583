//! gostage - containerized Go build, test and lint
//!
//! Runs `go build`, `go test`, `golangci-lint` and `govulncheck` in
//! ephemeral containers, with a Docker-in-Docker sidecar attached so
//! tests can start containers of their own.

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod golang;
pub mod sync;
pub mod ui;

pub use error::{GostageError, GostageResult};
