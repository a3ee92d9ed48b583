//! Go build, test and lint helpers
//!
//! Operations run in `golang:<version>` containers with shared module and
//! build caches. Every operation that prepares a container also attaches
//! a Docker-in-Docker sidecar so tests can start containers of their own:
//!
//! ```text
//! BuildState ──prepare──▶ /src + workdir ──attach──▶ Attached | Degraded
//!                                                      │
//!                                          go build / go test / govulncheck
//! ```
//!
//! Linting runs in the golangci-lint image and gets no sidecar.

mod attach;
pub mod constants;
mod ops;
mod pipeline;
pub mod platform;
mod provision;
mod state;

pub use attach::{attach_service, Attachment};
pub use ops::{
    lint_workdir, BuildOpts, Golang, LintOpts, RemoteBuildOpts, TestOpts, VulncheckOpts,
    VulncheckReport,
};
pub use pipeline::prepare;
pub use provision::docker_service;
pub use state::{base_container, base_image, vendored, with_go_caches, BuildState};
