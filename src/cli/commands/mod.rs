//! CLI command implementations

pub mod build;
pub mod build_container;
pub mod build_remote;
pub mod cache;
mod common;
pub mod completions;
pub mod config;
pub mod lint;
pub mod service;
pub mod status;
pub mod sync;
pub mod tar;
pub mod test;
pub mod vulncheck;

pub use build::execute as build;
pub use build_container::execute as build_container;
pub use build_remote::execute as build_remote;
pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use lint::execute as lint;
pub use service::execute as service;
pub use status::execute as status;
pub use sync::execute as sync;
pub use tar::execute as tar;
pub use test::execute as test;
pub use vulncheck::execute as vulncheck;
