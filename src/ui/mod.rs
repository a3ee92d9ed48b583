//! Terminal UI: spinners, status lines and prompts
//!
//! Uses `cliclack` in interactive terminals and falls back to plain
//! `[OK]`/`[FAIL]` lines in CI.
//!
//! ```rust,ignore
//! use gostage::ui::{self, TaskSpinner, UiContext};
//!
//! let ctx = UiContext::detect();
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Running go test...");
//! let result = golang.test(&opts).await;
//! spinner.finish(&result, "Tests passed", "Tests failed");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{remark, step_error_detail, step_ok, step_ok_detail, step_warn_hint};
pub use progress::{CountProgress, TaskSpinner};
pub use prompts::confirm;
