//! Interactive vs CI detection

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: [&str; 7] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
    "DAGGER_SESSION_PORT",
];

/// UI context that determines output behavior.
///
/// Tool output (test results, lint reports) goes to stdout; spinners and
/// progress go to stderr, so fancy output only depends on stderr.
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
    auto_yes: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stderr().is_terminal() && !in_ci(),
            auto_yes: false,
        }
    }

    /// Plain output, no prompts
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Answer every prompt with yes
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    /// Whether prompts can be shown (needs a terminal on stdin too)
    pub fn is_interactive(&self) -> bool {
        self.interactive && std::io::stdin().is_terminal()
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Spinners, progress bars and colors
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}

fn in_ci() -> bool {
    CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
}
