//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// gostage - Go builds in ephemeral containers
///
/// Builds, tests, lints and scans Go projects inside throwaway containers,
/// with a Docker-in-Docker sidecar for tests that need a daemon.
#[derive(Parser, Debug)]
#[command(name = "gostage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GOSTAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .gostage.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the project and export the binaries
    Build(BuildArgs),

    /// Compile the project into a runnable image
    BuildContainer(BuildContainerArgs),

    /// Run go test with a Docker sidecar attached
    Test(TestArgs),

    /// Run golangci-lint
    Lint(LintArgs),

    /// Scan dependencies with govulncheck
    Vulncheck(VulncheckArgs),

    /// Clone a remote repository and build a module from it
    BuildRemote(BuildRemoteArgs),

    /// Start a Docker-in-Docker sidecar and print its endpoint
    Service(ServiceArgs),

    /// Pack a directory into a gzipped tarball
    Tar(TarArgs),

    /// Run commands in several images concurrently and wait for all of them
    Sync(SyncArgs),

    /// Check the container engine
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Manage Go module, build and Docker caches
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Project selection shared by the Go commands
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (defaults to the current directory)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Go toolchain version (golang:<version> image)
    #[arg(long)]
    pub go_version: Option<String>,

    /// Build on top of the project's vendor/ directory
    #[arg(long)]
    pub vendor: bool,

    /// Fail instead of continuing when the Docker sidecar can't be attached
    #[arg(long)]
    pub require_docker: bool,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Target architecture (GOARCH); host architecture by default
    #[arg(long)]
    pub arch: Option<String>,

    /// Target OS (GOOS); host OS by default
    #[arg(long)]
    pub os: Option<String>,

    /// Where to export the binaries
    #[arg(short, long, default_value = "out")]
    pub output: PathBuf,

    /// Extra arguments passed to go build
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the build-container command
#[derive(Args, Debug)]
pub struct BuildContainerArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Target architecture (GOARCH)
    #[arg(long)]
    pub arch: Option<String>,

    /// Target OS (GOOS)
    #[arg(long)]
    pub os: Option<String>,

    /// Base image for the result (golang.build_base by default)
    #[arg(long)]
    pub base: Option<String>,

    /// Tag for the resulting image
    #[arg(short, long)]
    pub tag: String,

    /// Extra arguments passed to go build
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package pattern
    #[arg(long, default_value = "./...")]
    pub component: String,

    /// Coverage profile location inside the container
    #[arg(long, default_value = "./")]
    pub coverage_location: String,

    /// go test timeout
    #[arg(long, default_value = "180s")]
    pub timeout: String,
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package pattern; selects the directory the linter runs in
    #[arg(long, default_value = "./...")]
    pub component: String,

    /// golangci-lint timeout
    #[arg(long, default_value = "5m")]
    pub timeout: String,
}

/// Arguments for the vulncheck command
#[derive(Args, Debug)]
pub struct VulncheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package pattern
    #[arg(long, default_value = "./...")]
    pub component: String,
}

/// Arguments for the build-remote command
#[derive(Args, Debug)]
pub struct BuildRemoteArgs {
    /// Repository without scheme (e.g. github.com/acme/tool)
    pub remote: String,

    /// Branch to check out
    pub reference: String,

    /// Package to build (e.g. ./cmd/tool)
    pub module: String,

    /// Target architecture (GOARCH)
    #[arg(long)]
    pub arch: Option<String>,

    /// Target OS (GOOS)
    #[arg(long)]
    pub platform: Option<String>,

    /// Go toolchain version
    #[arg(long)]
    pub go_version: Option<String>,

    /// Where to export the binaries
    #[arg(short, long, default_value = "build")]
    pub output: PathBuf,
}

/// Arguments for the service command
#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// docker:<version>-dind image tag
    #[arg(long)]
    pub docker_version: Option<String>,

    /// Keep the sidecar running until Ctrl-C
    #[arg(short, long)]
    pub wait: bool,
}

/// Arguments for the tar command
#[derive(Args, Debug)]
pub struct TarArgs {
    /// Directory to pack
    pub dir: PathBuf,

    /// Tarball path on the host
    #[arg(short, long, default_value = "out.tar.gz")]
    pub output: PathBuf,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Images to run (repeatable)
    #[arg(short, long = "image", required = true)]
    pub images: Vec<String>,

    /// Command to run in every image
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., golang.version)
        key: String,

        /// Value to set
        value: String,

        /// Write to the project-local .gostage.toml instead
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for the cache command
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cache volumes
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove cache volumes
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Only remove volumes created more than this many days ago
        #[arg(long)]
        older_than: Option<u32>,
    },
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Plain,
}
