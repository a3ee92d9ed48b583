//! Integration tests for gostage

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn gostage() -> Command {
        cargo_bin_cmd!("gostage")
    }

    /// gostage with an isolated config file and no local discovery
    fn gostage_with_config(config: &Path) -> Command {
        let mut cmd = gostage();
        cmd.arg("--no-local").arg("--config").arg(config);
        cmd
    }

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        gostage()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("ephemeral containers"))
            .stdout(predicate::str::contains("build-remote"))
            .stdout(predicate::str::contains("vulncheck"));
    }

    #[test]
    fn version_displays() {
        gostage()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("gostage"));
    }

    #[test]
    fn test_help_shows_defaults() {
        gostage()
            .args(["test", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--coverage-location"))
            .stdout(predicate::str::contains("180s"));
    }

    #[test]
    fn lint_help_shows_component() {
        gostage()
            .args(["lint", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--component"))
            .stdout(predicate::str::contains("5m"));
    }

    #[test]
    fn config_path_follows_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");

        gostage_with_config(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_path_follows_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("from-env.toml");

        gostage()
            .env("GOSTAGE_CONFIG", &path)
            .args(["--no-local", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("from-env.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");

        gostage_with_config(&path)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[golang]"))
            .stdout(predicate::str::contains("1.23.4"))
            .stdout(predicate::str::contains("golangci/golangci-lint:latest"));
    }

    #[test]
    fn config_init_then_set() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        gostage_with_config(&path)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(path.exists());

        gostage_with_config(&path)
            .args(["config", "set", "golang.version", "1.22.5"])
            .assert()
            .success();

        gostage_with_config(&path)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.22.5"));
    }

    #[test]
    fn config_set_unknown_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        gostage_with_config(&path)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_reported() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[golang\n");

        gostage_with_config(&path)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn local_config_is_merged() {
        let temp = TempDir::new().unwrap();
        let global = write_config(&temp, "[golang]\nlint_image = \"custom/lint:1\"\n");
        let project = temp.path().join("project");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(
            project.join(".gostage.toml"),
            "[golang]\nversion = \"1.21.0\"\n",
        )
        .unwrap();

        gostage()
            .current_dir(&project)
            .arg("--config")
            .arg(&global)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.21.0"))
            .stdout(predicate::str::contains("custom/lint:1"));
    }

    #[test]
    fn completions_generate() {
        gostage()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("gostage"));
    }

    #[test]
    fn missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        gostage_with_config(&path)
            .args(["lint", "--source", "/nonexistent/gostage-project"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn unsupported_engine_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[engine]\nbinary = \"nerdctl\"\n");

        gostage_with_config(&path)
            .args(["test", "--source"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported engine binary"));
    }

    #[test]
    fn missing_engine_binary_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[engine]\nbinary = \"/nonexistent/bin/docker\"\n");

        gostage_with_config(&path)
            .args(["build", "--source"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Container engine not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn status_reports_missing_engine() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[engine]\nbinary = \"/nonexistent/bin/docker\"\n");

        gostage_with_config(&path)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not found"));
    }
}
