use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("chores").expect("Failed to find chores binary");

        // Run inside the temp dir so no stray config.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("CHORES_DATABASE_PATH", &self.db_path);
        cmd.env_remove("CHORES_USER");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Same as [`command`](Self::command) but acting as `user`
    pub fn as_user(&self, user: &str) -> Command {
        let mut cmd = self.command();
        cmd.env("CHORES_USER", user);
        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Run as `user` and return stdout, asserting success
    pub fn stdout_as(&self, user: &str, args: &[&str]) -> String {
        let output = self.as_user(user).args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }

    /// Run as `user` with `--json` and parse stdout
    pub fn json_as(&self, user: &str, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        serde_json::from_str(&self.stdout_as(user, &full)).expect("stdout is not JSON")
    }

    /// Users alice and bob sharing group "Home" with category "Kitchen"
    pub fn with_household(self) -> Self {
        self.run_success(&["user", "add", "alice"]);
        self.run_success(&["user", "add", "bob"]);
        self.run_success(&["--user", "alice", "group", "add", "Home"]);

        let group = self.json_as("alice", &["group", "show", "Home"]);
        let code = group["invite_code"].as_str().expect("invite code").to_string();
        self.run_success(&["--user", "bob", "group", "join", "Home", &code]);
        self.run_success(&["--user", "alice", "category", "add", "-g", "Home", "Kitchen"]);

        self
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Due"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓")
            .and(predicate::str::contains("Created"))
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
