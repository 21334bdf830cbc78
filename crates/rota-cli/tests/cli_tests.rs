use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Temporary database plus an isolated XDG config home.
struct CliTestEnvironment {
    temp_dir: TempDir,
}

impl CliTestEnvironment {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let env = Self { temp_dir };
        // Every test looks at the same month regardless of today's date
        env.cmd().args(["view", "2024", "2"]).assert().success();
        env
    }

    /// Command with --no-color and the test database
    fn cmd(&self) -> Command {
        let mut cmd = rota_cmd();
        cmd.env("XDG_CONFIG_HOME", self.temp_dir.path().join("config"))
            .env("XDG_DATA_HOME", self.temp_dir.path().join("data"))
            .arg("--database-file")
            .arg(self.temp_dir.path().join("cli_test.db"));
        cmd
    }
}

/// Helper function to create a Command with --no-color flag for testing
fn rota_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rota").expect("Failed to find rota binary");
    cmd.arg("--no-color");
    cmd
}

#[test]
fn test_cli_grid_full_weeks() {
    rota_cmd()
        .args(["grid", "2024", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# February 2024"))
        .stdout(predicate::str::contains("| Week | Mon |"))
        .stdout(predicate::str::contains("(29)"))
        .stdout(predicate::str::contains("(3)"));
}

#[test]
fn test_cli_grid_partial_weeks() {
    rota_cmd()
        .args(["grid", "2024", "2", "--partial-weeks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("29"))
        .stdout(predicate::str::contains("(29)").not());
}

#[test]
fn test_cli_grid_rejects_bad_month() {
    rota_cmd().args(["grid", "2024", "13"]).assert().failure();
}

#[test]
fn test_cli_show_empty() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("# February 2024"))
        .stdout(predicate::str::contains("No resources found."));
}

#[test]
fn test_cli_resource_add_and_list() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .args(["resource", "add", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created resource 1: Alice"))
        .stdout(predicate::str::contains("| Alice |"));

    env.cmd()
        .args(["resource", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- 1: Alice"));
}

#[test]
fn test_cli_entry_add_shows_cell() {
    let env = CliTestEnvironment::new();
    env.cmd().args(["resource", "add", "Alice"]).assert().success();

    env.cmd()
        .args(["entry", "add", "1", "2024-02-14", "On call"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created entry 1"))
        .stdout(predicate::str::contains("On call"));

    env.cmd()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("On call"));
}

#[test]
fn test_cli_entry_move_between_resources() {
    let env = CliTestEnvironment::new();
    env.cmd().args(["resource", "add", "Alice"]).assert().success();
    env.cmd().args(["resource", "add", "Bob"]).assert().success();
    env.cmd()
        .args(["entry", "add", "1", "2024-02-14", "Handover"])
        .assert()
        .success();

    env.cmd()
        .args(["entry", "move", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved entry 1 to resource 2"))
        .stdout(predicate::str::is_match(r"\| Bob \|[^\n]*Handover").unwrap())
        .stdout(predicate::str::is_match(r"\| Alice \|[^\n]*Handover").unwrap().not());
}

#[test]
fn test_cli_entry_remove_clears_cell() {
    let env = CliTestEnvironment::new();
    env.cmd().args(["resource", "add", "Alice"]).assert().success();
    env.cmd()
        .args(["entry", "add", "1", "2024-02-14", "Standby"])
        .assert()
        .success();

    env.cmd()
        .args(["entry", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed entry 1"))
        .stdout(predicate::str::contains("Standby").not());
}

#[test]
fn test_cli_resource_remove() {
    let env = CliTestEnvironment::new();
    env.cmd().args(["resource", "add", "Alice"]).assert().success();

    env.cmd()
        .args(["resource", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed resource 1"))
        .stdout(predicate::str::contains("No resources found."));
}

#[test]
fn test_cli_remove_missing_entry_fails() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .args(["entry", "remove", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to remove entry 99"));
}

#[test]
fn test_cli_view_switches_month() {
    let env = CliTestEnvironment::new();
    env.cmd().args(["resource", "add", "Alice"]).assert().success();
    env.cmd()
        .args(["entry", "add", "1", "2024-03-05", "March shift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("March shift").not());

    env.cmd()
        .args(["view", "2024", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# March 2024"))
        .stdout(predicate::str::contains("March shift"));
}

#[test]
fn test_cli_invalid_config_is_reported() {
    let env = CliTestEnvironment::new();
    let config_path = env.temp_dir.path().join("planner.json");
    std::fs::write(
        &config_path,
        r#"{ "entries": { "owner_reference": "", "date_attribute": "" } }"#,
    )
    .expect("Failed to write config");

    env.cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error:"))
        .stdout(predicate::str::contains("No resources found."));
}
