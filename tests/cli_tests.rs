use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace plus a config that points ctags at a program that does not exist
struct CliWorkspace {
    temp_dir: TempDir,
    root: PathBuf,
    config_path: PathBuf,
}

impl CliWorkspace {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("project");
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/Vault.sol"), "contract Vault {}\n")?;
        fs::write(root.join("src/Token.sol"), "contract Token {}\n")?;

        let config_path = temp_dir.path().join("config");
        fs::write(
            &config_path,
            "[extraction]\nctags_command = \"atr-test-missing-ctags\"\n\n[output]\ncolor = false\n",
        )?;

        Ok(Self {
            temp_dir,
            root,
            config_path,
        })
    }

    fn atr(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("atr")?;
        cmd.env("AUDITRACK_CONFIG_PATH", &self.config_path)
            .env("AUDITRACK_ROOT", &self.root)
            .env("AUDITRACK_LOG", "off")
            .env("HOME", self.temp_dir.path())
            .current_dir(&self.root);
        Ok(cmd)
    }

    fn state_path(&self) -> PathBuf {
        self.root.join(".auditrack/state.json")
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&fs::read(self.state_path())?)?)
    }
}

fn scope_paths(state: &serde_json::Value) -> Vec<String> {
    state["scopePaths"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn ends_with(paths: &[String], suffix: &str) -> bool {
    paths.iter().any(|p| Path::new(p).ends_with(suffix))
}

#[test]
fn test_add_file_without_ctags() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["add", "src/Vault.sol"])
        .assert()
        .success()
        .stderr(predicate::str::contains("added"))
        .stderr(predicate::str::contains("Could not extract functions"));

    let state = ws.state()?;
    assert!(ends_with(&scope_paths(&state), "src/Vault.sol"));
    assert_eq!(state["files"].as_object().map(serde_json::Map::len), Some(1));
    Ok(())
}

#[test]
fn test_add_missing_path_fails() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["add", "src/Missing.sol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path does not exist"));
    Ok(())
}

#[test]
fn test_add_path_outside_workspace_fails() -> Result<()> {
    let ws = CliWorkspace::new()?;
    let outside = ws.temp_dir.path().join("config");

    ws.atr()?
        .arg("add")
        .arg(&outside)
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the workspace"));
    Ok(())
}

#[test]
fn test_remove_scope_entry() -> Result<()> {
    let ws = CliWorkspace::new()?;
    ws.atr()?.args(["add", "src"]).assert().success();

    ws.atr()?
        .args(["remove", "src/Vault.sol"])
        .assert()
        .success()
        .stderr(predicate::str::contains("excluded"));

    ws.atr()?
        .args(["remove", "src"])
        .assert()
        .success()
        .stderr(predicate::str::contains("removed"));

    let state = ws.state()?;
    assert!(scope_paths(&state).is_empty());
    Ok(())
}

#[test]
fn test_status_reports_scope() -> Result<()> {
    let ws = CliWorkspace::new()?;
    ws.atr()?.args(["add", "src"]).assert().success();

    ws.atr()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scope"))
        .stdout(predicate::str::contains("src"))
        .stdout(predicate::str::contains("0/0"));
    Ok(())
}

#[test]
fn test_status_on_empty_workspace() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing in scope"));
    assert!(!ws.state_path().exists());
    Ok(())
}

#[test]
fn test_filter_set_and_reset() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["filter", "--status", "unread", "--tag", "admin"])
        .assert()
        .success();
    ws.atr()?
        .arg("filter")
        .assert()
        .success()
        .stdout(predicate::str::contains("status: unread; tags: admin"));

    let state = ws.state()?;
    assert_eq!(state["functionFilters"]["statuses"], serde_json::json!(["unread"]));

    ws.atr()?.args(["filter", "--reset"]).assert().success();
    ws.atr()?
        .arg("filter")
        .assert()
        .success()
        .stdout(predicate::str::contains("status: unread, read, reviewed; tags: any"));
    Ok(())
}

#[test]
fn test_mark_untracked_file_fails() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["mark", "read", "src/Vault.sol", "deposit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not tracked"));
    Ok(())
}

#[test]
fn test_progress_json_is_empty_report() -> Result<()> {
    let ws = CliWorkspace::new()?;

    let output = ws.atr()?.args(["progress", "--json"]).output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["days"], serde_json::json!([]));
    assert_eq!(report["totals"]["totalFunctions"], 0);
    Ok(())
}

#[test]
fn test_load_scope_file() -> Result<()> {
    let ws = CliWorkspace::new()?;
    fs::write(
        ws.root.join("scope.txt"),
        "# in scope\nsrc/Vault.sol\nsrc/Token.sol\nsrc/Nope.sol\n",
    )?;

    ws.atr()?
        .args(["load-scope", "scope.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("scope.txt:4"))
        .stderr(predicate::str::contains("Loaded 2 scope entries"));

    let paths = scope_paths(&ws.state()?);
    assert_eq!(paths.len(), 2);
    Ok(())
}

#[test]
fn test_load_scope_without_file_or_config_fails() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .arg("load-scope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("core.scope_file is not set"));
    Ok(())
}

#[test]
fn test_clear_with_yes() -> Result<()> {
    let ws = CliWorkspace::new()?;
    ws.atr()?.args(["add", "src"]).assert().success();

    ws.atr()?
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleared"));

    assert!(scope_paths(&ws.state()?).is_empty());
    Ok(())
}

#[test]
fn test_config_get_and_set() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["config", "extraction.ctags_command"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atr-test-missing-ctags"));

    ws.atr()?
        .args(["config", "extraction.kinds", "function,modifier"])
        .assert()
        .success();
    let written = fs::read_to_string(&ws.config_path)?;
    assert!(written.contains("modifier"));

    ws.atr()?
        .args(["config", "extraction.kinds", "event"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown symbol kind"));

    ws.atr()?
        .args(["config", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[extraction]"))
        .stdout(predicate::str::contains("ignore_patterns"));
    Ok(())
}

#[test]
fn test_unknown_config_option_warns() -> Result<()> {
    let ws = CliWorkspace::new()?;
    fs::write(&ws.config_path, "[core]\nrepo_path = \"x\"\n")?;

    ws.atr()?
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("core.repo_path"));
    Ok(())
}

#[test]
fn test_completion_generation() -> Result<()> {
    let ws = CliWorkspace::new()?;

    ws.atr()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atr"));
    Ok(())
}
