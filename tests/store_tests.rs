mod common;

use anyhow::Result;
use auditrack::model::{FunctionStatus, FunctionTag, STATE_VERSION};
use auditrack::store::StateStore;
use common::TestWorkspace;
use std::fs;

#[test]
fn test_missing_state_starts_fresh() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let state = StateStore::load(&ws.state_path(), ws.path());

    assert_eq!(state.version, STATE_VERSION);
    assert!(state.files.is_empty());
    assert!(state.function_filters.is_default());
    Ok(())
}

#[test]
fn test_corrupt_state_starts_fresh() -> Result<()> {
    let ws = TestWorkspace::new()?;
    fs::create_dir_all(ws.state_path().parent().unwrap())?;
    fs::write(ws.state_path(), b"{ \"scopePaths\": [")?;

    let state = StateStore::load(&ws.state_path(), ws.path());

    assert!(state.scope.scope_paths.is_empty());
    Ok(())
}

#[test]
fn test_partial_state_is_coerced() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let key = ws.key("src/Vault.sol");
    let document = serde_json::json!({
        "scopePaths": [ws.key("src"), 42, ws.key("src")],
        "functionFilters": { "statuses": [], "tags": ["admin", "bogus"] },
        "files": {
            key.clone(): {
                "functions": [
                    { "name": "deposit", "startLine": 4, "endLine": 2, "readCount": 3, "isReviewed": true },
                    { "startLine": 9 },
                    "not a function"
                ]
            },
            "": { "functions": [] }
        },
        "progressHistory": [
            { "date": "2026-03-01", "functionsRead": 1, "linesRead": 10, "actions": [] },
            { "date": "2026-03-01", "functionsRead": 2, "linesRead": 5, "actions": [] },
            { "date": "yesterday", "functionsRead": 9 }
        ],
        "lastModified": "soon"
    });
    fs::create_dir_all(ws.state_path().parent().unwrap())?;
    fs::write(ws.state_path(), serde_json::to_vec(&document)?)?;

    let state = StateStore::load(&ws.state_path(), ws.path());

    assert_eq!(state.scope.scope_paths, vec![ws.key("src")]);
    assert_eq!(state.function_filters.statuses.len(), FunctionStatus::ALL.len());
    assert!(state.function_filters.tags.contains(&FunctionTag::Admin));
    assert_eq!(state.files.len(), 1);

    let file = &state.files[&key];
    assert_eq!(file.relative_path, "src/Vault.sol");
    assert_eq!(file.functions.len(), 1);
    let deposit = &file.functions[0];
    assert_eq!(deposit.read_count, 1);
    assert_eq!(deposit.end_line, 4);
    assert_eq!(deposit.status(), FunctionStatus::Reviewed);

    assert_eq!(state.progress_history.len(), 1);
    assert_eq!(state.progress_history[0].functions_read, 3);
    assert_eq!(state.progress_history[0].lines_read, 15);
    assert_eq!(state.last_modified, 0);
    Ok(())
}

#[test]
fn test_saved_state_round_trips() -> Result<()> {
    let mut ws = TestWorkspace::new()?;
    let path = ws.add_source("src/Vault.sol", &[("deposit", 0, 4)])?;
    let key = ws.key("src/Vault.sol");

    let mut session = ws.session()?;
    session.add_to_scope(&path)?;
    session.mark_read(&key, "deposit")?;
    session.save_and_wait()?;

    let reloaded = StateStore::load(&ws.state_path(), ws.path());
    assert_eq!(&reloaded, session.store().state());
    assert!(reloaded.last_modified > 0);
    Ok(())
}

#[test]
fn test_saves_are_applied_in_order() -> Result<()> {
    let mut ws = TestWorkspace::new()?;
    let path = ws.add_source("src/Vault.sol", &[("deposit", 0, 4)])?;
    let key = ws.key("src/Vault.sol");

    let mut session = ws.session()?;
    session.add_to_scope(&path)?;
    let first = session.save()?;
    session.mark_read(&key, "deposit")?;
    let second = session.save()?;

    assert!(first.seq() < second.seq());
    second.wait()?;
    first.wait()?;

    let reloaded = StateStore::load(&ws.state_path(), ws.path());
    assert!(reloaded.files[&key].functions[0].is_read());
    Ok(())
}
