use std::fs;

use rwgt_exec::Workspace;
use tempfile::tempdir;

#[test]
fn created_root_is_removed_once_empty() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("work");
    let workspace = Workspace::create(&root).unwrap();
    for row in 0..3 {
        let pass = workspace.prepare_pass(row).unwrap();
        fs::write(pass.join("weights.csv"), "event_id,weight\n").unwrap();
    }
    workspace.remove(3).unwrap();
    assert!(!root.exists());
}

#[test]
fn created_root_with_foreign_files_is_kept() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("work");
    let workspace = Workspace::create(&root).unwrap();
    workspace.prepare_pass(0).unwrap();
    fs::write(root.join("evaluator.log"), "written by the evaluator").unwrap();
    workspace.remove(1).unwrap();
    assert!(root.join("evaluator.log").exists());
    assert!(!root.join("pass_001").exists());
}

#[test]
fn existing_root_is_never_removed() {
    let dir = tempdir().unwrap();
    let workspace = Workspace::create(dir.path()).unwrap();
    workspace.prepare_pass(0).unwrap();
    workspace.prepare_pass(1).unwrap();
    workspace.remove(2).unwrap();
    assert!(dir.path().is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
