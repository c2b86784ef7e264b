use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct Db {
    _dir: TempDir,
    path: String,
}

impl Db {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir
            .path()
            .join("nested")
            .join("trellis.db")
            .to_string_lossy()
            .into_owned();
        Self { _dir: dir, path }
    }

    fn raw(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_trellis"))
            .arg("--db")
            .arg(&self.path)
            .args(args)
            .env_remove("TRELLIS_DB")
            .env_remove("TRELLIS_LOG")
            .output()
            .expect("run trellis")
    }

    /// Run a command that must succeed and parse its JSON output.
    fn ok(&self, args: &[&str]) -> Value {
        let out = self.raw(args);
        assert!(
            out.status.success(),
            "trellis {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        serde_json::from_slice(&out.stdout).expect("stdout is JSON")
    }

    /// Run a command that must fail and return its JSON error message.
    fn err(&self, args: &[&str]) -> String {
        let out = self.raw(args);
        assert_eq!(out.status.code(), Some(1), "trellis {args:?} should fail");
        let v: Value = serde_json::from_slice(&out.stderr).expect("stderr is JSON");
        v["error"].as_str().expect("error string").to_string()
    }
}

#[test]
fn fresh_database_has_default_workspace() {
    let db = Db::new();
    let v = db.ok(&["workspace", "list"]);
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["name"], "default");
}

#[test]
fn workspace_add_and_duplicate() {
    let db = Db::new();
    let ws = db.ok(&["workspace", "add", "home"]);
    assert_eq!(ws["name"], "home");
    let msg = db.err(&["workspace", "add", "home"]);
    assert_eq!(msg, "workspace 'home' already exists");
}

#[test]
fn task_and_step_lifecycle() {
    let db = Db::new();
    let task = db.ok(&["task", "add", "Ship", "release"]);
    assert_eq!(task["name"], "Ship release");
    assert_eq!(task["status"], "active");
    assert_eq!(task["steps_total"], 0);
    let tid = task["id"].as_i64().unwrap().to_string();

    let step = db.ok(&["step", "add", "write", "changelog", "--task", &tid, "-p", "high"]);
    assert_eq!(step["priority"], "high");
    assert_eq!(step["done"], false);
    let sid = step["id"].as_i64().unwrap().to_string();

    let done = db.ok(&["step", "done", &sid]);
    assert_eq!(done["done"], true);

    let list = db.ok(&["task", "list"]);
    assert_eq!(list[0]["steps_total"], 1);
    assert_eq!(list[0]["steps_done"], 1);

    let started = db.ok(&["task", "start", &tid]);
    assert_eq!(started["status"], "in_progress");

    let dump = db.ok(&["dump"]);
    let step = &dump[0]["tasks"][0]["steps"][0];
    assert_eq!(step["text"], "write changelog");
    assert!(step["completed_at"].is_string());

    let deleted = db.ok(&["task", "rm", &tid]);
    assert_eq!(deleted["deleted"], task["id"]);
    assert!(db.ok(&["step", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn step_edit_and_note() {
    let db = Db::new();
    let task = db.ok(&["task", "add", "t"]);
    let tid = task["id"].as_i64().unwrap().to_string();
    let step = db.ok(&["step", "add", "draft", "--task", &tid, "--note", "first"]);
    let sid = step["id"].as_i64().unwrap().to_string();

    let edited = db.ok(&["step", "edit", &sid, "final", "draft"]);
    assert_eq!(edited["text"], "final draft");
    assert_eq!(edited["note"], "first");

    let noted = db.ok(&["step", "note", &sid]);
    assert_eq!(noted["note"], "");
}

#[test]
fn step_list_filters_and_ranks() {
    let db = Db::new();
    let task = db.ok(&["task", "add", "t"]);
    let tid = task["id"].as_i64().unwrap().to_string();
    db.ok(&["step", "add", "low", "--task", &tid, "-p", "low"]);
    let high = db.ok(&["step", "add", "high", "--task", &tid, "-p", "high"]);
    db.ok(&["step", "done", &high["id"].as_i64().unwrap().to_string()]);

    let all = db.ok(&["step", "list", "--task", &tid]);
    assert_eq!(all[0]["text"], "low");
    assert_eq!(all[1]["text"], "high");

    let pending = db.ok(&["step", "list", "--workspace", "default", "--status", "pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[test]
fn errors_are_json_on_stderr() {
    let db = Db::new();
    assert_eq!(db.err(&["task", "done", "99"]), "task 99 not found");
    assert_eq!(db.err(&["step", "rm", "7"]), "step 7 not found");
    assert_eq!(db.err(&["dump", "--workspace", "nope"]), "workspace 'nope' not found");
    assert!(db
        .err(&["task", "list", "--status", "paused"])
        .contains("invalid status"));
}

#[test]
fn removing_workspace_cascades() {
    let db = Db::new();
    let ws = db.ok(&["workspace", "add", "tmp"]);
    let task = db.ok(&["task", "add", "x", "--workspace", "tmp"]);
    assert_eq!(task["workspace_id"], ws["id"]);
    db.ok(&["workspace", "rm", "tmp"]);
    assert!(db.ok(&["task", "list"]).as_array().unwrap().is_empty());
}
