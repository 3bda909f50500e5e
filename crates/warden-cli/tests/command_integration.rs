//! Integration tests for CLI commands.
//!
//! Each test writes a state snapshot into a temporary project directory and
//! runs the binary against it.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const STATE: &str = r#"{
    "users": [
        {"id": "alice", "org_id": "acme", "status": "active", "role_ids": ["operator"]},
        {"id": "bob", "org_id": "acme", "status": "active", "permissions": ["tool:view"]},
        {"id": "carol", "org_id": "acme", "status": "suspended", "permissions": ["tool:*"]}
    ],
    "roles": [
        {"id": "operator", "org_id": "acme", "name": "Operator",
         "permissions": ["tool:execute"], "parent_id": "viewer"},
        {"id": "viewer", "org_id": "acme", "name": "Viewer", "permissions": ["tool:view"]}
    ],
    "policies": [
        {
            "id": "p-ip",
            "org_id": "acme",
            "name": "deny-blocked-ips",
            "resource_category": "tool",
            "effect": "deny",
            "priority": 1,
            "rules": [{"logic": "AND", "conditions": [
                {"attribute": "context.ip_address", "operator": "in", "value": ["203.0.113.7"]}
            ]}]
        }
    ],
    "overlays": [
        {
            "category": "tool",
            "org_id": "acme",
            "resource_id": "tool-1",
            "scope": {"role_ids": ["operator"]},
            "can_execute": true,
            "allowed_hours_start": 9,
            "allowed_hours_end": 17
        }
    ]
}"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("state.json"), STATE).unwrap();
        Self { dir }
    }

    fn warden(&self) -> Command {
        let mut cmd = Command::cargo_bin("warden").unwrap();
        cmd.arg("--project").arg(self.dir.path());
        cmd
    }

    fn state(&self) -> String {
        self.dir.path().join("state.json").display().to_string()
    }
}

// ============================================================================
// check
// ============================================================================

#[test]
fn check_allows_inherited_permission() {
    let project = Project::new();
    project
        .warden()
        .args(["check", "-s", &project.state(), "-u", "alice", "-a", "view", "-c", "tool"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ALLOW"));
}

#[test]
fn check_denies_missing_permission_with_exit_code_two() {
    let project = Project::new();
    project
        .warden()
        .args(["check", "-s", &project.state(), "-u", "bob", "-a", "execute", "-c", "tool"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Missing permission: tool:execute"));
}

#[test]
fn check_reports_suspended_accounts() {
    let project = Project::new();
    project
        .warden()
        .args(["check", "-s", &project.state(), "-u", "carol"])
        .args(["-a", "view", "-c", "tool", "--json"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"allowed\": false"))
        .stdout(predicate::str::contains("User account is suspended"));
}

#[test]
fn check_applies_ip_policy_from_context() {
    let project = Project::new();
    project
        .warden()
        .args([
            "check",
            "-s",
            &project.state(),
            "-u",
            "alice",
            "-a",
            "view",
            "-c",
            "tool",
            "--context",
            r#"{"ip_address": "203.0.113.7"}"#,
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Access denied by policy: deny-blocked-ips"));
}

#[test]
fn check_applies_overlay_hours_at_given_instant() {
    let project = Project::new();
    let state = project.state();
    let base = [
        "check", "-s", &state, "-u", "alice", "-a", "execute", "-c", "tool", "-r", "tool-1",
    ];

    project
        .warden()
        .args(base)
        .args(["--at", "2025-01-08T10:00:00Z"])
        .assert()
        .success();

    project
        .warden()
        .args(base)
        .args(["--at", "2025-01-08T20:00:00Z"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("hour 20"));
}

#[test]
fn check_unknown_user_fails() {
    let project = Project::new();
    project
        .warden()
        .args(["check", "-s", &project.state(), "-u", "mallory", "-a", "view", "-c", "tool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mallory"));
}

#[test]
fn check_uses_snapshot_from_config() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("warden.toml"),
        "[state]\nsnapshot = \"state.json\"\n",
    )
    .unwrap();

    project
        .warden()
        .args(["check", "-u", "alice", "-a", "view", "-c", "tool"])
        .assert()
        .success();
}

// ============================================================================
// permissions
// ============================================================================

#[test]
fn permissions_lists_inherited_grants() {
    let project = Project::new();
    project
        .warden()
        .args(["permissions", "-s", &project.state(), "-u", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tool:execute"))
        .stdout(predicate::str::contains("tool:view"));
}

#[test]
fn permissions_json_is_an_array() {
    let project = Project::new();
    let output = project
        .warden()
        .args(["permissions", "-s", &project.state(), "-u", "bob", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, vec!["tool:view".to_string()]);
}

// ============================================================================
// lint
// ============================================================================

#[test]
fn lint_clean_state_succeeds() {
    let project = Project::new();
    project
        .warden()
        .args(["lint", "-s", &project.state()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no findings"));
}

#[test]
fn lint_flags_bad_regex_with_failure() {
    let project = Project::new();
    let state = r#"{"policies": [{
        "id": "p-bad",
        "org_id": "acme",
        "name": "bad",
        "resource_category": "tool",
        "rules": [{"conditions": [
            {"attribute": "user.email", "operator": "matches", "value": "(["}
        ]}]
    }]}"#;
    let path = project.dir.path().join("bad.json");
    fs::write(&path, state).unwrap();

    project
        .warden()
        .args(["lint", "-s", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid regex"));
}
