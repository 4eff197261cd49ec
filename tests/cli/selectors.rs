use crate::common::TestFleet;
use predicates::prelude::*;

#[test]
fn out_of_range_selectors_fail_without_side_effects() {
    let fleet = TestFleet::new(3);
    for cmd in ["start", "stop", "restart", "enable", "disable", "status", "pairing", "provision"] {
        for selector in ["0", "4"] {
            fleet
                .cmd()
                .args([cmd, selector])
                .assert()
                .code(1)
                .stderr(predicate::str::contains("out of range"));
        }
    }
    for cmd in ["logs", "password"] {
        fleet
            .cmd()
            .args([cmd, "4"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("tenant 4 is out of range"));
    }
    assert!(fleet.created_entries().is_empty());
}

#[test]
fn malformed_invocations_are_usage_errors() {
    let fleet = TestFleet::new(3);
    fleet.cmd().args(["start", "two"]).assert().code(2);
    fleet.cmd().arg("reboot").assert().code(2);
    fleet.cmd().arg("logs").assert().code(2);
    assert!(fleet.created_entries().is_empty());
}

#[test]
fn missing_host_tool_is_reported_before_any_tenant() {
    let fleet = TestFleet::new(3);
    let empty_path = fleet.root().join("empty-bin");
    std::fs::create_dir(&empty_path).unwrap();

    fleet
        .cmd()
        .env("PATH", &empty_path)
        .arg("start")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`systemctl` not found"));

    fleet
        .cmd()
        .env("PATH", &empty_path)
        .args(["password", "2", "--stdin"])
        .write_stdin("correct-horse-battery\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`htpasswd` not found"));

    let entries: Vec<String> = fleet
        .created_entries()
        .into_iter()
        .filter(|name| name != "empty-bin")
        .collect();
    assert!(entries.is_empty());
}
