use crate::common::TestFleet;
use predicates::prelude::*;

#[test]
fn zero_tenants_is_rejected_before_acting() {
    let fleet = TestFleet::new(0);
    fleet
        .cmd()
        .arg("start")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration errors"));
    assert!(fleet.created_entries().is_empty());
}

#[test]
fn port_range_overflow_is_rejected() {
    let fleet = TestFleet::with_extra(10, "");
    let path = &fleet.config_path;
    let content = std::fs::read_to_string(path)
        .unwrap()
        .replace("base_port = 18080", "base_port = 65530");
    std::fs::write(path, content).unwrap();

    fleet
        .cmd()
        .arg("hosts")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("65539"));
}

#[test]
fn missing_config_file_is_reported() {
    let fleet = TestFleet::new(1);
    assert_cmd::Command::cargo_bin("tenantctl")
        .unwrap()
        .env_remove("TENANTCTL_CONFIG")
        .args(["-f"])
        .arg(fleet.root().join("nope.toml"))
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn config_path_can_come_from_environment() {
    let fleet = TestFleet::new(2);
    assert_cmd::Command::cargo_bin("tenantctl")
        .unwrap()
        .env("TENANTCTL_CONFIG", &fleet.config_path)
        .arg("hosts")
        .assert()
        .success()
        .stdout("user-001.gw.example.com\nuser-002.gw.example.com\n");
}

#[test]
fn validate_accepts_a_good_config() {
    let fleet = TestFleet::new(3);
    fleet
        .cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleet.toml is valid (3 tenants, ports 18080-18082)"));
}

#[test]
fn validate_renders_diagnostics_with_help() {
    let fleet = TestFleet::new(10);
    let path = &fleet.config_path;
    let content = std::fs::read_to_string(path)
        .unwrap()
        .replace("base_port = 18080", "base_port = 65530");
    std::fs::write(path, content).unwrap();

    fleet
        .cmd()
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tenantctl::port_range_overflow"))
        .stderr(predicate::str::contains("lower base_port"))
        .stderr(predicate::str::contains("1 configuration error(s)"));
}
