use crate::common::TestFleet;
use predicates::prelude::*;

#[test]
fn hosts_lists_every_tenant() {
    let fleet = TestFleet::new(3);
    fleet.cmd().arg("hosts").assert().success().stdout(
        "user-001.gw.example.com\nuser-002.gw.example.com\nuser-003.gw.example.com\n",
    );
    assert!(fleet.created_entries().is_empty(), "hosts must not write anything");
}

#[test]
fn hosts_certbot_includes_issuer_email() {
    let fleet = TestFleet::new(2);
    fleet
        .cmd()
        .args(["hosts", "--certbot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-m ops@example.com"))
        .stdout(predicate::str::contains("-d user-002.gw.example.com"));
}

#[test]
fn custom_prefix_changes_hostnames() {
    let fleet = TestFleet::with_extra(2, "id_prefix = \"team\"\nid_width = 2");
    fleet
        .cmd()
        .arg("hosts")
        .assert()
        .success()
        .stdout("team-01.gw.example.com\nteam-02.gw.example.com\n");
}
