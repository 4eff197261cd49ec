use clap::CommandFactory;
use clap_complete::aot::{generate, Shell};
use std::io::BufWriter;

fn completions_for(shell: Shell) -> String {
    let mut buf = BufWriter::new(Vec::new());
    generate(shell, &mut tenantctl::cli::Cli::command(), "tenantctl", &mut buf);
    String::from_utf8(buf.into_inner().unwrap()).unwrap()
}

#[test]
fn completions_bash_lists_commands() {
    let output = completions_for(Shell::Bash);
    assert!(output.contains("tenantctl"));
    for sub in ["start", "status", "logs", "password", "pairing", "provision"] {
        assert!(output.contains(sub), "bash completions should mention {sub}");
    }
}

#[test]
fn completions_zsh_and_fish_generate_output() {
    for shell in [Shell::Zsh, Shell::Fish] {
        let output = completions_for(shell);
        assert!(
            output.contains("tenantctl"),
            "{shell:?} completions should reference 'tenantctl'"
        );
    }
}

#[test]
fn completions_subcommand_writes_to_stdout() {
    assert_cmd::Command::cargo_bin("tenantctl")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicates::str::contains("tenantctl"));
}
