use assert_cmd::Command;
use predicates::prelude::*;

fn barre() -> Command {
    Command::cargo_bin("barre").unwrap()
}

#[test]
fn help_lists_subcommands() {
    barre()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("balances"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn no_subcommand_shows_usage() {
    barre()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn balances_rejects_unparseable_cutoff() {
    // Cutoff validation happens before any database access.
    barre()
        .args(["balances", "--as-of", "half past never"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn balances_rejects_unknown_mode() {
    barre()
        .args(["balances", "--as-of", "2024-09-30", "--mode", "weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn import_rejects_unknown_table() {
    barre()
        .args(["import", "whatever.csv", "--table", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown table: bogus"));
}
