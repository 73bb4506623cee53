use assert_cmd::Command;
use predicates::prelude::*;

fn clerk() -> Command {
    let mut cmd = Command::cargo_bin("clerk").unwrap();
    let lock_dir = std::env::temp_dir().join("clerk-cli-tests");
    std::fs::create_dir_all(&lock_dir).unwrap();
    cmd.env("CLERK_LOCK_DIR", lock_dir)
        .env_remove("CLERK_APP_NAME")
        .env_remove("CLERK_DATETIME_FORMAT")
        .env_remove("CLERK_VERBOSITY");
    cmd
}

#[test]
fn test_version() {
    clerk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clerk").and(predicate::str::contains(env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_list_is_the_default() {
    clerk()
        .assert()
        .success()
        .stdout(predicate::str::contains("Available commands:"))
        .stdout(predicate::str::contains("example:friendly"))
        .stdout(predicate::str::contains("example:report"));
}

#[test]
fn test_friendly_greets() {
    clerk()
        .args(["example:friendly", "Jane", "--age", "18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello World, I am Jane"))
        .stdout(predicate::str::contains("I am 18 years old."));
}

#[test]
fn test_missing_argument_fails() {
    clerk()
        .arg("example:friendly")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("required arguments were not provided"));
}

#[test]
fn test_unknown_command_fails() {
    clerk()
        .arg("example:nope")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command \"example:nope\" is not defined."));
}

#[test]
fn test_quiet_suppresses_output() {
    clerk()
        .args(["example:friendly", "Jane", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_welcome_calls_friendly_once_loudly() {
    clerk()
        .arg("example:welcome")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello World, I am Jane"))
        .stdout(predicate::str::contains("I am John").not());
}

#[test]
fn test_questions_use_defaults_without_interaction() {
    clerk()
        .args(["example:questions", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your name is \"John\""))
        .stdout(predicate::str::contains("You are very young!"));
}

#[test]
fn test_winners_table() {
    clerk()
        .arg("example:winners")
        .assert()
        .success()
        .stdout(predicate::str::contains("| Place | Name         | Score |"))
        .stdout(predicate::str::contains("Candidate-20"));
}

#[test]
fn test_report_month() {
    clerk()
        .args(["example:report", "--for-month", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report from 2024-02-01 to 2024-02-29"));
}

#[test]
fn test_report_rejects_reversed_range() {
    clerk()
        .args(["example:report", "-d", "2024-05-02", "-t", "2024-05-01"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("To date should be greater than from date."));
}

#[test]
fn test_money_come_without_delay() {
    clerk()
        .args(["example:money:come", "--delay", "0"])
        .assert()
        .success();
}
