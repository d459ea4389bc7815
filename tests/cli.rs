use assert_cmd::Command;
use predicates::prelude::*;

fn scribe() -> Command {
    let mut cmd = Command::cargo_bin("yt-scribe").unwrap();
    // Keep config reads/writes inside the test sandbox
    let home = tempfile::tempdir().unwrap().into_path();
    cmd.env("HOME", &home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    scribe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("channel"))
        .stdout(predicate::str::contains("video"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn platforms_lists_supported_inputs() {
    scribe()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("YouTube"))
        .stdout(predicate::str::contains("Instagram"));
}

#[test]
fn channel_without_url_exits_with_error() {
    scribe()
        .arg("channel")
        .write_stdin("\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No channel URL provided"));
}

#[test]
fn export_combines_transcripts() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = dir.path().join("transcripts");
    std::fs::create_dir_all(&transcripts).unwrap();
    std::fs::write(transcripts.join("20240101_First_a.txt"), "one").unwrap();
    std::fs::write(transcripts.join("20240202_Second_b.txt"), "two").unwrap();

    let output = dir.path().join("combined.txt");

    scribe()
        .arg("export")
        .arg("--channel-dir")
        .arg(&transcripts)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Combined 2 transcripts"));

    let combined = std::fs::read_to_string(&output).unwrap();
    assert!(combined.starts_with("Title: 20240101_First_a\none"));
}

#[test]
fn unknown_subcommand_fails() {
    scribe().arg("frobnicate").assert().failure();
}
