use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get path to fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Binary with HOME pointed away from any real user config
fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!();
    cmd.env("HOME", fixture_path(""));
    cmd
}

#[test]
fn test_cli_help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rainbow bracket matching"));
}

#[test]
fn test_cli_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rainbow-brackets"));
}

#[test]
fn test_fixture_files_exist() {
    assert!(fixture_path("balanced.rs").exists());
    assert!(fixture_path("broken.rs").exists());
    assert!(fixture_path("square.lisp").exists());
}

#[test]
fn test_check_balanced_file() {
    cmd()
        .arg("check")
        .arg(fixture_path("balanced.rs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (7 pairs, max depth 3)"));
}

#[test]
fn test_check_reports_problems_with_line_and_column() {
    cmd()
        .arg("check")
        .arg(fixture_path("broken.rs"))
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "broken.rs:2:18: mismatched closing bracket ')'",
        ))
        .stdout(predicate::str::contains(
            "broken.rs:1:11: unclosed opening bracket '{'",
        ))
        .stdout(predicate::str::contains(
            "broken.rs:3:1: mismatched closing bracket '}'",
        ));
}

#[test]
fn test_check_lisp_ignores_comment() {
    cmd()
        .arg("check")
        .arg(fixture_path("square.lisp"))
        .assert()
        .success();
}

#[test]
fn test_nonexistent_file() {
    cmd()
        .args(["check", "nonexistent.rs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_tree_from_stdin() {
    cmd()
        .arg("tree")
        .write_stdin("(a[b]) {}")
        .assert()
        .success()
        .stdout("() 0..6\n  [] 2..5\n{} 7..9\n");
}

#[test]
fn test_check_rust_char_literals() {
    cmd()
        .args(["--syntax", "rust", "check"])
        .write_stdin("fn f() { let c = '('; let s = \"(\"; }")
        .assert()
        .success()
        .stdout("<stdin>: ok (2 pairs, max depth 1)\n");
}

#[test]
fn test_tree_keeps_pair_around_char_literal() {
    cmd()
        .args(["--syntax", "rust", "tree"])
        .write_stdin("fn f() { let c = '('; }")
        .assert()
        .success()
        .stdout("() 4..6\n{} 7..23\n");
}

#[test]
fn test_paint_annotate() {
    cmd()
        .args(["paint", "--annotate"])
        .write_stdin("(a[b])]")
        .assert()
        .success()
        .stdout("(a[b])]\n0 1 10!\n");
}

#[test]
fn test_paint_colors_with_ansi_escapes() {
    cmd()
        .arg("paint")
        .env_remove("NO_COLOR")
        .write_stdin("(a)")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}["))
        .stdout(predicate::str::contains("a"));
}

#[test]
fn test_paint_json_report() {
    cmd()
        .args(["paint", "--json", "--syntax", "rust"])
        .write_stdin("(a[b])")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"full\""))
        .stdout(predicate::str::contains("\"syntax\": \"rust\""))
        .stdout(predicate::str::contains("\"max_depth\": 2"));
}

#[test]
fn test_paint_window_at() {
    cmd()
        .args(["paint", "--json", "--window-at", "3"])
        .write_stdin("(a[b])")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"window\""));
}

#[test]
fn test_unknown_syntax_fails() {
    cmd()
        .args(["tree", "--syntax", "cobol"])
        .write_stdin("()")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown syntax: cobol"));
}

#[test]
fn test_select_enclosing_pair() {
    cmd()
        .args(["select", "--cursor", "4"])
        .write_stdin("(a [b] c)")
        .assert()
        .success()
        .stdout("3..6\n");
}

#[test]
fn test_select_with_target() {
    cmd()
        .args(["select", "--cursor", "4", "--target", "("])
        .write_stdin("(a [b] c)")
        .assert()
        .success()
        .stdout("0..9\n");
}

#[test]
fn test_select_prefix_target_in_lisp() {
    cmd()
        .args(["select", "--cursor", "50", "--target", "defun"])
        .arg(fixture_path("square.lisp"))
        .assert()
        .success()
        .stdout("0..57\n");
}

#[test]
fn test_remove_pair() {
    cmd()
        .args(["remove", "--cursor", "3"])
        .write_stdin("(a(b)c)")
        .assert()
        .success()
        .stdout("(abc)");
}

#[test]
fn test_remove_json_selects_content() {
    cmd()
        .args(["remove", "--cursor", "3", "--select-content", "--json"])
        .write_stdin("(a(b)c)")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"(abc)\""))
        .stdout(predicate::str::contains("\"selections\""));
}

#[test]
fn test_retype_multiple_cursors() {
    cmd()
        .args(["retype", "--cursor", "1", "--cursor", "5", "--to", "["])
        .write_stdin("(a) (b)")
        .assert()
        .success()
        .stdout("[a] [b]");
}

#[test]
fn test_retype_to_unknown_bracket() {
    cmd()
        .args(["retype", "--cursor", "1", "--to", "x"])
        .write_stdin("(a)")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a configured opening bracket"));
}

#[test]
fn test_invalid_cursor_range() {
    cmd()
        .args(["select", "--cursor", "5..2"])
        .write_stdin("(a)")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ends before it starts"));
}

#[test]
fn test_custom_config_pairs() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[default]\nbracket_pairs = { \"<\" = \">\" }\n").unwrap();

    cmd()
        .arg("tree")
        .arg("--config")
        .arg(&config)
        .write_stdin("<a>(b)")
        .assert()
        .success()
        .stdout("<> 0..3\n");
}

#[test]
fn test_invalid_config_warns_and_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[default\n").unwrap();

    cmd()
        .arg("tree")
        .arg("--config")
        .arg(&config)
        .write_stdin("()")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: Invalid config"))
        .stdout("() 0..2\n");
}
