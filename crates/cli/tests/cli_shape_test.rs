use std::io::Write as _;
use std::process::{Command, Stdio};

fn declsql() -> Command {
    Command::new(env!("CARGO_BIN_EXE_declsql"))
}

#[test]
fn help_lists_the_full_flag_surface() {
    let output = declsql()
        .arg("--help")
        .output()
        .expect("binary should run");
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--user",
        "--password",
        "--host",
        "--port",
        "--socket",
        "--ssl-mode",
        "--file",
        "--dry-run",
        "--export",
        "--enable-drop-table",
        "--skip-view",
        "--skip-extension",
        "--target-schema",
        "--dump-concurrency",
        "--managed-role",
    ] {
        assert!(help.contains(flag), "help should mention {flag}");
    }
}

#[test]
fn missing_database_argument_is_a_usage_error() {
    let output = declsql().output().expect("binary should run");
    assert!(!output.status.success());
}

#[test]
fn unreadable_desired_file_exits_with_parse_code() {
    let output = declsql()
        .args(["mydb", "--dry-run", "--file", "/nonexistent/declsql-desired.sql"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[io]"));
}

#[test]
fn unreachable_server_exits_with_connection_code() {
    let schema = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(schema.as_file(), "CREATE TABLE t (id integer);").expect("write");

    let output = declsql()
        .args([
            "mydb",
            "--dry-run",
            "--socket",
            "/nonexistent/declsql-sockets",
            "--file",
        ])
        .arg(schema.path())
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[catalog]"));
}

#[test]
fn stdin_is_accepted_when_not_a_terminal() {
    let mut child = declsql()
        .args(["mydb", "--dry-run", "--socket", "/nonexistent/declsql-sockets"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("binary should spawn");

    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(b"CREATE TABLE t (id integer);")
        .expect("write to stdin");

    let status = child.wait().expect("binary should exit");
    // The schema is read fine; failure comes from the unreachable server.
    assert_eq!(status.code(), Some(2));
}
