//! CLI tests - run the built `astgen` binary against temporary inputs.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// A command isolated from any global config on the host.
fn astgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("astgen").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.output().expect("failed to execute astgen");
    assert!(
        output.status.success(),
        "astgen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

const LOOPS: &str = r#"
interface Node { loc: SourceLocation | null }
interface WhileStatement <: Node { type: "WhileStatement"; test: Expression; body: Statement }
interface ForStatement <: Node { type: "ForStatement"; init: Expression | null; body: Statement }
"#;

#[test]
fn test_generate_typescript_with_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("loops.ts"), LOOPS).unwrap();
    std::fs::write(
        dir.path().join("astgen.toml"),
        "namespace = \"ESTree\"\n\n[[family]]\nname = \"Statement\"\nbase = \"LoopBase\"\n",
    )
    .unwrap();

    let out = stdout(astgen(dir.path()).args(["generate", "loops.ts"]));
    assert!(out.starts_with("export namespace ESTree {"));
    assert!(out.contains("export interface LoopBase extends Node {"));
    assert!(out.contains("export function isStatement(n: Node): n is LoopBase {"));
    assert!(out.contains("return n.type === \"WhileStatement\" || n.type === \"ForStatement\";"));
    assert!(out.contains("WhileStatement: [\"loc\", \"body\", \"test\"],"));
}

#[test]
fn test_generate_json_from_stdin() {
    let dir = TempDir::new().unwrap();
    let out = stdout(
        astgen(dir.path())
            .args(["generate", "-p", "json", "-"])
            .write_stdin("enum UnaryOperator { \"-\" | \"!\" }"),
    );
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["entities"][0]["entity"], "type_alias");
    assert_eq!(value["entities"][0]["name"], "UnaryOperator");
}

#[test]
fn test_generate_writes_output_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("loops.ts"), LOOPS).unwrap();
    astgen(dir.path())
        .args(["generate", "loops.ts", "-o", "ast.ts", "--namespace", ""])
        .assert()
        .success();
    let written = std::fs::read_to_string(dir.path().join("ast.ts")).unwrap();
    assert!(written.starts_with("export interface Node {"));
}

#[test]
fn test_inspect_dumps_table() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("loops.ts"), LOOPS).unwrap();
    let out = stdout(astgen(dir.path()).args(["inspect", "loops.ts"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["phase"], "flattened");
    assert_eq!(value["decls"]["ForStatement"]["discriminant"], "ForStatement");
}

#[test]
fn test_printers_lists_builtins() {
    let dir = TempDir::new().unwrap();
    let out = stdout(astgen(dir.path()).arg("printers"));
    assert!(out.contains("typescript\t.ts"));
    assert!(out.contains("json\t.json"));
}

#[test]
fn test_verbose_logs_command_decisions() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("loops.ts"), LOOPS).unwrap();
    let output = astgen(dir.path())
        .args(["-v", "generate", "-p", "json", "loops.ts"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using printer"));
    assert!(stderr.contains("discovering config"));
    assert!(stderr.contains("reading input"));
}

#[test]
fn test_errors_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.ts"), "interface A <: Missing {}").unwrap();

    let output = astgen(dir.path())
        .args(["generate", "bad.ts"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown declaration `Missing`"));

    let output = astgen(dir.path())
        .args(["generate", "-p", "cobol", "bad.ts"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown printer: cobol"));
}
