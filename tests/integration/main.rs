//! Integration tests for cpg-reducer
//!
//! These tests run the built binary against DOT files on disk.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const USAGE: &str = "usage: cpg-reducer -n function|compartment -f d3-arc input-dot-file";

const CPG: &str = r#"digraph cpg {
    node [file=""];
    A [label="\"main\"", file="\"a.c\":1"];
    B [label="\"helper\"", file="\"a.c\":1"];
    C [label="\"exec\"", file="\"b.c\":1"];
    D [label="\"orphan\""];
    A -> B;
    B -> C [value=2];
}
"#;

fn reducer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cpg-reducer"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute cpg-reducer")
}

fn write_input(dir: &TempDir, source: &str) -> String {
    let path = dir.path().join("input.dot");
    std::fs::write(&path, source).unwrap();
    path_arg(&path)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn documents(output: &Output) -> Vec<serde_json::Value> {
    serde_json::Deserializer::from_slice(&output.stdout)
        .into_iter::<serde_json::Value>()
        .collect::<Result<Vec<_>, _>>()
        .expect("stdout is a stream of JSON documents")
}

fn assert_usage_error(output: &Output) {
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains(USAGE));
}

#[test]
fn test_function_granularity() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    let output = reducer(&["-n", "function", "-f", "d3-arc", &input]);

    assert!(output.status.success());
    let docs = documents(&output);
    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0],
        serde_json::json!({
            "nodes": [
                {"id": "helper", "group": "a.c"},
                {"id": "exec", "group": "b.c"},
                {"id": "orphan", "group": "NONE"},
            ],
            "links": [
                {"source": "helper", "target": "exec", "value": "2"},
            ],
        })
    );
}

#[test]
fn test_compartment_granularity() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    let output = reducer(&["-n", "compartment", "-f", "d3-arc", &input]);

    assert!(output.status.success());
    let docs = documents(&output);
    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0],
        serde_json::json!({
            "nodes": [
                {"id": "a.c\":", "group": "a.c"},
                {"id": "b.c\":", "group": "b.c"},
            ],
            "links": [
                {"source": "a.c\":", "target": "b.c\":", "value": "2"},
            ],
        })
    );
}

#[test]
fn test_defaults_to_compartments() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    let explicit = reducer(&["-n", "compartment", "-f", "d3-arc", &input]);
    let implicit = reducer(&[input.as_str()]);

    assert!(implicit.status.success());
    assert_eq!(implicit.stdout, explicit.stdout);
}

#[test]
fn test_one_document_per_graph() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &format!("{CPG}{CPG}"));

    let output = reducer(&["-n", "function", "-f", "d3-arc", &input]);

    assert!(output.status.success());
    let docs = documents(&output);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0], docs[1]);
}

#[test]
fn test_invalid_granularity_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    assert_usage_error(&reducer(&["-n", "module", "-f", "d3-arc", &input]));
}

#[test]
fn test_invalid_format_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    assert_usage_error(&reducer(&["-n", "function", "-f", "svg", &input]));
    assert_usage_error(&reducer(&["-n", "function", &input, "-f"]));
}

#[test]
fn test_missing_input_is_usage_error() {
    assert_usage_error(&reducer(&["-n", "function", "-f", "d3-arc"]));
}

#[test]
fn test_extra_input_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CPG);

    assert_usage_error(&reducer(&[input.as_str(), input.as_str()]));
}

#[test]
fn test_help_exits_successfully() {
    let output = reducer(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cpg-reducer"));
    assert!(stdout.contains("Reduce a code property graph"));
}

#[test]
fn test_unreadable_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = path_arg(&dir.path().join("missing.dot"));

    let output = reducer(&[missing.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read graph file"));
}

#[test]
fn test_malformed_graph_fails_after_earlier_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &format!("{CPG}digraph {{ A -> }}"));

    let output = reducer(&["-n", "function", &input]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(documents_before_error(&output), 1);
}

/// Number of complete JSON documents at the start of stdout.
fn documents_before_error(output: &Output) -> usize {
    serde_json::Deserializer::from_slice(&output.stdout)
        .into_iter::<serde_json::Value>()
        .take_while(Result::is_ok)
        .count()
}

#[test]
fn test_missing_file_attribute_aborts() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "digraph { A -> B }");

    let output = reducer(&["-n", "function", &input]);

    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
