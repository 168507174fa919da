use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn bin() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("jsdefault").expect("binary")
}

fn schema_dir() -> TempDir {
    let tmp = tempdir().expect("tmpdir");
    write(
        tmp.path(),
        "definitions.json",
        r##"{
            "$schema": "http://json-schema.org/draft-04/schema#",
            "id": "definitions.json",
            "header": {
                "type": "object",
                "properties": {
                    "version": {"type": "integer", "default": 2},
                    "type": {"type": "integer"},
                    "length": {"type": "integer", "default": 8}
                },
                "required": ["version", "type"]
            },
            "text": {"type": "string", "default": ""}
        }"##,
    );
    write(
        tmp.path(),
        "message.yaml",
        "$schema: http://json-schema.org/draft-04/schema#\n\
         id: message.json\n\
         type: object\n\
         required: [header]\n\
         properties:\n  \
           header:\n    \
             allOf:\n      \
               - $ref: definitions.json#/header\n      \
               - type: object\n        \
                 properties:\n          \
                   type: {enum: [0], default: 0}\n",
    );
    write(
        tmp.path(),
        "refs.json",
        r##"{
            "$id": "refs.json",
            "type": "object",
            "required": ["prop"],
            "properties": {
                "prop": {"type": "object", "default": {"$ref": "#/definitions/prop"}}
            },
            "definitions": {
                "prop": {"type": "object", "default": {"inner": "text"}},
                "loop": {
                    "type": "object",
                    "required": ["next"],
                    "properties": {"next": {"$ref": "#/definitions/loop"}}
                }
            }
        }"##,
    );
    tmp
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write fixture");
}

#[test]
fn instantiates_across_documents() {
    let tmp = schema_dir();
    bin()
        .arg("instantiate")
        .arg("message.json")
        .arg("--schemas")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"header":{"version":2,"type":0,"length":8}}"#,
        ));
}

#[test]
fn instantiates_a_pointer_reference() {
    let tmp = schema_dir();
    bin()
        .args(["instantiate", "definitions.json#/header/properties/length", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("8\n"));
}

#[test]
fn default_refs_toggle() {
    let tmp = schema_dir();
    bin()
        .args(["instantiate", "refs.json", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r##"{"prop":{"$ref":"#/definitions/prop"}}"##));

    bin()
        .args(["instantiate", "refs.json", "--resolve-default-refs", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"prop":{"inner":"text"}}"#));
}

#[test]
fn cyclic_reference_fails_with_code() {
    let tmp = schema_dir();
    bin()
        .args(["instantiate", "refs.json#/definitions/loop", "-s"])
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("CYCLIC_REFERENCE"));
}

#[test]
fn unknown_document_prints_empty_object() {
    let tmp = schema_dir();
    bin()
        .args(["instantiate", "nowhere.json", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"));
}

#[test]
fn lists_registered_ids_sorted() {
    let tmp = schema_dir();
    bin()
        .arg("list")
        .arg("-s")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "definitions.json\nmessage.json\nrefs.json\n",
        ));
}

#[test]
fn config_file_supplies_paths_and_flags() {
    let tmp = schema_dir();
    let cfg = tmp.path().join("jsdefault.toml");
    fs::write(
        &cfg,
        "[instantiate]\nresolve_default_refs = true\n\n[registry]\npaths = [\".\"]\n",
    )
    .expect("write config");
    bin()
        .args(["instantiate", "refs.json", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"prop":{"inner":"text"}}"#));
}

#[test]
fn required_only_with_pretty_output() {
    let tmp = schema_dir();
    bin()
        .args(["instantiate", "definitions.json#/header", "--required-only", "--pretty", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("{\n  \"version\": 2,\n  \"type\": 0\n}\n"));
}

#[test]
fn flags_override_config_values() {
    let tmp = schema_dir();
    let cfg = tmp.path().join("shallow.toml");
    fs::write(&cfg, "[instantiate]\nmax_depth = 1\n\n[registry]\npaths = [\".\"]\n")
        .expect("write config");

    bin()
        .args(["instantiate", "definitions.json#/header", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPTH_LIMIT_EXCEEDED"));

    bin()
        .args(["instantiate", "definitions.json#/header", "--max-depth", "8", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"version":2,"type":0,"length":8}"#));

    bin()
        .args(["instantiate", "definitions.json#/header", "--max-depth", "0", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-depth must be at least 1"));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = schema_dir();
    let cfg = tmp.path().join("bad.toml");
    fs::write(&cfg, "[instantiate]\nmax_depth = 0\n").expect("write config");
    bin()
        .args(["list", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth"));
}

#[test]
fn invalid_schema_document_is_rejected_unless_validation_is_off() {
    let tmp = schema_dir();
    write(tmp.path(), "bad.json", r#"{"$id": "bad.json", "type": 12}"#);
    bin()
        .arg("list")
        .arg("-s")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.json"));

    bin()
        .args(["list", "--no-validate", "-s"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bad.json"));
}

#[test]
fn missing_sources_are_reported() {
    bin()
        .args(["instantiate", "message.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no schema sources"));
}

#[test]
fn config_schema_writes_file() {
    let tmp = tempdir().expect("tmpdir");
    let out = tmp.path().join("config.schema.json");
    bin()
        .arg("config-schema")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let text = fs::read_to_string(&out).expect("read schema");
    assert!(text.contains("resolve_default_refs"));
    assert!(text.contains("max_depth"));
}

#[test]
fn completions_for_bash() {
    bin()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jsdefault"));
}
