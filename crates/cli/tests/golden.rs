//! End-to-end tests for the `mfs` binary
//!
//! Each test runs the built binary against an isolated configuration
//! directory and checks exit codes and JSON output.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn mfs(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mfs"))
        .args(args)
        .env("MFS_CONFIG_DIR", config_dir)
        .env_remove("MFS_LOG")
        .output()
        .expect("Failed to execute mfs")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

/// Config directory plus a resource root containing `conf/app.toml`
fn setup_resources() -> (TempDir, TempDir) {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("conf")).unwrap();
    std::fs::write(root.path().join("conf/app.toml"), "name = \"demo\"\n").unwrap();
    std::fs::write(root.path().join("conf/App.class"), "cafebabe").unwrap();

    let config = format!(
        "version = \"1\"\n\n[resources]\nroots = [{:?}]\nallow = [\"/conf\"]\n",
        root.path().display().to_string()
    );
    std::fs::write(config_dir.path().join("config.toml"), config).unwrap();
    (config_dir, root)
}

#[test]
fn test_alias_list_empty_json() {
    let config_dir = TempDir::new().unwrap();
    let output = mfs(config_dir.path(), &["alias", "list", "--json"]);

    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["aliases"], serde_json::json!([]));
}

#[test]
fn test_alias_set_then_list() {
    let config_dir = TempDir::new().unwrap();
    let output = mfs(
        config_dir.path(),
        &["alias", "set", "minio", "http://localhost:9000", "ak", "sk", "--json"],
    );
    assert!(output.status.success());

    let output = mfs(config_dir.path(), &["alias", "list", "--json"]);
    let json = json_stdout(&output);
    assert_eq!(json["aliases"][0]["name"], "minio");
    assert_eq!(json["aliases"][0]["endpoint"], "http://localhost:9000");
    assert!(json["aliases"][0].get("secret_key").is_none());
}

#[test]
fn test_put_then_cat_local() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = work.path().join("in.txt");
    std::fs::write(&input, "payload").unwrap();

    let target = format!("local:{}", work.path().join("out.txt").display());
    let output = mfs(
        config_dir.path(),
        &["put", input.to_str().unwrap(), &target, "--json"],
    );
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["size_bytes"], 7);

    let output = mfs(config_dir.path(), &["cat", &target]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"payload");
}

#[test]
fn test_classpath_listing_hides_class_files() {
    let (config_dir, _root) = setup_resources();
    let output = mfs(config_dir.path(), &["ls", "cp:/conf", "--json"]);

    assert!(output.status.success());
    let json = json_stdout(&output);
    let names: Vec<_> = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["app.toml"]);
}

#[test]
fn test_resource_cat_and_stat() {
    let (config_dir, root) = setup_resources();

    let output = mfs(config_dir.path(), &["cat", "res:/conf/app.toml"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"name = \"demo\"\n");

    let output = mfs(config_dir.path(), &["stat", "res:/conf/app.toml", "--json"]);
    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["kind"], "file");
    assert_eq!(json["size_bytes"], 14);
    let host = root.path().join("conf/app.toml");
    assert_eq!(json["system_path"], host.display().to_string());
}

#[test]
fn test_exit_codes() {
    let (config_dir, _root) = setup_resources();

    let output = mfs(config_dir.path(), &["realpath", "res:/secret/key"]);
    assert_eq!(output.status.code(), Some(7));

    let output = mfs(config_dir.path(), &["cat", "res:/conf/missing.toml"]);
    assert_eq!(output.status.code(), Some(5));

    let output = mfs(config_dir.path(), &["ls", "nosuchalias:/bucket"]);
    assert_eq!(output.status.code(), Some(5));

    let output = mfs(config_dir.path(), &["ls", "no-fs-prefix"]);
    assert_eq!(output.status.code(), Some(2));

    let output = mfs(config_dir.path(), &["mkdir", "res:/conf/new"]);
    assert_eq!(output.status.code(), Some(6));
}
