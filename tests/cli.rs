use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn formgrid(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formgrid").unwrap();
    cmd.current_dir(home).env("FORMGRID_HOME", home);
    cmd
}

fn write_rows(dir: &Path, count: usize) -> std::path::PathBuf {
    let rows: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"name": "Person {}", "age": {}}}"#, i, 20 + i % 7))
        .collect();
    let path = dir.join("rows.json");
    fs::write(&path, format!("[{}]", rows.join(","))).unwrap();
    path
}

#[test]
fn test_table_shows_summary() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 23);

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--page", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 21 to 23 of 23 entries"))
        .stdout(predicate::str::contains("Person 22"));
}

#[test]
fn test_table_search_and_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 30);

    let output = formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--search", "person 2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["table"]["summary"]["total"], 11);
    assert_eq!(result["table"]["rows"].as_array().unwrap().len(), 10);
}

#[test]
fn test_table_sort_toggles_direction() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 5);

    let output = formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--sort", "name", "--sort", "name", "--json"])
        .output()
        .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["table"]["rows"][0]["name"], "Person 4");
    assert_eq!(result["table"]["rows"][4]["name"], "Person 0");
}

#[test]
fn test_table_rejects_zero_page_size() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 3);

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--page-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Page size must be at least 1"));
}

#[test]
fn test_export_csv_writes_every_row() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 12);

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--search", "Person 1", "--export", "csv", "--out", "people"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 12 rows as csv"));

    let csv = fs::read_to_string(temp_dir.path().join("people.csv")).unwrap();
    assert_eq!(csv.lines().count(), 12);
    assert!(csv.starts_with("Person 0,20"));
}

#[test]
fn test_export_default_name_is_timestamped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 2);

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--export", "xlsx"])
        .assert()
        .success();

    let exported: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("export-") && name.ends_with(".xlsx"))
        .collect();
    assert_eq!(exported.len(), 1);
}

#[test]
fn test_export_print_and_unknown_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = write_rows(temp_dir.path(), 2);

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--export", "print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name     | age"));

    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .args(["--export", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown export format: docx"));
}

#[test]
fn test_fields_add_and_delete() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("fields.json");
    fs::write(
        &path,
        r#"{
            "policy": {"enabled": true, "template": {"key": "phone"}, "minRetained": 1},
            "fields": [{"key": "phone", "value": "555"}, {"key": "email"}]
        }"#,
    )
    .unwrap();

    let output = formgrid(temp_dir.path())
        .arg("fields")
        .arg(&path)
        .args(["--add", "2", "--delete", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&str> = result["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["phone[1]", "email", "phone[0]"]);
    assert_eq!(result["hostPatch"][0]["to"], "phone[1]");
    assert_eq!(result["deleted"][0]["key"], "phone[2]");
    assert_eq!(result["deleted"][0]["keyNumeral"], 2);
}

#[test]
fn test_fields_rejects_enabled_policy_without_key() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("fields.json");
    fs::write(
        &path,
        r#"{"policy": {"enabled": true, "template": {"key": ""}}, "fields": []}"#,
    )
    .unwrap();

    formgrid(temp_dir.path())
        .arg("fields")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("template has no key"));
}

#[test]
fn test_fields_resolves_duplicates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("fields.json");
    fs::write(
        &path,
        r#"{"fields": [{"key": "a"}, {"key": "b"}, {"key": "a"}, {"key": "b"}, {"key": "c"}]}"#,
    )
    .unwrap();

    formgrid(temp_dir.path())
        .arg("fields")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("a[0]"))
        .stdout(predicate::str::contains("b[3]"))
        .stdout(predicate::str::contains("c").and(predicate::str::contains("c[").not()));
}

#[test]
fn test_label_command() {
    let temp_dir = tempfile::tempdir().unwrap();

    formgrid(temp_dir.path())
        .args(["label", "alphabetical", "26", "--base", "Item", "--suffix"])
        .assert()
        .success()
        .stdout("Item aa\n");

    formgrid(temp_dir.path())
        .args(["label", "numeric", "0", "--prefix"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_config_set_and_get() {
    let temp_dir = tempfile::tempdir().unwrap();

    formgrid(temp_dir.path())
        .args(["config", "page-size", "4"])
        .assert()
        .success();

    formgrid(temp_dir.path())
        .args(["config", "page-size"])
        .assert()
        .success()
        .stdout("page-size = 4\n");

    formgrid(temp_dir.path())
        .args(["config", "alphabet", "aa"])
        .assert()
        .failure();

    let rows = write_rows(temp_dir.path(), 9);
    formgrid(temp_dir.path())
        .arg("table")
        .arg(&rows)
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 to 4 of 9 entries"));
}
