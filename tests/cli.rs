mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use nested_frame::{ColumnType, probe::FrameSchema};
use predicates::str::contains;

fn probe() -> Command {
    let mut command = Command::cargo_bin("nested-frame").expect("binary exists");
    command.arg("probe");
    command
}

#[test]
fn probe_prints_inferred_types() {
    probe()
        .args(["-i", fixture_path("orders.csv").to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("amount"))
        .stdout(contains("double"))
        .stdout(contains("datetime"))
        .stdout(contains("customer.name"));
}

#[test]
fn probe_writes_nested_schema_yaml() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("schema.yml");
    probe()
        .args([
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--nest-separator",
            ".",
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read schema");
    let schema: FrameSchema = serde_yaml::from_str(&contents).expect("parse schema");
    assert_eq!(schema.rows, 3);
    let types = schema
        .columns
        .iter()
        .map(|column| (column.path.as_str(), column.ty.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        [
            ("id", ColumnType::Int),
            ("customer.name", ColumnType::String),
            ("customer.since", ColumnType::LocalDate),
            ("amount", ColumnType::Double),
            ("shipped", ColumnType::Boolean),
            ("placed_at", ColumnType::LocalDateTime),
            ("note.gift", ColumnType::Boolean),
        ]
    );
    let note = schema
        .columns
        .iter()
        .find(|column| column.path == "note.gift")
        .unwrap();
    assert!(note.nullable);
}

#[test]
fn skip_type_and_null_string_flags_apply() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("data.tsv", "score\tflag\n1\t?\n2\tno\n");
    let output = workspace.path().join("schema.yml");
    probe()
        .args([
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--skip-type",
            "int",
            "--skip-type",
            "long",
            "--null-string",
            "?",
        ])
        .assert()
        .success();
    let schema: FrameSchema =
        serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(schema.columns[0].ty, ColumnType::Double);
    assert_eq!(schema.columns[1].ty, ColumnType::Boolean);
    assert!(schema.columns[1].nullable);
}

#[test]
fn options_file_is_merged_with_flags() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("prices.csv", "price;when\n\"1,5\";03.02.2024\n");
    let options = workspace.write(
        "options.yml",
        "locale: de-DE\ndate_time_format: \"%d.%m.%Y\"\n",
    );
    probe()
        .args([
            "-i",
            input.to_str().unwrap(),
            "--delimiter",
            ";",
            "--options",
            options.to_str().unwrap(),
            "--preview",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains("double"))
        .stdout(contains("date"))
        .stdout(contains("2024-02-03"));
}

#[test]
fn stdin_input_is_supported() {
    probe()
        .args(["-i", "-"])
        .write_stdin("a,b\n1,x\n")
        .assert()
        .success()
        .stdout(contains("int"));
}

#[test]
fn missing_input_reports_error() {
    probe()
        .args(["-i", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(contains("Opening input file"));
}

#[test]
fn unknown_locale_is_rejected() {
    probe()
        .args([
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "--locale",
            "xx-YY",
        ])
        .assert()
        .failure()
        .stderr(contains("Unsupported locale"));
}
