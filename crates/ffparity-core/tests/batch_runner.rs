use ffparity_core::ParityErrorCategory;
use ffparity_core::batch::{BatchRunnerConfig, ForceFieldVariant, render_human_summary, run_batch};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const NAMES: [&str; 5] = ["ALPHA01", "BRAVO02", "CHARLIE03", "DELTA04", "ECHO05"];

#[test]
fn default_selection_runs_mmff94_units_with_stride_four() {
    let temp = TempDir::new().expect("tempdir should be created");
    let manifest_path = write_batch(&temp);
    let report_path = temp.path().join("reports/batch.json");

    let config = BatchRunnerConfig {
        manifest_path,
        report_path: Some(report_path.clone()),
        ..BatchRunnerConfig::default()
    };
    let report = run_batch(&config).expect("batch should run");

    assert!(report.passed);
    assert_eq!(report.stride, 4);
    assert_eq!(report.unit_count, 1);
    assert_eq!(report.molecule_count, 2);
    assert_eq!(report.units[0].unit_id, "mmff94-sdf");
    assert_eq!(report.units[0].unchecked_molecule_count, 3);
    assert!(report.units[0].check_energy);

    let summary = render_human_summary(&report);
    assert!(summary.contains("All 2 tests passed"), "summary: {}", summary);
    assert!(summary.contains("Batch status: PASS (1/1 units passed"));

    let report_json = fs::read_to_string(&report_path).expect("report file should be readable");
    let parsed: Value = serde_json::from_str(&report_json).expect("report should parse");
    assert_eq!(parsed["passed"], Value::Bool(true));
    assert_eq!(parsed["units"][0]["variant"], "MMFF94");
    assert_eq!(parsed["units"][0]["format"], "sdf");
    assert_eq!(parsed["tolerance"]["forceConstant"], 0.05);
}

#[test]
fn selected_variant_with_full_run_checks_every_molecule() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config = BatchRunnerConfig {
        manifest_path: write_batch(&temp),
        variant: Some(ForceFieldVariant::Mmff94),
        full: true,
        ..BatchRunnerConfig::default()
    };
    let report = run_batch(&config).expect("batch should run");

    assert!(!report.passed);
    assert_eq!(report.stride, 1);
    assert_eq!(report.molecule_count, 5);
    assert_eq!(report.failed_molecule_count, 1);

    let unit = &report.units[0];
    assert_eq!(unit.failures.len(), 1);
    assert_eq!(unit.failures[0].name, "BRAVO02");

    let summary = render_human_summary(&report);
    assert!(summary.contains("BRAVO02\n\nBond stretching: found a difference\nExpected:\n"));
    assert!(summary.contains("4 tests passed\n1 test failed"));
    assert!(summary.contains("Batch status: FAIL"));
}

#[test]
fn full_run_reaches_units_with_unreadable_reports() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config = BatchRunnerConfig {
        manifest_path: write_batch(&temp),
        full: true,
        ..BatchRunnerConfig::default()
    };
    let error = run_batch(&config).expect_err("missing candidate log should fail");
    assert_eq!(error.category(), ParityErrorCategory::IoSystemError);
    assert_eq!(error.placeholder(), "IO.REPORT_OPEN");
    assert!(error.message().contains("missing.log"));
}

#[test]
fn candidate_log_override_needs_a_single_unit() {
    let temp = TempDir::new().expect("tempdir should be created");
    let manifest_path = write_batch(&temp);

    let config = BatchRunnerConfig {
        manifest_path: manifest_path.clone(),
        full: true,
        candidate_log: Some(temp.path().join("logs/cand.log")),
        ..BatchRunnerConfig::default()
    };
    let error = run_batch(&config).expect_err("override with two units should fail");
    assert_eq!(error.exit_code(), 2);

    let config = BatchRunnerConfig {
        manifest_path,
        variant: Some(ForceFieldVariant::Mmff94s),
        candidate_log: Some(temp.path().join("logs/cand.log")),
        ..BatchRunnerConfig::default()
    };
    let report = run_batch(&config).expect("override should replace the missing log");
    assert!(report.passed);
    assert!(!report.units[0].check_energy);
}

#[test]
fn empty_selection_is_an_input_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let manifest_path = temp.path().join("manifest.json");
    write_file(
        &manifest_path,
        r#"{ "units": [
            { "id": "only-94s", "variant": "MMFF94s", "format": "sdf",
              "candidateLog": "a.log", "referenceLog": "b.log", "molecules": ["A"] }
        ] }"#,
    );
    let error = run_batch(&BatchRunnerConfig {
        manifest_path,
        ..BatchRunnerConfig::default()
    })
    .expect_err("no MMFF94 unit should fail");
    assert_eq!(error.category(), ParityErrorCategory::InputValidationError);
    assert_eq!(error.placeholder(), "INPUT.BATCH_SELECTION");
}

fn write_batch(temp: &TempDir) -> std::path::PathBuf {
    let molecules: Vec<(&str, f64)> = NAMES
        .iter()
        .map(|&name| (name, if name == "BRAVO02" { 9.0 } else { 4.258 }))
        .collect();
    write_file(&temp.path().join("logs/cand.log"), &candidate_log(&molecules));
    write_file(
        &temp.path().join("logs/ref.log"),
        &reference_log(&NAMES.map(|name| (name, 4.258))),
    );
    write_file(&temp.path().join("names.txt"), &NAMES.join("\n"));

    let manifest_path = temp.path().join("manifest.json");
    write_file(
        &manifest_path,
        r#"
        {
          "units": [
            {
              "id": "mmff94-sdf",
              "variant": "MMFF94",
              "format": "sdf",
              "candidateLog": "logs/cand.log",
              "referenceLog": "logs/ref.log",
              "banner": "Computing MMFF94 energies",
              "moleculeList": "names.txt"
            },
            {
              "id": "mmff94s-smi",
              "variant": "MMFF94s",
              "format": "smi",
              "candidateLog": "logs/missing.log",
              "referenceLog": "logs/ref.log",
              "moleculeList": "names.txt"
            }
          ]
        }
        "#,
    );
    manifest_path
}

fn candidate_log(molecules: &[(&str, f64)]) -> String {
    let mut text = String::from("Computing MMFF94 energies\n\n");
    for (name, kb) in molecules {
        text.push_str(&format!(
            "{name}

 B O N D   S T R E T C H I N G
 ----------------------------------------------------------
  C   #1  C   #2     1    5    0   1.514   1.508   0.006   0.0129  {kb:.4}

TOTAL BOND STRETCH ENERGY      =      0.0129

 V A N   D E R   W A A L S
 ----------------------------------------------------------
  C #1  H #7   2.400   0.0100

TOTAL VAN DER WAALS ENERGY       =     -0.5821

 E L E C T R O S T A T I C
 ----------------------------------------------------------
  C #1  H #7   2.400  -0.0200

TOTAL ELECTROSTATIC ENERGY     =      2.1007

"
        ));
    }
    text
}

fn reference_log(molecules: &[(&str, f64)]) -> String {
    let mut text = String::new();
    for (name, kb) in molecules {
        text.push_str(&format!(
            " MOLECULE  {name}
 B O N D   S T R E T C H I N G
 ----------------------------------------------------------
 C1 C2 1-2 BOND   5   1   0  1.514  1.508  0.006  0.0129  {kb:.4}

 TOTAL BOND STRAIN ENERGY =  0.0129
   Net vdW          -0.5821
   Electrostatic     2.1007
 ****************************************
"
        ));
    }
    text
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should be written");
}
