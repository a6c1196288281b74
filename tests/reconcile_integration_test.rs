use anyhow::Result;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use timesheet_recon::{
    CliConfig, Discrepancy, LocalStorage, ReconError, ReconcileJob, ReconciliationPipeline,
    ReconciliationReport, TimesheetSource, TomlConfig,
};

fn prism_row(id: &str, hours_type: &str, hours: &str) -> String {
    let mut cells: Vec<String> = (0..19).map(|i| format!("p{}", i)).collect();
    cells[5] = id.to_string();
    cells[17] = hours_type.to_string();
    cells[18] = hours.to_string();
    cells.join(",")
}

fn beeline_row(id: &str, units: &str) -> String {
    let mut cells: Vec<String> = (0..11).map(|i| format!("b{}", i)).collect();
    cells[10] = id.to_string();
    cells[6] = units.to_string();
    cells.join(",")
}

struct Inputs {
    mapping: Vec<(&'static str, &'static str)>,
    prism: Vec<(&'static str, &'static str, &'static str)>,
    beeline: Vec<(&'static str, &'static str)>,
}

fn write_inputs(dir: &Path, inputs: &Inputs) -> Result<()> {
    let mut mapping = vec!["Fulcrum ID,MasterCard ID".to_string()];
    mapping.extend(inputs.mapping.iter().map(|(a, b)| format!("{},{}", a, b)));
    std::fs::write(dir.join("mapping.csv"), mapping.join("\n"))?;

    let mut prism = vec![prism_row("UserEmployeeID", "TypeOfHours", "TotalHours")];
    prism.extend(inputs.prism.iter().map(|(a, b, c)| prism_row(a, b, c)));
    std::fs::write(dir.join("prism.csv"), prism.join("\n"))?;

    let mut beeline = vec![beeline_row("MasterCardID", "Units")];
    beeline.extend(inputs.beeline.iter().map(|(a, b)| beeline_row(a, b)));
    std::fs::write(dir.join("beeline.csv"), beeline.join("\n"))?;
    Ok(())
}

fn cli_config(dir: &Path, extra: &[&str]) -> CliConfig {
    use clap::Parser;

    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
    let mut argv = vec![
        "timesheet-recon".to_string(),
        "--prism-file".to_string(),
        path("prism.csv"),
        "--beeline-file".to_string(),
        path("beeline.csv"),
        "--mapping-file".to_string(),
        path("mapping.csv"),
        "--output-path".to_string(),
        path("out"),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliConfig::parse_from(argv)
}

async fn run(dir: &Path, inputs: &Inputs, extra: &[&str]) -> timesheet_recon::Result<Vec<Discrepancy>> {
    write_inputs(dir, inputs).expect("write inputs");
    let pipeline = ReconciliationPipeline::new(LocalStorage::default(), cli_config(dir, extra));
    let result = ReconcileJob::new(pipeline).run().await?;
    Ok(result.outcome.report.discrepancies)
}

#[tokio::test]
async fn test_matching_hours_produce_no_discrepancy() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let discrepancies = run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8")],
            beeline: vec![("M1", "8")],
        },
        &[],
    )
    .await?;

    assert!(discrepancies.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unmapped_employee_reported_once() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let discrepancies = run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![],
            prism: vec![("F9", "Reg", "8")],
            beeline: vec![],
        },
        &[],
    )
    .await?;

    assert_eq!(discrepancies, vec![Discrepancy::unmapped("F9")]);
    Ok(())
}

#[tokio::test]
async fn test_unequal_hours_reported_with_both_ids() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let discrepancies = run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8")],
            beeline: vec![("M1", "7.5")],
        },
        &[],
    )
    .await?;

    assert_eq!(discrepancies, vec![Discrepancy::hours_mismatch("F1", "M1")]);
    Ok(())
}

#[tokio::test]
async fn test_split_hours_only_flag_unmatched_line() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let discrepancies = run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8"), ("F1", "OT", "2.5")],
            beeline: vec![("M1", "8"), ("M1", "2")],
        },
        &[],
    )
    .await?;

    assert_eq!(discrepancies, vec![Discrepancy::hours_mismatch("F1", "M1")]);
    Ok(())
}

#[tokio::test]
async fn test_decimal_formatting_is_not_normalised() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let discrepancies = run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8.0")],
            beeline: vec![("M1", "8")],
        },
        &[],
    )
    .await?;

    assert_eq!(discrepancies.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_outputs_written_to_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    run(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1"), ("F2", "M2")],
            prism: vec![("F1", "Reg", "8"), ("F3", "Reg", "8"), ("F2", "Reg", "4")],
            beeline: vec![("M1", "8"), ("M2", "5")],
        },
        &["--output-formats", "json,csv", "--bundle"],
    )
    .await?;

    let out = temp_dir.path().join("out");

    let report: ReconciliationReport =
        serde_json::from_slice(&std::fs::read(out.join("reconciliation.json"))?)?;
    assert_eq!(report.status, "success");
    assert_eq!(
        report.discrepancies,
        vec![
            Discrepancy::unmapped("F3"),
            Discrepancy::hours_mismatch("F2", "M2"),
        ]
    );

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("reconciliation.json"))?)?;
    assert_eq!(
        raw["discrepancies"][0],
        serde_json::json!({"fulcrumId": "F3", "error": "MasterCard ID mapping not found"})
    );
    assert_eq!(raw["discrepancies"][1]["masterCardId"], "M2");

    let csv_content = std::fs::read_to_string(out.join("discrepancies.csv"))?;
    assert!(csv_content.starts_with("fulcrumId,masterCardId,error\n"));
    assert!(csv_content.contains("F2,M2,Discrepancy in hours"));

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("summary.json"))?)?;
    assert_eq!(summary["prism_records"], 3);
    assert_eq!(summary["unmapped"], 1);
    assert_eq!(summary["hours_mismatches"], 1);

    let zip_data = std::fs::read(out.join("reconciliation.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
        .collect::<std::result::Result<_, _>>()?;
    assert!(file_names.contains(&"reconciliation.json".to_string()));
    assert!(file_names.contains(&"discrepancies.csv".to_string()));
    assert!(file_names.contains(&"summary.json".to_string()));

    let mut bundled_csv = String::new();
    archive
        .by_name("discrepancies.csv")?
        .read_to_string(&mut bundled_csv)?;
    assert_eq!(bundled_csv, csv_content);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_mapping_policy() -> Result<()> {
    let inputs = Inputs {
        mapping: vec![("F1", "M1"), ("F1", "M2")],
        prism: vec![("F1", "Reg", "8")],
        beeline: vec![("M2", "8")],
    };

    let temp_dir = TempDir::new()?;
    let discrepancies = run(temp_dir.path(), &inputs, &[]).await?;
    assert!(discrepancies.is_empty(), "later mapping row should win");

    let temp_dir = TempDir::new()?;
    let result = run(temp_dir.path(), &inputs, &["--reject-duplicate-mappings"]).await;
    assert!(matches!(
        result,
        Err(ReconError::MalformedMapping { row: 2, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_short_beeline_row_fails_whole_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_inputs(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8")],
            beeline: vec![("M1", "8")],
        },
    )?;
    let beeline_path = temp_dir.path().join("beeline.csv");
    let mut content = std::fs::read_to_string(&beeline_path)?;
    content.push_str("\nb0,b1,b2,b3,b4,b5,8");
    std::fs::write(&beeline_path, content)?;

    let pipeline = ReconciliationPipeline::new(
        LocalStorage::default(),
        cli_config(temp_dir.path(), &[]),
    );
    match ReconcileJob::new(pipeline).run().await {
        Err(ReconError::ExtractionError { dataset, row, .. }) => {
            assert_eq!(dataset, TimesheetSource::Beeline);
            assert_eq!(row, 2);
        }
        other => panic!("expected extraction error, got {:?}", other.map(|r| r.output_path)),
    }
    assert!(!temp_dir.path().join("out").exists());
    Ok(())
}

#[tokio::test]
async fn test_toml_job_with_tsv_and_header_checks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    std::fs::write(dir.join("mapping.csv"), "Fulcrum,MasterCard\nF1,M1\nF2,M2\n")?;
    std::fs::write(
        dir.join("prism.csv"),
        "Name,Employee ID,Hours\nAda,F1,8\nGrace,F2,6\n",
    )?;
    std::fs::write(
        dir.join("beeline.tsv"),
        "Worker\tUnits\nM1\t8\nM2\t6.0\n",
    )?;

    let normalized = dir.to_string_lossy().replace('\\', "/");
    let config_content = format!(
        r#"
[job]
name = "custom-layout"

[inputs]
prism_file = "{dir}/prism.csv"
beeline_file = "{dir}/beeline.tsv"
mapping_file = "{dir}/mapping.csv"

[prism.columns]
fulcrum_id = {{ index = 1, header = "Employee ID" }}
hours_type = {{ index = 0 }}
total_hours = {{ index = 2, header = "hours" }}

[beeline.columns]
mastercard_id = {{ index = 0, header = "Worker" }}
units = {{ index = 1, header = "Units" }}

[load]
output_path = "{dir}/out"
output_formats = ["json"]
"#,
        dir = normalized
    );
    let config_path = dir.join("recon.toml");
    std::fs::write(&config_path, config_content)?;

    let config = TomlConfig::from_file(&config_path)?;
    let pipeline = ReconciliationPipeline::new(LocalStorage::default(), config);
    let result = ReconcileJob::new(pipeline).run().await?;

    assert_eq!(
        result.outcome.report.discrepancies,
        vec![Discrepancy::hours_mismatch("F2", "M2")]
    );
    assert!(dir.join("out/reconciliation.json").exists());
    assert!(!dir.join("out/discrepancies.csv").exists());

    // Renaming a column in the export is caught before any row is read.
    std::fs::write(dir.join("beeline.tsv"), "Worker\tHours\nM1\t8\n")?;
    let config = TomlConfig::from_file(&config_path)?;
    let pipeline = ReconciliationPipeline::new(LocalStorage::default(), config);
    assert!(matches!(
        ReconcileJob::new(pipeline).run().await,
        Err(ReconError::ExtractionError {
            dataset: TimesheetSource::Beeline,
            row: 0,
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn test_latin1_byte_only_fails_in_a_read_column() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let inputs = Inputs {
        mapping: vec![("F1", "M1")],
        prism: vec![],
        beeline: vec![("M1", "8")],
    };
    write_inputs(temp_dir.path(), &inputs)?;
    let prism_path = temp_dir.path().join("prism.csv");
    // '@' stands in for 0xE9, "é" in Windows-1252.
    let latin1 = |row: String| -> Vec<u8> {
        let mut content = format!("{}\n", prism_row("UserEmployeeID", "TypeOfHours", "TotalHours"));
        content.push_str(&row);
        content
            .bytes()
            .map(|b| if b == b'@' { 0xe9 } else { b })
            .collect()
    };

    // Name column, never read.
    std::fs::write(
        &prism_path,
        latin1(prism_row("F1", "Reg", "8").replacen("p0", "Ren@e", 1)),
    )?;
    let pipeline = ReconciliationPipeline::new(
        LocalStorage::default(),
        cli_config(temp_dir.path(), &[]),
    );
    let result = ReconcileJob::new(pipeline).run().await?;
    assert!(result.outcome.report.discrepancies.is_empty());

    // Employee ID column.
    std::fs::write(&prism_path, latin1(prism_row("F@", "Reg", "8")))?;
    let pipeline = ReconciliationPipeline::new(
        LocalStorage::default(),
        cli_config(temp_dir.path(), &[]),
    );
    match ReconcileJob::new(pipeline).run().await {
        Err(ReconError::ExtractionError { dataset, row, .. }) => {
            assert_eq!(dataset, TimesheetSource::Prism);
            assert_eq!(row, 1);
        }
        other => panic!("expected extraction error, got {:?}", other.map(|r| r.output_path)),
    }
    Ok(())
}

#[tokio::test]
async fn test_row_numbers_count_blank_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_inputs(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8")],
            beeline: vec![],
        },
    )?;
    let beeline = format!(
        "{}\n{}\n\n{}\n",
        beeline_row("MasterCardID", "Units"),
        beeline_row("M1", "8"),
        "b0,b1,b2,b3,b4,b5,8"
    );
    std::fs::write(temp_dir.path().join("beeline.csv"), beeline)?;

    let pipeline = ReconciliationPipeline::new(
        LocalStorage::default(),
        cli_config(temp_dir.path(), &[]),
    );
    match ReconcileJob::new(pipeline).run().await {
        Err(ReconError::ExtractionError { dataset, row, .. }) => {
            assert_eq!(dataset, TimesheetSource::Beeline);
            assert_eq!(row, 3);
        }
        other => panic!("expected extraction error, got {:?}", other.map(|r| r.output_path)),
    }
    Ok(())
}

#[test]
fn test_json_logs_stay_off_stdout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_inputs(
        temp_dir.path(),
        &Inputs {
            mapping: vec![("F1", "M1")],
            prism: vec![("F1", "Reg", "8"), ("F2", "Reg", "8")],
            beeline: vec![("M1", "8")],
        },
    )?;

    let path = |name: &str| temp_dir.path().join(name);
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_timesheet-recon"))
        .arg("--prism-file")
        .arg(path("prism.csv"))
        .arg("--beeline-file")
        .arg(path("beeline.csv"))
        .arg("--mapping-file")
        .arg(path("mapping.csv"))
        .arg("--output-path")
        .arg(path("out"))
        .arg("--json-logs")
        .env_remove("RUST_LOG")
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(!stdout.contains("\"level\""), "log lines on stdout: {}", stdout);
    assert!(stderr.contains("\"level\""));

    // The report is the leading JSON document on stdout.
    let report: ReconciliationReport = serde_json::Deserializer::from_str(&stdout)
        .into_iter::<ReconciliationReport>()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no report on stdout"))??;
    assert_eq!(report.discrepancies, vec![Discrepancy::unmapped("F2")]);
    Ok(())
}
