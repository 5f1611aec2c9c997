//! Record export: JSON, JSON Lines and CSV, with optional digest sidecars.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use color_eyre::eyre::{Context, Result};

use filetrack_core::{FileRecord, HashAlgorithm};
use filetrack_scan::hash_file;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Jsonl,
    Csv,
}

/// One CSV row: metadata keys plus record fields. Fields win on collision.
pub fn flatten(record: &FileRecord) -> BTreeMap<String, String> {
    let mut row = record.extra_metadata.clone().unwrap_or_default();
    row.insert("name".into(), record.name.to_string());
    row.insert("path".into(), record.path.display().to_string());
    row.insert("size_bytes".into(), record.size_bytes.to_string());
    row.insert("modified_time".into(), record.modified_time.to_string());
    row.insert("mime_type".into(), record.mime_type.to_string());
    row.insert("content_type".into(), record.content_type.to_string());
    if let Some(hash) = &record.hash {
        row.insert("hash".into(), hash.clone());
    }
    row
}

pub fn write_json<W: Write>(records: &[FileRecord], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_jsonl<W: Write>(records: &[FileRecord], mut writer: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Columns are the sorted union of every row's keys. No records, no output.
pub fn write_csv<W: Write>(records: &[FileRecord], writer: W) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let rows: Vec<_> = records.iter().map(flatten).collect();
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&columns)?;
    for row in &rows {
        csv.write_record(
            columns
                .iter()
                .map(|column| row.get(*column).map(String::as_str).unwrap_or("")),
        )?;
    }
    csv.flush()?;
    Ok(())
}

/// Write records to `writer` in a machine-readable format. Text falls back
/// to JSON Lines.
pub fn write_records<W: Write>(records: &[FileRecord], format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(records, writer),
        OutputFormat::Csv => write_csv(records, writer),
        OutputFormat::Jsonl | OutputFormat::Text => write_jsonl(records, writer),
    }
}

/// Path of the digest sidecar for a log: `<log>.hash`.
pub fn sidecar_path(log: &Path) -> PathBuf {
    let mut name = OsString::from(log.as_os_str());
    name.push(".hash");
    PathBuf::from(name)
}

/// Write records to a file, optionally followed by a digest sidecar.
pub fn write_log(
    records: &[FileRecord],
    path: &Path,
    format: OutputFormat,
    log_hash: Option<HashAlgorithm>,
) -> Result<()> {
    {
        let file = File::create(path)
            .with_context(|| format!("Cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_records(records, format, &mut writer)?;
        writer.flush()?;
    }

    if let Some(algorithm) = log_hash {
        let digest = hash_file(path, algorithm)
            .with_context(|| format!("Cannot hash {}", path.display()))?;
        let sidecar = sidecar_path(path);
        fs::write(&sidecar, format!("{digest}\n"))
            .with_context(|| format!("Cannot write {}", sidecar.display()))?;
        tracing::debug!(log = %path.display(), %algorithm, "wrote digest sidecar");
    }

    Ok(())
}

/// Recompute a log's digest and compare it with its sidecar. A missing log
/// or sidecar is a mismatch.
pub fn verify_log(path: &Path, algorithm: HashAlgorithm) -> Result<bool> {
    let sidecar = sidecar_path(path);
    if !path.is_file() || !sidecar.is_file() {
        return Ok(false);
    }

    let actual = hash_file(path, algorithm)
        .with_context(|| format!("Cannot hash {}", path.display()))?;
    let expected = fs::read_to_string(&sidecar)
        .with_context(|| format!("Cannot read {}", sidecar.display()))?;
    let expected = expected.lines().next().unwrap_or_default().trim();

    Ok(actual == expected)
}
