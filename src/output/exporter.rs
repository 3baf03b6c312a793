//! Tabular export of result records.

use super::write_atomic;
use crate::models::{Result, ResultRecord, SweepError};
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;
use tracing::info;

/// Header row of the results file, in column order.
pub const RESULT_COLUMNS: [&str; 6] = [
    "temperature",
    "max_tokens",
    "presence_penalty",
    "frequency_penalty",
    "model",
    "generated_description",
];

/// Write records to a comma-separated file, one row per record in input order.
///
/// The header row is written even when there are no records.
pub fn export_results(records: &[ResultRecord], path: &Path) -> Result<()> {
    write_atomic(path, "results file", |writer| {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer
            .write_record(RESULT_COLUMNS)
            .map_err(|e| SweepError::csv("writing results header", e))?;

        for record in records {
            csv_writer
                .serialize(record)
                .map_err(|e| SweepError::csv("writing result row", e))?;
        }

        csv_writer
            .flush()
            .map_err(|e| SweepError::io("flushing results file", e))
    })?;

    info!(rows = records.len(), path = %path.display(), "Results saved");
    Ok(())
}

/// Read a results file written by [`export_results`].
pub fn load_results(path: &Path) -> Result<Vec<ResultRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| SweepError::csv("opening results file", e))?;

    let headers = reader
        .headers()
        .map_err(|e| SweepError::csv("reading results header", e))?;
    if headers.iter().ne(RESULT_COLUMNS) {
        let found = headers.iter().collect::<Vec<_>>().join(",");
        return Err(SweepError::io(
            "reading results header",
            IoError::new(ErrorKind::InvalidData, format!("unexpected columns: {found}")),
        ));
    }

    reader
        .deserialize::<ResultRecord>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| SweepError::csv(format!("parsing results row {}", i + 1), e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ERROR_SENTINEL, ParameterTuple};
    use crate::pipeline::ParameterGrid;
    use tempfile::TempDir;

    fn sample_records() -> Vec<ResultRecord> {
        ParameterGrid::default()
            .enumerate()
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                if i == 4 {
                    ResultRecord::failed(p, "gpt-3.5-turbo")
                } else {
                    ResultRecord::new(p, "gpt-3.5-turbo", format!("Description number {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_export_writes_header_and_one_row_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        export_results(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 37);
        assert_eq!(
            lines[0],
            "temperature,max_tokens,presence_penalty,frequency_penalty,model,generated_description"
        );
        assert_eq!(lines[1], "0.0,50,0.0,0.0,gpt-3.5-turbo,Description number 0");
        assert_eq!(lines[5], "0.0,150,0.0,0.0,gpt-3.5-turbo,[Error generating text]");
        assert_eq!(lines[36], "1.2,300,1.5,1.5,gpt-3.5-turbo,Description number 35");
    }

    #[test]
    fn test_export_empty_still_has_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        export_results(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "temperature,max_tokens,presence_penalty,frequency_penalty,model,generated_description\n"
        );
        assert!(load_results(&path).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_values_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        let params = ParameterTuple {
            temperature: 0.7,
            max_tokens: 150,
            presence_penalty: 1.5,
            frequency_penalty: 0.0,
        };
        let records = vec![
            ResultRecord::new(params, "gpt-4", "Fast, quiet, \"electric\".".to_string()),
            ResultRecord::new(params, "gpt-4", "Line one\nLine two".to_string()),
            ResultRecord::failed(params, "gpt-4"),
        ];

        export_results(&records, &path).unwrap();
        let loaded = load_results(&path).unwrap();

        assert_eq!(loaded, records);
        assert_eq!(loaded[2].generated_text, ERROR_SENTINEL);
    }

    #[test]
    fn test_full_grid_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        let records = sample_records();

        export_results(&records, &path).unwrap();

        assert_eq!(load_results(&path).unwrap(), records);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_such_dir").join("results.csv");

        let result = export_results(&sample_records(), &path);

        assert!(matches!(result, Err(SweepError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_refuses_read_only_results_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        std::fs::write(&path, "kept\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        let result = export_results(&sample_records(), &path);

        assert!(matches!(result, Err(SweepError::Io { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_load_rejects_foreign_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        assert!(load_results(&path).is_err());
    }
}
