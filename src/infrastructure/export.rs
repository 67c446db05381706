use crate::domain::ResultsRegion;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub struct ResultsExporter;

impl ResultsExporter {
    /// Writes the results region as `label,value` rows under a header.
    /// Returns the number of entries written.
    pub fn write_csv<W: io::Write>(results: &ResultsRegion, writer: W) -> Result<usize, ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["label", "value"])?;
        for entry in &results.entries {
            csv_writer.write_record([entry.label.as_str(), entry.value.as_str()])?;
        }
        csv_writer.flush()?;
        Ok(results.entries.len())
    }

    pub fn export_to_path(results: &ResultsRegion, path: &Path) -> Result<String, ExportError> {
        let file = std::fs::File::create(path)?;
        Self::write_csv(results, file)?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, ResultEntry};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn results() -> ResultsRegion {
        ResultsRegion {
            title: "Assessment".to_string(),
            entries: vec![
                ResultEntry {
                    label: "Animal".to_string(),
                    value: "Dogs".to_string(),
                },
                ResultEntry {
                    label: "Recommendation".to_string(),
                    value: "Rest, fluids, and monitoring".to_string(),
                },
            ],
            bounds: Bounds::default(),
        }
    }

    #[test]
    fn test_write_csv_quotes_commas() {
        let mut buffer = Vec::new();
        let written = ResultsExporter::write_csv(&results(), &mut buffer).expect("export");
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "label,value\nAnimal,Dogs\nRecommendation,\"Rest, fluids, and monitoring\"\n"
        );
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("results.csv");
        let written = ResultsExporter::export_to_path(&results(), &path).expect("export");
        assert_eq!(written, path.display().to_string());
        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.starts_with("label,value\n"));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("results.csv");
        assert!(matches!(
            ResultsExporter::export_to_path(&results(), &path),
            Err(ExportError::Io(_))
        ));
    }
}
