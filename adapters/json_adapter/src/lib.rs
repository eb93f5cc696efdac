use mention_core::domain::ScanResponse;
use mention_core::ports::{RecordWriter, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Writes the scan response as pretty-printed JSON, to a file or stdout
pub struct JsonResponseWriter {
    output_file: Option<PathBuf>,
}

impl JsonResponseWriter {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            output_file: Some(path.into()),
        }
    }

    pub fn to_stdout() -> Self {
        Self { output_file: None }
    }
}

impl RecordWriter for JsonResponseWriter {
    fn write(&self, response: &ScanResponse) -> Result<()> {
        let body = serde_json::to_string_pretty(response)?;
        match &self.output_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, format!("{body}\n"))?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{body}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mention_core::domain::Record;

    #[test]
    fn test_writes_response_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scan.json");
        let response = ScanResponse::from_records(vec![Record {
            sender: "Alice".to_string(),
            context: "Team Sync".to_string(),
            content: "Please review the PR today".to_string(),
            time: None,
        }]);

        JsonResponseWriter::to_file(&path).write(&response).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["success"], true);
        assert_eq!(written["count"], 1);
        assert_eq!(written["data"][0]["sender"], "Alice");
        assert!(written["data"][0].get("time").is_none());
    }
}
