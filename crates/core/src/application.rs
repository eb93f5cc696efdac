use crate::domain::ScanResponse;
use crate::extractor::Extractor;
use crate::ports::{DocumentSource, RecordWriter, Result};

/// Application service for scanning a captured page and delivering the records
pub struct ScanServiceImpl {
    source: Box<dyn DocumentSource>,
    writer: Box<dyn RecordWriter>,
    extractor: Extractor,
}

impl ScanServiceImpl {
    /// Creates a new ScanServiceImpl with the given dependencies
    pub fn new(
        source: Box<dyn DocumentSource>,
        writer: Box<dyn RecordWriter>,
        extractor: Extractor,
    ) -> Self {
        Self {
            source,
            writer,
            extractor,
        }
    }

    /// Executes the scan: loads the page, extracts records, writes the response
    pub fn execute_scan(&self) -> Result<ScanResponse> {
        let tree = self.source.load()?;
        let response = self.extractor.scan(&tree.root()).into_response();
        self.writer.write(&response)?;
        Ok(response)
    }
}
