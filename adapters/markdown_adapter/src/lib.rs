use chrono::{Local, NaiveDateTime};
use mention_core::domain::{Record, ScanResponse};
use mention_core::ports::{RecordWriter, Result};
use mention_core::utils::{resolve_time_token, sanitize_filename};
use std::fs;
use std::path::Path;

/// Markdown writer adapter implementation
pub struct MarkdownWriterAdapter {
    output_folder: String,
    /// Reference instant for relative timestamps; the current local time when unset.
    now: Option<NaiveDateTime>,
}

impl MarkdownWriterAdapter {
    pub fn new(output_folder: String) -> Self {
        Self {
            output_folder,
            now: None,
        }
    }

    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    fn reference_time(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Formats the timestamp token of a record, resolved when possible
    fn format_time(&self, token: &str, now: NaiveDateTime) -> String {
        match resolve_time_token(token, now) {
            Some(resolved) if resolved.time() == chrono::NaiveTime::MIN => {
                format!("{} ({})", token, resolved.format("%Y-%m-%d"))
            }
            Some(resolved) => format!("{} ({})", token, resolved.format("%Y-%m-%d %H:%M")),
            None => token.to_string(),
        }
    }

    /// Formats records into markdown for a single context
    fn format_markdown(&self, context: &str, records: &[&Record], now: NaiveDateTime) -> String {
        if records.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        output.push_str(&format!("# {}\n\n", context));
        output.push_str(&format!("*{} messages*\n\n", records.len()));
        output.push_str("---\n\n");

        for record in records {
            match &record.time {
                Some(token) => output.push_str(&format!(
                    "**{}** *{}*\n\n",
                    record.sender,
                    self.format_time(token, now)
                )),
                None => output.push_str(&format!("**{}**\n\n", record.sender)),
            }
            output.push_str(&format!("{}\n\n", record.content));
            output.push_str("---\n\n");
        }

        output
    }
}

impl RecordWriter for MarkdownWriterAdapter {
    fn write(&self, response: &ScanResponse) -> Result<()> {
        if response.data.is_empty() {
            return Ok(());
        }

        let output_dir = Path::new(&self.output_folder);
        fs::create_dir_all(output_dir)?;

        // Group by context, keeping the order contexts were first seen in
        let mut grouped: Vec<(&str, Vec<&Record>)> = Vec::new();
        for record in &response.data {
            match grouped
                .iter()
                .position(|(context, _)| *context == record.context)
            {
                Some(index) => grouped[index].1.push(record),
                None => grouped.push((record.context.as_str(), vec![record])),
            }
        }

        let now = self.reference_time();
        for (context, records) in &grouped {
            let filename = format!("{}.md", sanitize_filename(context));
            let markdown_content = self.format_markdown(context, records, now);
            fs::write(output_dir.join(&filename), markdown_content)?;
        }

        Ok(())
    }
}
