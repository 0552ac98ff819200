//! JSON Lines document output

use crate::enrich::EnrichedDocument;
use crate::output::{DocumentSink, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one JSON object per line
pub struct JsonlWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    /// Opens `path` for writing
    ///
    /// With `append` set, documents are added after any existing lines;
    /// otherwise the file is truncated.
    pub fn create(path: &Path, append: bool) -> OutputResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSink for JsonlWriter {
    fn write_document(&mut self, document: &EnrichedDocument) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, document)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn documents_written(&self) -> usize {
        self.written
    }
}

/// Loads documents from a JSON Lines file
///
/// Blank lines are ignored; malformed lines are logged and skipped.
pub fn read_jsonl(path: &Path) -> OutputResult<Vec<EnrichedDocument>> {
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str(line) {
            Ok(document) => documents.push(document),
            Err(e) => tracing::warn!(
                "Skipping malformed line {} in {}: {}",
                index + 1,
                path.display(),
                e
            ),
        }
    }

    Ok(documents)
}
