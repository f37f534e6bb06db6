use msggen_core::{OutputError, Record};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tracing::debug;

/// Output format for stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Compact JSON (one object per line)
    #[default]
    Json,
    /// Message text only
    Raw,
}

impl OutputFormat {
    /// Parse a format name, falling back to JSON for unknown names
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "raw" => OutputFormat::Raw,
            _ => OutputFormat::Json,
        }
    }
}

/// Writes records line by line to stdout or any other async writer
pub struct StdoutWriter<W = Stdout> {
    format: OutputFormat,
    out: W,
}

impl StdoutWriter {
    /// Create a new stdout writer with default format
    pub fn new() -> Self {
        Self::with_format(OutputFormat::default())
    }

    /// Create a new stdout writer with a specific format
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: AsyncWrite + Unpin> StdoutWriter<W> {
    /// Write to `out` instead of stdout
    pub fn to_writer(out: W, format: OutputFormat) -> Self {
        Self { format, out }
    }

    /// Write a single record followed by a newline
    pub async fn write(&mut self, record: &Record) -> Result<(), OutputError> {
        let mut line = self.format_record(record)?;
        line.push('\n');

        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(|e| OutputError::Stdout(e.to_string()))?;

        self.out
            .flush()
            .await
            .map_err(|e| OutputError::Stdout(e.to_string()))?;

        debug!(format = ?self.format, "Wrote record");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Format a record according to the output format
    fn format_record(&self, record: &Record) -> Result<String, OutputError> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(record)
                .map_err(|e| OutputError::Serialization(e.to_string())),
            // Records without a message fall back to their JSON form
            OutputFormat::Raw => match record.text() {
                Some(text) => Ok(text.to_string()),
                None => serde_json::to_string(record)
                    .map_err(|e| OutputError::Serialization(e.to_string())),
            },
        }
    }
}
