//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use serde::Serialize;
use sizer_core::{ObjectSize, Oid};
use std::fmt::Write as _;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error message and its causes.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// The size of one requested object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectReport {
    pub oid: Oid,
    #[serde(flatten)]
    pub size: ObjectSize,
}

/// Output for a sizing run.
#[derive(Debug, Serialize)]
pub struct SizeOutput {
    pub success: bool,
    pub result_code: u8,
    pub objects: Vec<ObjectReport>,
}

impl SizeOutput {
    /// Human-readable rendering: one header line per object, then one
    /// indented line per statistic.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for report in &self.objects {
            let _ = writeln!(text, "{} {}", report.oid, report.size.object_type());
            match &report.size {
                ObjectSize::Blob { size } => {
                    let _ = writeln!(text, "  blob_size        {}", size.0);
                }
                ObjectSize::Tree(size) => {
                    let _ = writeln!(text, "  max_depth        {}", size.max_depth);
                    let _ = writeln!(text, "  max_path_length  {}", size.max_path_length);
                    let _ = writeln!(text, "  tree_count       {}", size.tree_count);
                    let _ = writeln!(text, "  max_tree_entries {}", size.max_tree_entries);
                    let _ = writeln!(text, "  blob_count       {}", size.blob_count);
                    let _ = writeln!(text, "  blob_size        {}", size.blob_size);
                    let _ = writeln!(text, "  link_count       {}", size.link_count);
                    let _ = writeln!(text, "  submodule_count  {}", size.submodule_count);
                }
            }
        }
        text
    }
}
