//! Spreadsheet export of collected responses.
//!
//! Building the table is pure ([`SheetTable::build`]); writing it out is
//! done by an [`Exporter`] configured with the sheet name and timestamp
//! format.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local, Utc};
use regex::Regex;
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::form::{FormDefinition, FormSubmission};

/// Header of the first column.
pub const TIMESTAMP_HEADER: &str = "Timestamp";

/// Suffix appended to the form title to name the exported file.
pub const FILE_SUFFIX: &str = "_datos.xlsx";

/// Rows in one worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Columns in one worksheet.
pub const MAX_COLUMNS: usize = 16_384;

/// Characters that cannot appear in a file name on common platforms.
static UNSAFE_FILE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("static file name pattern is valid")
});

/// One data row: the submission time plus stringified field values.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// When the submission was saved.
    pub timestamp: DateTime<Utc>,
    /// One cell per field, in field order.
    pub cells: Vec<String>,
}

/// The row-oriented table that gets written to the spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// Form title, used to name the file.
    pub title: String,
    /// `Timestamp` followed by field labels.
    pub header: Vec<String>,
    /// One row per submission.
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Tabulate `submissions` against `form`'s fields.
    ///
    /// Returns `None` when there is nothing to export.
    #[must_use]
    pub fn build<'a, I>(form: &FormDefinition, submissions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a FormSubmission>,
    {
        let rows: Vec<SheetRow> = submissions
            .into_iter()
            .filter(|s| s.form_id == form.id)
            .map(|s| SheetRow {
                timestamp: s.timestamp,
                cells: form.fields.iter().map(|f| s.cell(&f.id)).collect(),
            })
            .collect();

        if rows.is_empty() {
            return None;
        }

        let header = std::iter::once(TIMESTAMP_HEADER.to_string())
            .chain(form.fields.iter().map(|f| f.label.clone()))
            .collect();

        Some(Self {
            title: form.title.clone(),
            header,
            rows,
        })
    }

    /// Number of rows, header included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Number of columns, timestamp included.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Render every row as strings, header first, formatting timestamps in
    /// local time with `timestamp_format`.
    #[must_use]
    pub fn to_rows(&self, timestamp_format: &str) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().map(|row| {
                std::iter::once(format_timestamp(row.timestamp, timestamp_format))
                    .chain(row.cells.iter().cloned())
                    .collect()
            }))
            .collect()
    }

    /// The exported file name: `<title>_datos.xlsx`.
    #[must_use]
    pub fn file_name(&self) -> String {
        export_file_name(&self.title)
    }
}

/// Format a submission time the way the export shows it.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>, format: &str) -> String {
    timestamp.with_timezone(&Local).format(format).to_string()
}

/// File name for a form's export, with unsafe characters replaced by `_`.
#[must_use]
pub fn export_file_name(title: &str) -> String {
    let safe = UNSAFE_FILE_CHARS.replace_all(title.trim(), "_");
    format!("{safe}{FILE_SUFFIX}")
}

/// Writes tables to `.xlsx` files.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    sheet_name: String,
    timestamp_format: String,
}

impl Exporter {
    /// Create an exporter from configuration.
    #[must_use]
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_dir: config
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
            sheet_name: config.sheet_name.clone(),
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Write into `dir` instead of the configured directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Directory files are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Timestamp format used for the first column.
    #[must_use]
    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Write `table` as a one-sheet workbook and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created, the table
    /// is too wide for a worksheet, or the workbook cannot be written.
    pub fn write(&self, table: &SheetTable) -> Result<PathBuf> {
        let too_large = || Error::SheetTooLarge {
            rows: table.row_count(),
            columns: table.column_count(),
        };
        if table.row_count() > MAX_ROWS || table.column_count() > MAX_COLUMNS {
            return Err(too_large());
        }

        if !self.output_dir.exists() {
            std::fs::create_dir_all(&self.output_dir).map_err(|source| {
                Error::DirectoryCreate {
                    path: self.output_dir.clone(),
                    source,
                }
            })?;
        }
        let path = self.output_dir.join(table.file_name());
        let xlsx_err = |source| Error::SpreadsheetWrite {
            path: path.clone(),
            source,
        };

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name).map_err(xlsx_err)?;

        for (r, row) in table.to_rows(&self.timestamp_format).iter().enumerate() {
            let r = u32::try_from(r).map_err(|_| too_large())?;
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c).map_err(|_| too_large())?;
                worksheet.write_string(r, c, cell).map_err(xlsx_err)?;
            }
        }

        debug!("Writing {} rows to {}", table.rows.len() + 1, path.display());
        workbook.save(&path).map_err(xlsx_err)?;
        info!("Exported {} responses to {}", table.rows.len(), path.display());
        Ok(path)
    }
}
