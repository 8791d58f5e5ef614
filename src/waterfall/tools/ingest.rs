use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{info, instrument};

use crate::waterfall::tools::error::{Result, ToolError};
use crate::waterfall::tools::io::csv_read;
use crate::waterfall::tools::io::detect::{FileKind, detect_kind, detect_path_kind};
use crate::waterfall::tools::io::excel_read::{self, SpreadsheetDecoder};
use crate::waterfall::tools::model::{Dataset, Record};

/// Turns uploaded files into a [`Dataset`].
///
/// Spreadsheet support depends on the decoder handed over at construction.
/// Without one, delimited text still works and spreadsheet uploads fail with
/// [`ToolError::LibraryUnavailable`].
pub struct Ingestor {
    decoder: Option<Box<dyn SpreadsheetDecoder>>,
}

impl Ingestor {
    /// Creates an ingestor with the decoder compiled into this build, if any.
    pub fn new() -> Self {
        #[cfg(feature = "excel")]
        {
            Self::with_decoder(excel_read::CalamineDecoder)
        }
        #[cfg(not(feature = "excel"))]
        {
            Self::without_spreadsheets()
        }
    }

    /// Creates an ingestor that decodes spreadsheets with `decoder`.
    pub fn with_decoder(decoder: impl SpreadsheetDecoder + 'static) -> Self {
        Self {
            decoder: Some(Box::new(decoder)),
        }
    }

    /// Creates an ingestor that only accepts delimited text.
    pub fn without_spreadsheets() -> Self {
        Self { decoder: None }
    }

    pub fn supports_spreadsheets(&self) -> bool {
        self.decoder.is_some()
    }

    /// Parses the content of one uploaded file.
    ///
    /// The kind is taken from `file_name`; CSV content is decoded as UTF-8
    /// text, spreadsheets are handed to the decoder as raw bytes. Either the
    /// whole dataset is returned or an error, never a partial table.
    #[instrument(level = "info", skip(self, content), fields(bytes = content.len()))]
    pub fn ingest(&self, file_name: &str, content: &[u8]) -> Result<Dataset> {
        let kind = detect_kind(file_name)?;
        let records = match kind {
            FileKind::DelimitedText => {
                let text = String::from_utf8_lossy(content);
                csv_read::read_records(text.trim_start_matches('\u{feff}'))?
            }
            FileKind::Spreadsheet(format) => {
                let decoder = self
                    .decoder
                    .as_ref()
                    .ok_or(ToolError::LibraryUnavailable)?;
                let rows = decoder.decode(format, content)?;
                excel_read::read_records(&rows)?
            }
        };

        let dataset = Dataset::new(records);
        info!(
            ?kind,
            record_count = dataset.len(),
            utility_count = dataset.utilities().len(),
            "ingested upload"
        );
        Ok(dataset)
    }

    /// Reads and parses a file from disk. Unsupported suffixes are rejected
    /// before the file is opened.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub fn ingest_path(&self, path: &Path) -> Result<Dataset> {
        let kind = detect_path_kind(path)?;
        if kind.is_spreadsheet() && !self.supports_spreadsheets() {
            return Err(ToolError::LibraryUnavailable);
        }
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }

        let content = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest(&file_name, &content)
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ingestor")
            .field("supports_spreadsheets", &self.supports_spreadsheets())
            .finish()
    }
}

/// Strips dollar signs, commas and whitespace anywhere in `raw`.
pub fn clean_value(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '$' && *ch != ',' && !ch.is_whitespace())
        .collect()
}

/// Builds a record from raw field text, or `None` when utility, source or
/// target is missing or blank after trimming.
pub(crate) fn accept_row(
    utility: Option<&str>,
    source: Option<&str>,
    target: Option<&str>,
    value: Option<&str>,
) -> Option<Record> {
    let label = |field: Option<&str>| {
        field
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    Some(Record {
        utility: label(utility)?,
        source: label(source)?,
        target: label(target)?,
        value: value.map(clean_value).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waterfall::tools::io::detect::SpreadsheetFormat;
    use crate::waterfall::tools::model::SheetRecord;

    struct FixedRows(Vec<SheetRecord>);

    impl SpreadsheetDecoder for FixedRows {
        fn decode(&self, _format: SpreadsheetFormat, _bytes: &[u8]) -> Result<Vec<SheetRecord>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn value_cleanup_strips_currency_noise() {
        assert_eq!(clean_value(" $1,234 "), "1234");
        assert_eq!(clean_value("1 234.50\t"), "1234.50");
    }

    #[test]
    fn value_cleanup_is_idempotent() {
        let once = clean_value("$12,345.67");
        assert_eq!(clean_value(&once), once);
        assert_eq!(clean_value("1234"), "1234");
    }

    #[test]
    fn accept_row_trims_labels() {
        let record = accept_row(Some(" U "), Some("S\t"), Some(" T"), Some("$5"))
            .expect("row accepted");
        assert_eq!(record, Record::new("U", "S", "T", "5"));
        assert!(accept_row(Some("U"), Some("  "), Some("T"), None).is_none());
        assert!(accept_row(Some("U"), Some("S"), None, Some("1")).is_none());
    }

    #[test]
    fn unsupported_suffix_is_rejected_before_reading() {
        let ingestor = Ingestor::without_spreadsheets();
        assert!(matches!(
            ingestor.ingest("flows.json", b"{}"),
            Err(ToolError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn spreadsheet_without_decoder_is_unavailable() {
        let ingestor = Ingestor::without_spreadsheets();
        assert!(!ingestor.supports_spreadsheets());
        assert!(matches!(
            ingestor.ingest("farm.xlsx", &[0x50, 0x4b]),
            Err(ToolError::LibraryUnavailable)
        ));
    }

    #[test]
    fn injected_decoder_feeds_the_dataset() {
        let rows = vec![
            [("Utility", "B"), ("Source", "S"), ("Target", "T"), ("Value", "1")],
            [("Utility", "A"), ("Source", "S"), ("Target", "T"), ("Value", "2")],
        ]
        .into_iter()
        .map(|cells| {
            cells
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect::<SheetRecord>()
        })
        .collect();

        let dataset = Ingestor::with_decoder(FixedRows(rows))
            .ingest("farm.XLS", b"ignored")
            .expect("dataset built");

        assert_eq!(dataset.utilities(), ["A", "B"]);
        assert_eq!(dataset.records()[0].utility, "B");
    }

    #[test]
    fn csv_byte_order_mark_is_ignored() {
        let content = "\u{feff}Utility,Source,Target,Value\nU,S,T,1\n";
        let dataset = Ingestor::without_spreadsheets()
            .ingest("flows.csv", content.as_bytes())
            .expect("dataset built");
        assert_eq!(dataset.records(), [Record::new("U", "S", "T", "1")]);
    }
}
