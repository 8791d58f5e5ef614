use tracing::debug;

use crate::waterfall::tools::error::{Result, ToolError};
use crate::waterfall::tools::ingest::accept_row;
use crate::waterfall::tools::io::detect::SpreadsheetFormat;
use crate::waterfall::tools::model::{Column, Record, SheetRecord};

/// Turns the raw bytes of a workbook into associative rows.
///
/// `format` is the container implied by the file name; implementations may
/// prefer what the bytes themselves declare. They read the first worksheet,
/// take its first row as header keys and produce one [`SheetRecord`] per
/// non-blank data row, with blank cells defaulting to an empty string.
pub trait SpreadsheetDecoder: Send + Sync {
    fn decode(&self, format: SpreadsheetFormat, bytes: &[u8]) -> Result<Vec<SheetRecord>>;
}

/// Maps decoded spreadsheet rows onto records.
///
/// Column lookup happens per row, so a row without one of the required keys
/// is skipped like any other incomplete row.
pub fn read_records(rows: &[SheetRecord]) -> Result<Vec<Record>> {
    if rows.is_empty() {
        return Err(ToolError::EmptySource);
    }

    let records: Vec<Record> = rows
        .iter()
        .filter_map(|row| {
            accept_row(
                row.get(Column::Utility),
                row.get(Column::Source),
                row.get(Column::Target),
                row.get(Column::Value),
            )
        })
        .collect();

    debug!(
        accepted = records.len(),
        skipped = rows.len() - records.len(),
        "parsed spreadsheet rows"
    );

    if records.is_empty() {
        return Err(ToolError::NoValidRows);
    }
    Ok(records)
}

#[cfg(feature = "excel")]
pub use calamine_decoder::CalamineDecoder;

#[cfg(feature = "excel")]
mod calamine_decoder {
    use std::io::Cursor;

    use calamine::{DataType, Range, Reader, Xls, Xlsx};
    use tracing::debug;

    use super::SpreadsheetDecoder;
    use crate::waterfall::tools::error::{Result, ToolError};
    use crate::waterfall::tools::io::detect::{SpreadsheetFormat, sniff_format};
    use crate::waterfall::tools::model::SheetRecord;

    /// [`SpreadsheetDecoder`] backed by calamine, covering `.xlsx` and `.xls`.
    /// The reader is chosen from the file signature, falling back to the
    /// suffix-derived format when the signature is unknown.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct CalamineDecoder;

    impl SpreadsheetDecoder for CalamineDecoder {
        fn decode(&self, format: SpreadsheetFormat, bytes: &[u8]) -> Result<Vec<SheetRecord>> {
            let format = match sniff_format(bytes) {
                Some(sniffed) if sniffed != format => {
                    debug!(?format, ?sniffed, "file suffix disagrees with workbook signature");
                    sniffed
                }
                _ => format,
            };

            let cursor = Cursor::new(bytes.to_vec());
            let range = match format {
                SpreadsheetFormat::Xlsx => {
                    let mut workbook: Xlsx<_> = Xlsx::new(cursor).map_err(parse_failure)?;
                    workbook
                        .worksheet_range_at(0)
                        .transpose()
                        .map_err(parse_failure)?
                }
                SpreadsheetFormat::Xls => {
                    let mut workbook: Xls<_> = Xls::new(cursor).map_err(parse_failure)?;
                    workbook
                        .worksheet_range_at(0)
                        .transpose()
                        .map_err(parse_failure)?
                }
            };

            Ok(range.map(|range| sheet_records(&range)).unwrap_or_default())
        }
    }

    fn sheet_records(range: &Range<DataType>) -> Vec<SheetRecord> {
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(first_row) => first_row
                .iter()
                .map(|cell| cell_to_string(Some(cell)).trim().to_string())
                .collect(),
            None => return Vec::new(),
        };

        rows.filter(|row| row.iter().any(|cell| !matches!(cell, DataType::Empty)))
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| !header.is_empty())
                    .map(|(col_idx, header)| (header.clone(), cell_to_string(row.get(col_idx))))
                    .collect()
            })
            .collect()
    }

    fn cell_to_string(cell: Option<&DataType>) -> String {
        match cell {
            Some(DataType::String(value)) => value.clone(),
            Some(DataType::Float(value)) => value.to_string(),
            Some(DataType::Int(value)) => value.to_string(),
            Some(DataType::Bool(value)) => value.to_string(),
            Some(DataType::Empty) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn parse_failure(error: impl std::fmt::Display) -> ToolError {
        ToolError::ParseFailure(error.to_string())
    }
}
