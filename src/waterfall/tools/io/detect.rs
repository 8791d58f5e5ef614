use std::path::Path;

use crate::waterfall::tools::error::{Result, ToolError};

/// Spreadsheet container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// Legacy binary workbook (`.xls`).
    Xls,
}

/// How the content of an uploaded file has to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Comma separated text, read as a decoded string.
    DelimitedText,
    /// Binary workbook, read as raw bytes.
    Spreadsheet(SpreadsheetFormat),
}

impl FileKind {
    /// Whether the content is a binary workbook rather than text.
    pub fn is_spreadsheet(self) -> bool {
        matches!(self, FileKind::Spreadsheet(_))
    }
}

/// Classifies an upload by the suffix of its file name, ignoring case.
pub fn detect_kind(file_name: &str) -> Result<FileKind> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".csv") {
        Ok(FileKind::DelimitedText)
    } else if lower.ends_with(".xlsx") {
        Ok(FileKind::Spreadsheet(SpreadsheetFormat::Xlsx))
    } else if lower.ends_with(".xls") {
        Ok(FileKind::Spreadsheet(SpreadsheetFormat::Xls))
    } else {
        Err(ToolError::UnsupportedFileType(file_name.to_string()))
    }
}

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const OLE_MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

/// Identifies the workbook container from its leading bytes: a zip archive is
/// `.xlsx`, an OLE compound file is `.xls`. Returns `None` for anything else.
pub fn sniff_format(bytes: &[u8]) -> Option<SpreadsheetFormat> {
    if bytes.starts_with(&ZIP_MAGIC) {
        Some(SpreadsheetFormat::Xlsx)
    } else if bytes.starts_with(&OLE_MAGIC) {
        Some(SpreadsheetFormat::Xls)
    } else {
        None
    }
}

/// Classifies a path by its final component.
pub fn detect_path_kind(path: &Path) -> Result<FileKind> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    detect_kind(&name)
}
