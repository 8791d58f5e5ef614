use std::collections::BTreeSet;

use serde::Serialize;

/// The four logical columns every uploaded sheet has to provide. Lookup is
/// case-insensitive and independent of the physical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Utility,
    Source,
    Target,
    Value,
}

impl Column {
    /// All required columns in their canonical order.
    pub const ALL: [Column; 4] = [Column::Utility, Column::Source, Column::Target, Column::Value];

    /// Canonical header spelling used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Column::Utility => "Utility",
            Column::Source => "Source",
            Column::Target => "Target",
            Column::Value => "Value",
        }
    }

    /// Returns `true` when `header` names this column, ignoring case and
    /// surrounding whitespace.
    pub fn matches(self, header: &str) -> bool {
        header.trim().eq_ignore_ascii_case(self.name())
    }
}

/// One accepted row of the uploaded sheet.
///
/// `utility`, `source` and `target` are trimmed and never empty. `value` has
/// currency symbols, thousands separators and whitespace stripped and may be
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub utility: String,
    pub source: String,
    pub target: String,
    pub value: String,
}

impl Record {
    /// Creates a record from already cleaned fields.
    pub fn new(
        utility: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            utility: utility.into(),
            source: source.into(),
            target: target.into(),
            value: value.into(),
        }
    }

    /// The flow amount: the cleaned value, or `"0"` when it is empty.
    pub fn amount(&self) -> &str {
        if self.value.is_empty() {
            "0"
        } else {
            &self.value
        }
    }
}

/// The table produced by one successful upload together with the sorted set
/// of distinct utilities it contains. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    records: Vec<Record>,
    utilities: Vec<String>,
}

impl Dataset {
    /// Builds a dataset from records in source order, deriving the utility set.
    pub fn new(records: Vec<Record>) -> Self {
        let utilities: BTreeSet<&str> = records.iter().map(|r| r.utility.as_str()).collect();
        let utilities = utilities.into_iter().map(str::to_string).collect();
        Self { records, utilities }
    }

    /// Records in the order they were encountered in the source file.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct utility names, sorted lexicographically.
    pub fn utilities(&self) -> &[String] {
        &self.utilities
    }

    /// Records whose utility equals `utility` exactly (case-sensitive).
    pub fn records_for<'a>(&'a self, utility: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |record| record.utility == utility)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One spreadsheet row as an associative record: header text to cell text, in
/// header order. Header casing is whatever the sheet author used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRecord {
    cells: Vec<(String, String)>,
}

impl SheetRecord {
    /// Value of the first header matching `column`, if any.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells
            .iter()
            .find(|(header, _)| column.matches(header))
            .map(|(_, value)| value.as_str())
    }
}

impl FromIterator<(String, String)> for SheetRecord {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
