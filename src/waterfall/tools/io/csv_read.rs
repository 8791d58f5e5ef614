use tracing::debug;

use crate::waterfall::tools::error::{Result, ToolError};
use crate::waterfall::tools::ingest::accept_row;
use crate::waterfall::tools::model::{Column, Record};

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub utility: usize,
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

impl ColumnIndices {
    /// Locates each required column by case-insensitive name. The first
    /// matching header wins.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let find = |column: Column| headers.iter().position(|header| column.matches(header));

        match (
            find(Column::Utility),
            find(Column::Source),
            find(Column::Target),
            find(Column::Value),
        ) {
            (Some(utility), Some(source), Some(target), Some(value)) => Ok(Self {
                utility,
                source,
                target,
                value,
            }),
            _ => {
                let missing = Column::ALL
                    .into_iter()
                    .filter(|column| find(*column).is_none())
                    .map(|column| column.name().to_string())
                    .collect();
                Err(ToolError::MissingColumns(missing))
            }
        }
    }
}

/// Reads records from comma separated text.
///
/// The first non-empty line is the header row; every later non-empty line is
/// a data row. Rows lacking a utility, source or target are skipped.
pub fn read_records(text: &str) -> Result<Vec<Record>> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(ToolError::EmptySource);
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|header| header.trim().to_string())
        .collect();
    let indices = ColumnIndices::resolve(&headers)?;
    debug!(?indices, column_count = headers.len(), "resolved header columns");

    let mut records = Vec::with_capacity(lines.len() - 1);
    let mut skipped = 0usize;

    for line in &lines[1..] {
        let fields = split_line(line);
        let field = |index: usize| fields.get(index).map(String::as_str);

        match accept_row(
            field(indices.utility),
            field(indices.source),
            field(indices.target),
            field(indices.value),
        ) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(accepted = records.len(), skipped, "parsed delimited rows");

    if records.is_empty() {
        return Err(ToolError::NoValidRows);
    }
    Ok(records)
}

/// Splits one line on commas, honouring double-quoted fields.
///
/// Each `"` toggles quoted mode and is dropped from the output; commas inside
/// quotes are kept. There is no escape sequence, so `""` closes and reopens a
/// quoted section.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_commas_stay_in_field() {
        assert_eq!(split_line(r#"a,"b,c",d"#), ["a", "b,c", "d"]);
    }

    #[test]
    fn doubled_quotes_are_two_toggles() {
        assert_eq!(split_line(r#"a,"x""y,z",b"#), ["a", "xy,z", "b"]);
    }

    #[test]
    fn trailing_comma_yields_empty_field() {
        assert_eq!(split_line("a,b,"), ["a", "b", ""]);
    }

    #[test]
    fn headers_resolve_in_any_order() {
        let headers: Vec<String> = ["Value", "Target", "utility", "SOURCE"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let indices = ColumnIndices::resolve(&headers).expect("columns resolved");
        assert_eq!(
            indices,
            ColumnIndices {
                utility: 2,
                source: 3,
                target: 1,
                value: 0,
            }
        );
    }

    #[test]
    fn missing_columns_are_named() {
        let headers: Vec<String> = ["Utility", "Source"].iter().map(|h| h.to_string()).collect();

        match ColumnIndices::resolve(&headers) {
            Err(ToolError::MissingColumns(missing)) => assert_eq!(missing, ["Target", "Value"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn header_only_source_is_empty() {
        assert!(matches!(
            read_records("Utility,Source,Target,Value\n\n  \n"),
            Err(ToolError::EmptySource)
        ));
    }

    #[test]
    fn rows_without_labels_are_dropped() {
        let text = "Utility,Source,Target,Value\r\n\
                    U1, Farm ,Revenue,\"$1,200\"\r\n\
                    U1,,Revenue,5\r\n\
                    U1,Farm\r\n\
                    U2,Farm,Lost Output,\r\n";

        let records = read_records(text).expect("records parsed");
        assert_eq!(
            records,
            vec![
                Record::new("U1", "Farm", "Revenue", "1200"),
                Record::new("U2", "Farm", "Lost Output", ""),
            ]
        );
    }

    #[test]
    fn all_rows_rejected_is_an_error() {
        assert!(matches!(
            read_records("Utility,Source,Target,Value\n,a,b,1\nU,,b,2"),
            Err(ToolError::NoValidRows)
        ));
    }

    #[test]
    fn missing_header_fails_before_rows_are_read() {
        assert!(matches!(
            read_records("Utility,Source,Amount\nU,S,T"),
            Err(ToolError::MissingColumns(_))
        ));
    }
}
