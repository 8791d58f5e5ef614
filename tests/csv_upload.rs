use std::fs;

use tempfile::tempdir;
use waterfall_tools::flow::{self, NODE_COLORS_MARKER};
use waterfall_tools::ingest::Ingestor;
use waterfall_tools::model::Record;
use waterfall_tools::session::Session;
use waterfall_tools::ToolError;

const FARM_CSV: &str = "\
Value,Target,Utility,Source
\"$1,200\",Total Revenue,National Grid,Array A

 50 ,Clipping Loss,National Grid,Array A
,Curtailment Lost,Eversource,Array B
300,Net Payment,Eversource,  Total Revenue
12,,Eversource,Array B
";

#[test]
fn csv_upload_builds_ordered_table_and_utilities() {
    let temp_dir = tempdir().expect("temporary directory");
    let csv_path = temp_dir.path().join("Farm.CSV");
    fs::write(&csv_path, FARM_CSV).expect("CSV written");

    let dataset = Ingestor::new().ingest_path(&csv_path).expect("CSV ingested");

    assert_eq!(
        dataset.records(),
        [
            Record::new("National Grid", "Array A", "Total Revenue", "1200"),
            Record::new("National Grid", "Array A", "Clipping Loss", "50"),
            Record::new("Eversource", "Array B", "Curtailment Lost", ""),
            Record::new("Eversource", "Total Revenue", "Net Payment", "300"),
        ]
    );
    assert_eq!(dataset.utilities(), ["Eversource", "National Grid"]);
}

#[test]
fn rendered_flows_follow_block_layout() {
    let mut session = Session::new(Ingestor::without_spreadsheets());
    session
        .load("farm.csv", FARM_CSV.as_bytes())
        .expect("CSV loaded");

    let utility = session.default_utility().expect("default utility").to_string();
    assert_eq!(utility, "Eversource");

    let expected = "\
// Nexamp Farm Waterfall Data
// Auto-generated from uploaded file

Total Revenue [300] Net Payment #16a34a

Array B [0] Curtailment Lost #dc2626

// Node Colors
:Curtailment Lost #dc2626 <<
:Total Revenue #16a34a >>
:Net Payment #16a34a >>";
    assert_eq!(session.render(&utility), expected);
}

#[test]
fn spec_example_utility_renders_expected_lines() {
    let csv = "Utility,Source,Target,Value\nU1,S1,T1,100\nU1,S1,Loss A,50\n";
    let dataset = Ingestor::without_spreadsheets()
        .ingest("flows.csv", csv.as_bytes())
        .expect("CSV ingested");

    let text = flow::format(&dataset, "U1");
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines.contains(&"S1 [100] T1 #16a34a"));
    assert!(lines.contains(&"S1 [50] Loss A #dc2626"));
    assert!(lines.contains(&":Loss A #dc2626 <<"));
    assert!(!lines.iter().any(|line| line.starts_with(":S1") || line.starts_with(":T1")));
    assert_eq!(
        lines.iter().filter(|line| **line == NODE_COLORS_MARKER).count(),
        1
    );
    assert_eq!(flow::format(&dataset, "U2"), flow::NO_ROWS_MESSAGE);
}

#[test]
fn path_errors_are_reported_in_order() {
    let temp_dir = tempdir().expect("temporary directory");
    let ingestor = Ingestor::new();

    let missing_txt = temp_dir.path().join("absent.txt");
    assert!(matches!(
        ingestor.ingest_path(&missing_txt),
        Err(ToolError::UnsupportedFileType(_))
    ));

    let missing_csv = temp_dir.path().join("absent.csv");
    assert!(matches!(
        ingestor.ingest_path(&missing_csv),
        Err(ToolError::MissingInput(_))
    ));

    let empty_csv = temp_dir.path().join("empty.csv");
    fs::write(&empty_csv, "Utility,Source,Target,Value\n").expect("CSV written");
    assert!(matches!(
        ingestor.ingest_path(&empty_csv),
        Err(ToolError::EmptySource)
    ));
}

#[test]
fn failed_reupload_keeps_loaded_table() {
    let temp_dir = tempdir().expect("temporary directory");
    let good = temp_dir.path().join("good.csv");
    let bad = temp_dir.path().join("bad.csv");
    fs::write(&good, FARM_CSV).expect("CSV written");
    fs::write(&bad, "Utility,Source,Target,Value\n,,,\n").expect("CSV written");

    let mut session = Session::default();
    session.load_path(&good).expect("first upload");
    let before = session.dataset().cloned().expect("dataset loaded");

    let error = session.load_path(&bad).expect_err("second upload fails");
    assert!(matches!(error, ToolError::NoValidRows));
    assert_eq!(session.dataset(), Some(&before));

    session.reset();
    assert!(session.dataset().is_none());
}
