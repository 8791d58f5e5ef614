//! Rendering of one utility's records as flow-description text.
//!
//! Each line `SOURCE [AMOUNT] TARGET #COLOR` describes one edge; lines starting
//! with `:` set a node's colour and alignment. The layout (header, revenue
//! edges, loss edges, node directives, separated by blank lines) is relied on
//! by the renderer and by tools that diff the output, so it must stay stable.

use std::collections::HashSet;

use crate::waterfall::tools::model::{Dataset, Record};

/// Colour of revenue and other non-loss edges and nodes.
pub const REVENUE_COLOR: &str = "#16a34a";
/// Colour of loss edges and nodes.
pub const LOSS_COLOR: &str = "#dc2626";
/// Comment introducing the node directive block.
pub const NODE_COLORS_MARKER: &str = "// Node Colors";
/// Returned when the selected utility has no rows.
pub const NO_ROWS_MESSAGE: &str = "No data for selected utility.";
/// Returned when no utility is selected.
pub const SELECT_PROMPT: &str = "Please select a utility.";

const HEADER: [&str; 2] = [
    "// Nexamp Farm Waterfall Data",
    "// Auto-generated from uploaded file",
];

const LOSS_MARKERS: [&str; 2] = ["loss", "lost"];
const REVENUE_MARKERS: [&str; 3] = ["revenue", "total", "payment"];

/// Whether a label denotes a loss: it contains `loss` or `lost` in any case.
pub fn is_loss_label(label: &str) -> bool {
    contains_any(label, &LOSS_MARKERS)
}

/// Whether a label denotes revenue: it contains `revenue`, `total` or
/// `payment` in any case.
pub fn is_revenue_label(label: &str) -> bool {
    contains_any(label, &REVENUE_MARKERS)
}

fn contains_any(label: &str, markers: &[&str]) -> bool {
    let lower = label.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker))
}

/// A source to target flow with its rendered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub amount: &'a str,
}

impl<'a> FlowEdge<'a> {
    fn from_record(record: &'a Record) -> Self {
        Self {
            source: &record.source,
            target: &record.target,
            amount: record.amount(),
        }
    }

    fn render(&self, color: &str) -> String {
        format!("{} [{}] {} {color}", self.source, self.amount, self.target)
    }
}

/// Edges of one utility split by their target label, each side keeping the
/// order of the input rows, plus every label seen in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowPartition<'a> {
    pub revenue: Vec<FlowEdge<'a>>,
    pub losses: Vec<FlowEdge<'a>>,
    pub nodes: Vec<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> FlowPartition<'a> {
    /// Splits `records` into revenue and loss edges and collects the node set.
    pub fn from_records(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut partition = Self::default();

        for record in records {
            partition.add_node(&record.source);
            partition.add_node(&record.target);

            let edge = FlowEdge::from_record(record);
            if is_loss_label(edge.target) {
                partition.losses.push(edge);
            } else {
                partition.revenue.push(edge);
            }
        }

        partition
    }

    fn add_node(&mut self, label: &'a str) {
        if self.seen.insert(label) {
            self.nodes.push(label);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty() && self.losses.is_empty()
    }

    /// Serialises the partition into the flow-description text.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = HEADER.iter().map(|line| line.to_string()).collect();
        lines.push(String::new());

        lines.extend(self.revenue.iter().map(|edge| edge.render(REVENUE_COLOR)));
        lines.push(String::new());

        lines.extend(self.losses.iter().map(|edge| edge.render(LOSS_COLOR)));
        lines.push(String::new());

        lines.push(NODE_COLORS_MARKER.to_string());
        lines.extend(self.nodes.iter().filter_map(|node| node_directive(node)));

        lines.join("\n")
    }
}

/// Colour and alignment directive for a node: loss nodes go red and to the
/// bottom, revenue nodes green and to the top, anything else gets none.
pub fn node_directive(label: &str) -> Option<String> {
    if is_loss_label(label) {
        Some(format!(":{label} {LOSS_COLOR} <<"))
    } else if is_revenue_label(label) {
        Some(format!(":{label} {REVENUE_COLOR} >>"))
    } else {
        None
    }
}

/// Renders flow text for already filtered records.
pub fn render_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    FlowPartition::from_records(records).render()
}

/// Renders the flows of `utility` (exact match). An empty selection yields
/// [`SELECT_PROMPT`] and a utility without rows yields [`NO_ROWS_MESSAGE`].
pub fn format(dataset: &Dataset, utility: &str) -> String {
    if utility.is_empty() {
        return SELECT_PROMPT.to_string();
    }

    let partition = FlowPartition::from_records(dataset.records_for(utility));
    if partition.is_empty() {
        return NO_ROWS_MESSAGE.to_string();
    }
    partition.render()
}
