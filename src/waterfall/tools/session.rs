use std::path::Path;

use tracing::{info, instrument, warn};

use crate::waterfall::tools::error::Result;
use crate::waterfall::tools::flow;
use crate::waterfall::tools::ingest::Ingestor;
use crate::waterfall::tools::model::Dataset;

/// Holds the dataset of the current upload.
///
/// A session owns at most one dataset. Loading replaces it only when the new
/// file parses successfully; a failed load leaves the previous one in place.
#[derive(Debug, Default)]
pub struct Session {
    ingestor: Ingestor,
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor,
            dataset: None,
        }
    }

    /// Parses an uploaded file and makes it the current dataset.
    #[instrument(level = "info", skip(self, content), fields(bytes = content.len()))]
    pub fn load(&mut self, file_name: &str, content: &[u8]) -> Result<&Dataset> {
        let parsed = self.ingestor.ingest(file_name, content);
        self.commit(parsed)
    }

    /// Reads a file from disk and makes it the current dataset.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub fn load_path(&mut self, path: &Path) -> Result<&Dataset> {
        let parsed = self.ingestor.ingest_path(path);
        self.commit(parsed)
    }

    fn commit(&mut self, parsed: Result<Dataset>) -> Result<&Dataset> {
        match parsed {
            Ok(dataset) => {
                info!(
                    record_count = dataset.len(),
                    utility_count = dataset.utilities().len(),
                    "dataset replaced"
                );
                Ok(&*self.dataset.insert(dataset))
            }
            Err(error) => {
                warn!(%error, retained = self.dataset.is_some(), "load failed");
                Err(error)
            }
        }
    }

    /// Discards the current dataset.
    pub fn reset(&mut self) {
        self.dataset = None;
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Sorted utility names of the current dataset; empty when nothing is loaded.
    pub fn utilities(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(Dataset::utilities)
            .unwrap_or_default()
    }

    /// The utility selected right after a load: the first in sorted order.
    pub fn default_utility(&self) -> Option<&str> {
        self.utilities().first().map(String::as_str)
    }

    /// Flow text for `utility`. Without a dataset this is the "no rows"
    /// message, like any utility that has no rows.
    pub fn render(&self, utility: &str) -> String {
        match &self.dataset {
            Some(dataset) => flow::format(dataset, utility),
            None if utility.is_empty() => flow::SELECT_PROMPT.to_string(),
            None => flow::NO_ROWS_MESSAGE.to_string(),
        }
    }
}
