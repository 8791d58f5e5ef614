//! Core library for the waterfall-tools command line application.
//!
//! The library turns an uploaded CSV or Excel sheet of `Utility, Source,
//! Target, Value` rows into the flow-description text consumed by a Sankey
//! style renderer. Readers live under [`waterfall::tools::io`], the record
//! types inside [`waterfall::tools::model`], the dispatch between readers in
//! [`waterfall::tools::ingest`], the text rendering in [`waterfall::tools::flow`]
//! and the loaded-dataset lifecycle under [`waterfall::tools::session`].

pub mod waterfall;

pub use waterfall::tools::{Result, ToolError, error, flow, ingest, io, model, session};
