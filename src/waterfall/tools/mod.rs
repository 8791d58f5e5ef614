pub mod error;
pub mod flow;
pub mod ingest;
pub mod io;
pub mod model;
pub mod session;

pub use error::{Result, ToolError};
