//! Summary domain - Prompting, parsing and report types

mod entity;
pub mod parser;
pub mod prompt;

pub use entity::{ReviewSnapshot, Sentiment, SnapshotReport, Summary};
pub use prompt::{version_tag, PROMPT_VERSION};
