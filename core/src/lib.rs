pub mod cli;
pub mod error;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod tree;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::report::{StudyReport, TreeReport};
pub use error::{ParseFailure, Result, RtLinkError};
pub use ingest::{ingest, ingest_paths, Batch, IgnoredFile, SourceFile};
pub use model::{Instance, Series, Study, StudyDictionary};
pub use parser::{parse_bytes, ParseOutcome, ParsedFile};
pub use resolver::ReferenceResolver;
pub use tree::{DisplayNode, DisplayTree, ReferenceTree, TreeBuilder, TreeNode};
pub use types::*;
pub use validation::validate;
