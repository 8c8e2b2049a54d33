//! Helper functions shared by templates, the search module and the CLI

mod date;
mod url;

pub use date::*;
pub use url::*;
