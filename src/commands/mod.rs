//! CLI commands

pub mod corpus;
pub mod list;
pub mod new;
pub mod search;
pub mod toc;
