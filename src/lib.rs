//! Namesearch - nickname-aware name search
//!
//! Expands a queried name into nickname and spelling variants with a language
//! model, composes a filtered full-syntax query over the variants, runs it
//! against a document index and normalizes the hits into stable summaries.
//! The language model and the index are capability traits supplied by the
//! caller.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod search;

pub use error::{NamesearchError, Result};
