//! Quote catalog, selection and share formatting
//!
//! The catalog is a fixed list compiled into the binary and validated once
//! at startup. Selection never tracks what was shown last; callers pass the
//! currently displayed text with every request.

mod format;
mod selector;

pub use format::{DEFAULT_SHARE_LENGTH, ELLIPSIS, format_for_clipboard, format_for_social_share};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Quote list shipped with the binary
const EMBEDDED_QUOTES: &str = include_str!("../../quotes/quotes.json");

/// A single quotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Quotation body
    pub text: String,

    /// Attribution
    pub author: String,

    /// Short category labels
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuoteRecord {
    /// Create a record with no tags
    #[must_use]
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            tags: Vec::new(),
        }
    }

    /// Attach tags to the record
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the record carries the given tag (case-insensitive)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Validated, immutable quote list
#[derive(Debug, Clone)]
pub struct QuoteCatalog {
    records: Vec<QuoteRecord>,
}

impl QuoteCatalog {
    /// Build a catalog from records
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if the list is empty, a record has blank
    /// text or author, or two records share the same text
    pub fn new(records: Vec<QuoteRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::Catalog("quote list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.text.trim().is_empty() {
                return Err(Error::Catalog(format!("quote {index} has empty text")));
            }
            if record.author.trim().is_empty() {
                return Err(Error::Catalog(format!("quote {index} has empty author")));
            }
            // Selection relies on distinct texts to avoid repeats
            if !seen.insert(record.text.as_str()) {
                return Err(Error::Catalog(format!(
                    "quote {index} duplicates text of an earlier quote"
                )));
            }
        }

        Ok(Self { records })
    }

    /// Parse and validate a JSON array of quote records
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or fails validation
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<QuoteRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Load the quote list compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns error if the embedded list fails validation
    pub fn embedded() -> Result<Self> {
        let catalog = Self::from_json(EMBEDDED_QUOTES)?;
        tracing::debug!(count = catalog.len(), "loaded embedded quote catalog");
        Ok(catalog)
    }

    /// Number of quotes
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: an empty catalog cannot be constructed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All quotes in catalog order
    #[must_use]
    pub fn records(&self) -> &[QuoteRecord] {
        &self.records
    }

    /// Quotes carrying the given tag, in catalog order
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a QuoteRecord> + 'a {
        self.records.iter().filter(move |r| r.has_tag(tag))
    }
}
