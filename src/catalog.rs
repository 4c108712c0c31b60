use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

use crate::recognizer::ExtractedUnit;

/// Template language; messages are untranslated
pub const LANGUAGE: &str = "C";
pub const CHARSET: &str = "utf-8";
pub const PLURAL_FORMS: &str = "nplurals=2; plural=(n != 1);";

/// Where a message was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file: String,
    pub line: usize,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// All occurrences of one `(msgctxt, msgid)` pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEntry {
    pub msgid_plural: Option<String>,
    pub references: Vec<Reference>,
}

/// Borrowed view of an entry together with its key
#[derive(Debug, Clone, Copy)]
pub struct CatalogMessage<'c> {
    pub msgctxt: &'c str,
    pub msgid: &'c str,
    pub entry: &'c MessageEntry,
}

/// Document-level metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHeaders {
    /// Used for both the creation and the revision date
    pub created_at: DateTime<Utc>,
}

/// Messages keyed by context, then msgid, iterated in first-seen order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub headers: CatalogHeaders,
    contexts: HashMap<String, HashMap<String, MessageEntry>>,
    order: Vec<(String, String)>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    pub fn with_timestamp(created_at: DateTime<Utc>) -> Self {
        Self {
            headers: CatalogHeaders { created_at },
            contexts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Fold one source unit's messages into the catalog.
    ///
    /// Takes the whole list at once so a unit's messages are never
    /// interleaved with another unit's.
    pub fn merge_unit(&mut self, file: &str, units: &[ExtractedUnit]) {
        for unit in units {
            self.add(file, unit);
        }
    }

    fn add(&mut self, file: &str, unit: &ExtractedUnit) {
        let messages = self.contexts.entry(unit.msgctxt.clone()).or_default();
        if !messages.contains_key(&unit.msgid) {
            self.order.push((unit.msgctxt.clone(), unit.msgid.clone()));
        }
        let entry = messages.entry(unit.msgid.clone()).or_default();
        entry.references.push(Reference {
            file: file.to_string(),
            line: unit.line,
        });
        if entry.msgid_plural.is_none() {
            entry.msgid_plural.clone_from(&unit.msgid_plural);
        }
    }

    pub fn get(&self, msgctxt: &str, msgid: &str) -> Option<&MessageEntry> {
        self.contexts.get(msgctxt)?.get(msgid)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in the order their key was first merged
    pub fn messages(&self) -> impl Iterator<Item = CatalogMessage<'_>> + '_ {
        self.order.iter().filter_map(move |(msgctxt, msgid)| {
            let entry = self.get(msgctxt, msgid)?;
            Some(CatalogMessage {
                msgctxt: msgctxt.as_str(),
                msgid: msgid.as_str(),
                entry,
            })
        })
    }
}
