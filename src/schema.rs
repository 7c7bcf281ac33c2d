//! Schema checking for section properties.
//!
//! A schema is itself a Feedmark document. Each of its sections names one
//! property; a section carrying `* optional: true` makes that property
//! optional, every other one is required:
//!
//! ```text
//! Llama sighting
//! ==============
//!
//! ### date
//!
//! ### location
//!
//! ### excuse
//!
//! *   optional: true
//! ```
//!
//! The same document also fixes the order properties are written back out in
//! by the Markdown renderer. The two uses are exposed as separate views,
//! [`PropertyRules`] and [`PropertyOrder`].

use crate::model::{Document, Section};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyKind {
    Missing,
    Extra,
}

/// One schema violation, serialized as `["missing", "date"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy(pub DiscrepancyKind, pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub document: String,
    pub section: String,
    pub result: Vec<Discrepancy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PropertyRule {
    key: String,
    required: bool,
}

/// Which property keys a section may and must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyRules {
    rules: Vec<PropertyRule>,
}

/// Preferred display order of property keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOrder {
    keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    rules: PropertyRules,
    order: PropertyOrder,
}

impl Schema {
    pub fn from_document(document: &Document) -> Self {
        let mut rules = Vec::<PropertyRule>::new();
        for section in &document.sections {
            if rules.iter().any(|r| r.key == section.title) {
                continue;
            }
            let optional = section.properties.get_scalar("optional") == Some("true");
            rules.push(PropertyRule {
                key: section.title.clone(),
                required: !optional,
            });
        }
        let keys = rules.iter().map(|r| r.key.clone()).collect();
        Self {
            rules: PropertyRules { rules },
            order: PropertyOrder { keys },
        }
    }

    pub fn rules(&self) -> &PropertyRules {
        &self.rules
    }

    pub fn order(&self) -> &PropertyOrder {
        &self.order
    }
}

impl PropertyRules {
    pub fn allows(&self, key: &str) -> bool {
        self.rules.iter().any(|r| r.key == key)
    }

    /// Extras first, in the section's own property order, then missing
    /// required keys in schema order.
    pub fn check(&self, section: &Section) -> Vec<Discrepancy> {
        let extras = section
            .properties
            .keys()
            .filter(|key| !self.allows(key))
            .map(|key| Discrepancy(DiscrepancyKind::Extra, key.to_string()));
        let missing = self
            .rules
            .iter()
            .filter(|r| r.required && !section.properties.contains_key(&r.key))
            .map(|r| Discrepancy(DiscrepancyKind::Missing, r.key.clone()));
        extras.chain(missing).collect()
    }

    /// Reports for every section with at least one discrepancy.
    pub fn check_documents(&self, documents: &[Document]) -> Vec<SectionReport> {
        let mut reports = Vec::new();
        for document in documents {
            for section in &document.sections {
                let result = self.check(section);
                if !result.is_empty() {
                    reports.push(SectionReport {
                        document: document.title.clone(),
                        section: section.title.clone(),
                        result,
                    });
                }
            }
        }
        info!(
            documents = documents.len(),
            failing_sections = reports.len(),
            "schema check finished"
        );
        reports
    }
}

impl PropertyOrder {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}
