//! Outcome classification.
//!
//! Maps the free-text `outcome_category` column onto a closed set of tags
//! used to colour calendar events. The column is advisory: unknown text is
//! tagged `unclassified` and never interrupts the pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::schema::{COLOR_TAG, OUTCOME_CATEGORY, tag_categorical};
use crate::utils::arrow::{cell_text, optional_column, upsert_column};

/// Semantic outcome of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    /// The patient was seen
    Attended,
    /// The patient did not show up
    PatientAbsent,
    /// The professional did not show up
    ProfessionalAbsent,
    /// No synonym matched
    Unclassified,
}

impl OutcomeCategory {
    /// Every tag, in display order
    pub const ALL: [Self; 4] = [
        Self::Attended,
        Self::PatientAbsent,
        Self::ProfessionalAbsent,
        Self::Unclassified,
    ];

    /// Tag text stored in the `color_tag` column
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::PatientAbsent => "patient_absent",
            Self::ProfessionalAbsent => "professional_absent",
            Self::Unclassified => "unclassified",
        }
    }

    /// Calendar colours for this tag
    #[must_use]
    pub const fn palette(&self) -> EventColors {
        match self {
            Self::Attended => EventColors {
                background: "#2e7d32",
                border: "#1b5e20",
            },
            Self::PatientAbsent => EventColors {
                background: "#f9a825",
                border: "#f57f17",
            },
            Self::ProfessionalAbsent => EventColors {
                background: "#c62828",
                border: "#8e0000",
            },
            Self::Unclassified => EventColors {
                background: "#607d8b",
                border: "#455a64",
            },
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeCategory {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| ScheduleError::Config(format!("unknown outcome category '{s}'")))
    }
}

/// Background and border colour of a calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventColors {
    /// Fill colour
    pub background: &'static str,
    /// Outline colour
    pub border: &'static str,
}

/// Built-in outcome synonyms, keyed by lower-case text
const DEFAULT_SYNONYMS: &[(&str, OutcomeCategory)] = &[
    ("atendido", OutcomeCategory::Attended),
    ("attended", OutcomeCategory::Attended),
    ("presente", OutcomeCategory::Attended),
    ("compareceu", OutcomeCategory::Attended),
    ("paciente", OutcomeCategory::PatientAbsent),
    ("falta paciente", OutcomeCategory::PatientAbsent),
    ("falta do paciente", OutcomeCategory::PatientAbsent),
    ("patient", OutcomeCategory::PatientAbsent),
    ("patient absent", OutcomeCategory::PatientAbsent),
    ("no-show", OutcomeCategory::PatientAbsent),
    ("profissional", OutcomeCategory::ProfessionalAbsent),
    ("falta profissional", OutcomeCategory::ProfessionalAbsent),
    ("falta do profissional", OutcomeCategory::ProfessionalAbsent),
    ("professional", OutcomeCategory::ProfessionalAbsent),
    ("professional absent", OutcomeCategory::ProfessionalAbsent),
];

/// Exact-match lookup table from outcome text to category
#[derive(Debug, Clone)]
pub struct CategorySynonyms {
    map: FxHashMap<String, OutcomeCategory>,
}

impl Default for CategorySynonyms {
    fn default() -> Self {
        let map = DEFAULT_SYNONYMS
            .iter()
            .map(|(text, category)| ((*text).to_string(), *category))
            .collect();
        Self { map }
    }
}

impl CategorySynonyms {
    /// Add or override a synonym
    pub fn insert(&mut self, text: &str, category: OutcomeCategory) {
        self.map.insert(text.trim().to_lowercase(), category);
    }

    /// Classify one outcome text; unmatched or empty text is `Unclassified`
    #[must_use]
    pub fn classify(&self, text: &str) -> OutcomeCategory {
        let key = text.trim().to_lowercase();
        match self.map.get(&key) {
            Some(category) => *category,
            None => {
                if !key.is_empty() {
                    log::debug!("Unrecognized outcome '{text}', tagging as unclassified");
                }
                OutcomeCategory::Unclassified
            }
        }
    }
}

/// Append a categorical `color_tag` column derived from `outcome_category`
///
/// The `outcome_category` field itself is tagged categorical as well. Tables
/// without the column get `unclassified` on every row.
pub fn classify_batch(batch: &RecordBatch, synonyms: &CategorySynonyms) -> Result<RecordBatch> {
    let outcomes = optional_column(batch, OUTCOME_CATEGORY);

    let tags: Vec<&'static str> = (0..batch.num_rows())
        .map(|row| {
            outcomes
                .as_ref()
                .and_then(|col| cell_text(col, row))
                .map_or(OutcomeCategory::Unclassified, |text| synonyms.classify(&text))
                .as_str()
        })
        .collect();

    let mut batch = batch.clone();
    if let Some(outcome_col) = outcomes {
        let schema = batch.schema();
        let field = schema.field_with_name(OUTCOME_CATEGORY)?.clone();
        batch = upsert_column(&batch, tag_categorical(field), outcome_col)?;
    }

    let tag_array: ArrayRef = Arc::new(StringArray::from(tags));
    let tag_field = tag_categorical(Field::new(COLOR_TAG, DataType::Utf8, false));
    upsert_column(&batch, tag_field, tag_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_default_synonyms() {
        let synonyms = CategorySynonyms::default();
        assert_eq!(synonyms.classify("Atendido"), OutcomeCategory::Attended);
        assert_eq!(synonyms.classify(" Paciente "), OutcomeCategory::PatientAbsent);
        assert_eq!(
            synonyms.classify("FALTA PROFISSIONAL"),
            OutcomeCategory::ProfessionalAbsent
        );
    }

    #[test]
    fn test_unknown_text_is_unclassified() {
        let synonyms = CategorySynonyms::default();
        assert_eq!(synonyms.classify("remarcado"), OutcomeCategory::Unclassified);
        assert_eq!(synonyms.classify(""), OutcomeCategory::Unclassified);
        // Exact match only
        assert_eq!(synonyms.classify("atendido parcialmente"), OutcomeCategory::Unclassified);
    }

    #[test]
    fn test_tag_round_trip_through_str() {
        for category in OutcomeCategory::ALL {
            assert_eq!(category.as_str().parse::<OutcomeCategory>().unwrap(), category);
        }
        assert!("late".parse::<OutcomeCategory>().is_err());
    }
}
