//! Header normalization.
//!
//! Lower-cases and trims every header, maps known Portuguese and English
//! spellings onto canonical attribute names and verifies that the required
//! attributes are present before any later stage runs.

use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, ScheduleError};
use crate::schema::{
    DATE, DESCRIPTION, DURATION_MINUTES, OUTCOME_CATEGORY, PATIENT, PROFESSIONAL,
    REQUIRED_COLUMNS, SECTOR, START_TIME,
};
use crate::utils::arrow::batch_with_row_count;

/// Built-in header synonyms, keyed by lower-case raw name
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("data", DATE),
    ("hora", START_TIME),
    ("horario", START_TIME),
    ("horário", START_TIME),
    ("time", START_TIME),
    ("profissional", PROFESSIONAL),
    ("atendido", PATIENT),
    ("paciente", PATIENT),
    ("observações", DESCRIPTION),
    ("observacoes", DESCRIPTION),
    ("observação", DESCRIPTION),
    ("observacao", DESCRIPTION),
    ("notes", DESCRIPTION),
    ("tipo falta", OUTCOME_CATEGORY),
    ("tipo_falta", OUTCOME_CATEGORY),
    ("outcome", OUTCOME_CATEGORY),
    ("status", OUTCOME_CATEGORY),
    ("setor", SECTOR),
    ("duração_minutos", DURATION_MINUTES),
    ("duracao_minutos", DURATION_MINUTES),
    ("duração", DURATION_MINUTES),
    ("duracao", DURATION_MINUTES),
    ("duration", DURATION_MINUTES),
];

/// Mapping from raw header spellings to canonical attribute names
#[derive(Debug, Clone)]
pub struct ColumnSynonyms {
    map: FxHashMap<String, String>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        let map = DEFAULT_SYNONYMS
            .iter()
            .map(|(raw, canonical)| ((*raw).to_string(), (*canonical).to_string()))
            .collect();
        Self { map }
    }
}

impl ColumnSynonyms {
    /// Create an empty table; every header passes through lower-cased
    #[must_use]
    pub fn empty() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Add or override a synonym
    pub fn insert(&mut self, raw: &str, canonical: &str) {
        self.map
            .insert(fold_header(raw), canonical.trim().to_string());
    }

    /// Canonical name for a raw header; unmapped names come back folded
    #[must_use]
    pub fn canonical_name(&self, raw: &str) -> String {
        let folded = fold_header(raw);
        self.map.get(&folded).cloned().unwrap_or(folded)
    }
}

fn fold_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Rename every column of `batch` to its canonical name
///
/// Column data is shared with the input batch; only the schema changes. When
/// two headers resolve to the same canonical name the first one wins and the
/// others keep their folded raw name.
pub fn normalize_columns(batch: &RecordBatch, synonyms: &ColumnSynonyms) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut fields = Vec::with_capacity(schema.fields().len());

    for (idx, field) in schema.fields().iter().enumerate() {
        let canonical = synonyms.canonical_name(field.name());
        let name = if taken.contains(&canonical) {
            let fallback = fold_header(field.name());
            log::warn!(
                "Header '{}' also maps to '{canonical}', keeping it as '{fallback}'",
                field.name()
            );
            if taken.contains(&fallback) {
                format!("{fallback}_{idx}")
            } else {
                fallback
            }
        } else {
            canonical
        };

        taken.insert(name.clone());
        fields.push(Arc::new(
            Field::new(name, field.data_type().clone(), field.is_nullable())
                .with_metadata(field.metadata().clone()),
        ));
    }

    let new_schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    batch_with_row_count(new_schema, batch.columns().to_vec(), batch.num_rows())
}

/// Verify that all required canonical attributes are present
///
/// # Errors
/// Returns `MissingColumns` naming every absent attribute
pub fn check_required_columns(schema: &Schema) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| schema.index_of(name).is_err())
        .map(|name| (*name).to_string())
        .sorted()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::MissingColumns { missing })
    }
}

/// Normalize headers and fail fast when required attributes are missing
pub fn normalize(batch: &RecordBatch, synonyms: &ColumnSynonyms) -> Result<RecordBatch> {
    let normalized = normalize_columns(batch, synonyms)?;
    check_required_columns(&normalized.schema())?;
    log::info!(
        "Normalized {} columns: {}",
        normalized.num_columns(),
        normalized
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .join(", ")
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_folds_case_and_whitespace() {
        let synonyms = ColumnSynonyms::default();
        assert_eq!(synonyms.canonical_name("  DATA "), "date");
        assert_eq!(synonyms.canonical_name("Observações"), "description");
        assert_eq!(synonyms.canonical_name("Tipo Falta"), "outcome_category");
        assert_eq!(synonyms.canonical_name("Duracao_Minutos"), "duration_minutes");
        assert_eq!(synonyms.canonical_name("Sala"), "sala");
    }

    #[test]
    fn test_english_names_pass_through() {
        let synonyms = ColumnSynonyms::default();
        for name in REQUIRED_COLUMNS {
            assert_eq!(synonyms.canonical_name(&name.to_uppercase()), name);
        }
    }

    #[test]
    fn test_empty_table_only_folds() {
        let synonyms = ColumnSynonyms::empty();
        assert_eq!(synonyms.canonical_name("Data"), "data");
    }
}
