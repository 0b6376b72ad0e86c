//! Configuration for the schedule pipeline.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::classify::{CategorySynonyms, OutcomeCategory};
use crate::error::util::safe_open_file;
use crate::error::{Result, ScheduleError};
use crate::filter::FilterConfig;
use crate::schema::ColumnSynonyms;
use crate::temporal::{
    DEFAULT_DURATION_MINUTES, DateFormatConfig, MAX_DURATION_MINUTES, TimestampPolicy,
};

/// Configuration for the `SchedulePipeline`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Duration used for rows without a usable duration value
    pub default_duration_minutes: i64,
    /// What to do with rows whose date + time cannot be parsed
    pub timestamp_policy: TimestampPolicy,
    /// Day-first formats tried when parsing date + time text
    pub date_formats: DateFormatConfig,
    /// Extra header synonyms, lower-case raw name to canonical name
    pub column_synonyms: BTreeMap<String, String>,
    /// Extra outcome synonyms, lower-case raw text to category
    pub category_synonyms: BTreeMap<String, OutcomeCategory>,
    /// Column type inference settings
    pub filter: FilterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            timestamp_policy: TimestampPolicy::default(),
            date_formats: DateFormatConfig::default(),
            column_synonyms: BTreeMap::new(),
            category_synonyms: BTreeMap::new(),
            filter: FilterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "reading pipeline configuration")?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        log::info!("Loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that serde alone cannot constrain
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_DURATION_MINUTES).contains(&self.default_duration_minutes) {
            return Err(ScheduleError::Config(format!(
                "default_duration_minutes must be between 0 and {MAX_DURATION_MINUTES}, got {}",
                self.default_duration_minutes
            )));
        }
        if self.date_formats.datetime_formats.is_empty() {
            return Err(ScheduleError::Config(
                "date_formats.datetime_formats must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Header synonym table with configured extras applied over the defaults
    #[must_use]
    pub fn column_synonyms(&self) -> ColumnSynonyms {
        let mut synonyms = ColumnSynonyms::default();
        for (raw, canonical) in &self.column_synonyms {
            synonyms.insert(raw, canonical);
        }
        synonyms
    }

    /// Outcome synonym table with configured extras applied over the defaults
    #[must_use]
    pub fn category_synonyms(&self) -> CategorySynonyms {
        let mut synonyms = CategorySynonyms::default();
        for (raw, category) in &self.category_synonyms {
            synonyms.insert(raw, *category);
        }
        synonyms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "timestamp_policy": "null_row" }"#).unwrap();
        assert_eq!(config.timestamp_policy, TimestampPolicy::NullRow);
        assert_eq!(config.default_duration_minutes, 30);
        assert_eq!(config.filter.categorical_threshold, 100);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let parsed = serde_json::from_str::<PipelineConfig>(r#"{ "duration": 10 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_negative_default_duration_invalid() {
        let config = PipelineConfig {
            default_duration_minutes: -5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_default_duration_invalid() {
        let config = PipelineConfig {
            default_duration_minutes: 1_000_000_000_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScheduleError::Config(_))));
    }

    #[test]
    fn test_extra_synonyms_applied() {
        let mut config = PipelineConfig::default();
        config
            .column_synonyms
            .insert("medico".to_string(), "professional".to_string());
        config
            .category_synonyms
            .insert("ok".to_string(), OutcomeCategory::Attended);

        assert_eq!(config.column_synonyms().canonical_name("Medico"), "professional");
        assert_eq!(config.category_synonyms().classify("OK"), OutcomeCategory::Attended);
    }
}
