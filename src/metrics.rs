//! Outcome ratios over a filtered view.

use serde::Serialize;

use crate::classify::OutcomeCategory;
use crate::filter::FilteredView;
use crate::schema::COLOR_TAG;
use crate::utils::arrow::{cell_text, optional_column};

/// Count and percentage of one outcome tag within a view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryMetric {
    /// The outcome tag
    pub category: OutcomeCategory,
    /// Rows carrying the tag
    pub count: usize,
    /// `count / rows * 100`, rounded to two decimals
    pub ratio: f64,
}

/// Round a percentage to two decimal places
fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `total`; zero when `total` is zero
#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_percentage(part as f64 / total as f64 * 100.0)
}

/// Tag of every row in the view; rows without a `color_tag` are unclassified
fn row_categories(view: &FilteredView) -> Vec<OutcomeCategory> {
    let batch = view.batch();
    let tags = optional_column(batch, COLOR_TAG);
    (0..batch.num_rows())
        .map(|row| {
            tags.as_ref()
                .and_then(|col| cell_text(col, row))
                .and_then(|tag| tag.parse().ok())
                .unwrap_or(OutcomeCategory::Unclassified)
        })
        .collect()
}

/// Percentage of rows in `view` tagged `category`
///
/// Returns 0 for an empty view.
#[must_use]
pub fn category_ratio(view: &FilteredView, category: OutcomeCategory) -> f64 {
    let categories = row_categories(view);
    let count = categories.iter().filter(|c| **c == category).count();
    percentage(count, categories.len())
}

/// Count and ratio for every tag, in palette order
#[must_use]
pub fn category_breakdown(view: &FilteredView) -> Vec<CategoryMetric> {
    let categories = row_categories(view);
    OutcomeCategory::ALL
        .into_iter()
        .map(|category| {
            let count = categories.iter().filter(|c| **c == category).count();
            CategoryMetric {
                category,
                count,
                ratio: percentage(count, categories.len()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;

    fn view_of(tags: &[&str]) -> FilteredView {
        let schema = Arc::new(Schema::new(vec![Field::new(COLOR_TAG, DataType::Utf8, false)]));
        let column: ArrayRef = Arc::new(StringArray::from(tags.to_vec()));
        let batch = RecordBatch::try_new(schema, vec![column]).unwrap();
        FilteredView::full(&batch)
    }

    #[test]
    fn test_ratio_rounds_to_two_decimals() {
        let view = view_of(&["attended", "patient_absent", "attended"]);
        assert!((category_ratio(&view, OutcomeCategory::PatientAbsent) - 33.33).abs() < 1e-9);
        assert!((category_ratio(&view, OutcomeCategory::Attended) - 66.67).abs() < 1e-9);
    }

    #[test]
    fn test_empty_view_is_zero() {
        let view = view_of(&[]);
        for category in OutcomeCategory::ALL {
            assert!(category_ratio(&view, category).abs() < f64::EPSILON);
        }
        assert!(category_breakdown(&view).iter().all(|m| m.count == 0));
    }

    #[test]
    fn test_breakdown_in_palette_order() {
        let view = view_of(&["unclassified", "attended"]);
        let breakdown = category_breakdown(&view);
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown[0].category, OutcomeCategory::Attended);
        assert_eq!(breakdown[0].count, 1);
        assert_eq!(breakdown[3].category, OutcomeCategory::Unclassified);
        assert!((breakdown[3].ratio - 50.0).abs() < f64::EPSILON);
    }
}
