//! Historical movie records used by the variance analysis.
//!
//! The dataset is a JSON array exported from the cleaned training data.
//! Every column is optional; analyses skip records that lack the column
//! they group or aggregate on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::registry::read_json;
use crate::prediction::SuccessLabel;

/// Summer release months (June to August).
pub const SUMMER_MONTHS: std::ops::RangeInclusive<u32> = 6..=8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default)]
    pub title: Option<String>,
    /// Budget bracket label, e.g. "Low", "Medium", "High".
    #[serde(default)]
    pub budget_category: Option<String>,
    #[serde(default)]
    pub primary_genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    /// Main production company.
    #[serde(default, alias = "main_production_company")]
    pub production_company: Option<String>,
    #[serde(default)]
    pub lead_actor: Option<String>,
    /// 1 to 12.
    #[serde(default)]
    pub release_month: Option<u32>,
    #[serde(default)]
    pub is_summer_movie: Option<bool>,
    /// Minutes.
    #[serde(default)]
    pub runtime: Option<f64>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    /// Dollars.
    #[serde(default)]
    pub budget: Option<f64>,
    /// Dollars.
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub success_category: Option<SuccessLabel>,
    #[serde(default)]
    pub profit_ratio: Option<f64>,
}

impl MovieRecord {
    /// Revenue over budget, when both are known and the budget is positive.
    fn revenue_ratio(&self) -> Option<f64> {
        match (self.revenue, self.budget) {
            (Some(revenue), Some(budget)) if budget > 0.0 && revenue.is_finite() => {
                Some(revenue / budget)
            }
            _ => None,
        }
    }

    /// Recorded category, or the one implied by the revenue ratio.
    pub fn success(&self) -> Option<SuccessLabel> {
        self.success_category
            .or_else(|| self.revenue_ratio().map(SuccessLabel::from_revenue_ratio))
    }

    /// Recorded profit ratio, or revenue over budget.
    pub fn profit_ratio(&self) -> Option<f64> {
        self.profit_ratio
            .filter(|r| r.is_finite())
            .or_else(|| self.revenue_ratio())
    }

    /// Recorded summer flag, or derived from the release month.
    pub fn is_summer(&self) -> Option<bool> {
        self.is_summer_movie
            .or_else(|| self.release_month.map(|m| SUMMER_MONTHS.contains(&m)))
    }
}

/// Load the dataset file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<MovieRecord>, CoreError> {
    let path = path.as_ref();
    let records: Vec<MovieRecord> = read_json(path)?;
    tracing::info!(path = %path.display(), records = records.len(), "Dataset loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn success_falls_back_to_revenue_ratio() {
        let r = MovieRecord {
            budget: Some(10e6),
            revenue: Some(30e6),
            ..Default::default()
        };
        assert_eq!(r.success(), Some(SuccessLabel::Hit));
        assert_eq!(r.profit_ratio(), Some(3.0));

        let recorded = MovieRecord {
            success_category: Some(SuccessLabel::Flop),
            ..r
        };
        assert_eq!(recorded.success(), Some(SuccessLabel::Flop));
    }

    #[test]
    fn zero_budget_has_no_ratio() {
        let r = MovieRecord {
            budget: Some(0.0),
            revenue: Some(5e6),
            ..Default::default()
        };
        assert_eq!(r.success(), None);
        assert_eq!(r.profit_ratio(), None);
    }

    #[test]
    fn summer_flag_derived_from_month() {
        let july = MovieRecord {
            release_month: Some(7),
            ..Default::default()
        };
        assert_eq!(july.is_summer(), Some(true));
        let march = MovieRecord {
            release_month: Some(3),
            ..Default::default()
        };
        assert_eq!(march.is_summer(), Some(false));
        assert_eq!(MovieRecord::default().is_summer(), None);
    }

    #[test]
    fn loads_json_array_with_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(
            &path,
            r#"[{"title": "A", "primary_genre": "Drama", "success_category": "Break-even"},
                {"budget_category": "High", "profit_ratio": 4.2}]"#,
        )
        .unwrap();
        let records = load_dataset(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].success(), Some(SuccessLabel::BreakEven));
        assert_eq!(records[1].primary_genre, None);
    }

    #[test]
    fn accepts_main_production_company_column() {
        let r: MovieRecord = serde_json::from_str(
            r#"{"director": "A. Smith", "main_production_company": "Paramount", "lead_actor": "B. Jones"}"#,
        )
        .unwrap();
        assert_eq!(r.production_company.as_deref(), Some("Paramount"));
        assert_eq!(r.director.as_deref(), Some("A. Smith"));
        assert_eq!(r.lead_actor.as_deref(), Some("B. Jones"));
    }

    #[test]
    fn missing_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_dataset(dir.path().join("nope.json")),
            Err(CoreError::ArtifactLoad { .. })
        );
    }
}
