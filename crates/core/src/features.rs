//! Feature schema handling and feature-vector assembly.
//!
//! [`Feature`] is the single mapping table from schema names to values
//! derived from [`MovieAttributes`]. The same table decides which optional
//! inputs a form has to collect for a given schema ([`InputField`]).

use serde::{Deserialize, Serialize};

use crate::attributes::{
    BudgetTierScheme, Genre, MovieAttributes, CONSENSUS_MAX, CONSENSUS_MIN,
    DEFAULT_AWARDS_POTENTIAL, DEFAULT_CONSENSUS_SCORE, DEFAULT_GENRE_BREADTH,
    DEFAULT_ORIGIN_IS_DOMESTIC, GENRE_BREADTH_MAX, GENRE_BREADTH_MIN,
};
use crate::error::CoreError;

/// Budgets are entered in millions; the log feature is taken over dollars.
pub const DOLLARS_PER_MILLION: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Recognized features
// ---------------------------------------------------------------------------

/// A schema slot this crate knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    BudgetLog,
    Runtime,
    VoteAverage,
    ImdbRating,
    IsSummerMovie,
    IsHolidayMovie,
    HasAwards,
    IsUsMovie,
    RottenTomatoesScore,
    PrimaryGenreEncoded,
    BudgetCategoryEncoded,
    GenreCount,
}

impl Feature {
    pub const ALL: [Feature; 12] = [
        Feature::BudgetLog,
        Feature::Runtime,
        Feature::VoteAverage,
        Feature::ImdbRating,
        Feature::IsSummerMovie,
        Feature::IsHolidayMovie,
        Feature::HasAwards,
        Feature::IsUsMovie,
        Feature::RottenTomatoesScore,
        Feature::PrimaryGenreEncoded,
        Feature::BudgetCategoryEncoded,
        Feature::GenreCount,
    ];

    /// Column name used by the training pipeline.
    pub fn name(self) -> &'static str {
        match self {
            Self::BudgetLog => "budget_log",
            Self::Runtime => "runtime",
            Self::VoteAverage => "vote_average",
            Self::ImdbRating => "imdb_rating",
            Self::IsSummerMovie => "is_summer_movie",
            Self::IsHolidayMovie => "is_holiday_movie",
            Self::HasAwards => "has_awards",
            Self::IsUsMovie => "is_us_movie",
            Self::RottenTomatoesScore => "rotten_tomatoes_score",
            Self::PrimaryGenreEncoded => "primary_genre_encoded",
            Self::BudgetCategoryEncoded => "budget_category_encoded",
            Self::GenreCount => "genre_count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Optional input that must be collected to fill this slot, if any.
    ///
    /// Budget, runtime, both ratings and the release window are always
    /// collected; the budget tier is derived from the budget.
    pub fn input_field(self) -> Option<InputField> {
        match self {
            Self::HasAwards => Some(InputField::AwardsPotential),
            Self::IsUsMovie => Some(InputField::OriginIsDomestic),
            Self::RottenTomatoesScore => Some(InputField::CriticConsensusScore),
            Self::PrimaryGenreEncoded => Some(InputField::Genre),
            Self::GenreCount => Some(InputField::GenreBreadthCount),
            _ => None,
        }
    }

    /// Numeric value of this slot for the given attributes.
    pub fn value(self, attrs: &MovieAttributes, scheme: BudgetTierScheme) -> f64 {
        match self {
            Self::BudgetLog => (attrs.budget * DOLLARS_PER_MILLION).ln_1p(),
            Self::Runtime => f64::from(attrs.runtime),
            Self::VoteAverage => attrs.audience_rating,
            Self::ImdbRating => attrs.critic_rating,
            Self::IsSummerMovie => flag(attrs.release_timing.is_summer()),
            Self::IsHolidayMovie => flag(attrs.release_timing.is_holiday()),
            Self::HasAwards => flag(attrs.awards_potential_or_default()),
            Self::IsUsMovie => flag(attrs.origin_is_domestic_or_default()),
            Self::RottenTomatoesScore => f64::from(attrs.critic_consensus_or_default()),
            Self::PrimaryGenreEncoded => f64::from(attrs.genre_encoded()),
            Self::BudgetCategoryEncoded => f64::from(attrs.budget_tier(scheme)),
            Self::GenreCount => f64::from(attrs.genre_breadth_or_default()),
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Conditional input fields
// ---------------------------------------------------------------------------

/// Optional inputs elicited only when the active schema needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Genre,
    AwardsPotential,
    OriginIsDomestic,
    CriticConsensusScore,
    GenreBreadthCount,
}

/// Form metadata for one optional input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputFieldSpec {
    pub field: InputField,
    #[serde(flatten)]
    pub kind: InputKind,
    pub default: serde_json::Value,
}

/// Widget kind and bounds for an optional input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputKind {
    Choice { options: Vec<&'static str> },
    Toggle,
    Integer { min: u32, max: u32 },
}

impl InputField {
    pub fn spec(self) -> InputFieldSpec {
        let (kind, default) = match self {
            Self::Genre => (
                InputKind::Choice {
                    options: Genre::ALL.iter().map(|g| g.label()).collect(),
                },
                serde_json::json!(Genre::ALL[0].label()),
            ),
            Self::AwardsPotential => (InputKind::Toggle, serde_json::json!(DEFAULT_AWARDS_POTENTIAL)),
            Self::OriginIsDomestic => (
                InputKind::Toggle,
                serde_json::json!(DEFAULT_ORIGIN_IS_DOMESTIC),
            ),
            Self::CriticConsensusScore => (
                InputKind::Integer {
                    min: CONSENSUS_MIN,
                    max: CONSENSUS_MAX,
                },
                serde_json::json!(DEFAULT_CONSENSUS_SCORE),
            ),
            Self::GenreBreadthCount => (
                InputKind::Integer {
                    min: GENRE_BREADTH_MIN,
                    max: GENRE_BREADTH_MAX,
                },
                serde_json::json!(DEFAULT_GENRE_BREADTH),
            ),
        };
        InputFieldSpec {
            field: self,
            kind,
            default,
        }
    }
}

// ---------------------------------------------------------------------------
// Feature schema
// ---------------------------------------------------------------------------

/// Ordered feature names a trained model expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Optional inputs required by this schema, deduplicated, in a stable order.
    pub fn input_fields(&self) -> Vec<InputField> {
        let mut fields: Vec<InputField> = self
            .names
            .iter()
            .filter_map(|n| Feature::from_name(n))
            .filter_map(Feature::input_field)
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Names with no mapping rule. These assemble to 0.
    pub fn unrecognized(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter(|n| Feature::from_name(n).is_none())
            .map(String::as_str)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the raw (unscaled) feature vector in schema order.
///
/// Total: unrecognized names yield `0.0`, so the output length always
/// equals `schema.len()`.
pub fn assemble(
    attrs: &MovieAttributes,
    schema: &FeatureSchema,
    scheme: BudgetTierScheme,
) -> Vec<f64> {
    schema
        .names()
        .iter()
        .map(|name| match Feature::from_name(name) {
            Some(feature) => feature.value(attrs, scheme),
            None => 0.0,
        })
        .collect()
}

/// Validate the attributes, then assemble.
pub fn assemble_checked(
    attrs: &MovieAttributes,
    schema: &FeatureSchema,
    scheme: BudgetTierScheme,
) -> Result<Vec<f64>, CoreError> {
    attrs.validate_bounds()?;
    Ok(assemble(attrs, schema, scheme))
}
