//! Movie attributes entered for a single prediction (bounds, categorical
//! encodings and the budget tier derivation).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::threshold_validation::validate_closed_range;

// ---------------------------------------------------------------------------
// Input bounds
// ---------------------------------------------------------------------------

/// Production budget bounds, millions USD.
pub const BUDGET_MIN: f64 = 1.0;
pub const BUDGET_MAX: f64 = 300.0;
/// Runtime bounds, minutes.
pub const RUNTIME_MIN: u32 = 60;
pub const RUNTIME_MAX: u32 = 240;
/// Audience (TMDB) and critic (IMDb) rating bounds.
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;
/// Rotten Tomatoes style consensus score bounds.
pub const CONSENSUS_MIN: u32 = 0;
pub const CONSENSUS_MAX: u32 = 100;
/// Number of genres a movie is tagged with.
pub const GENRE_BREADTH_MIN: u32 = 1;
pub const GENRE_BREADTH_MAX: u32 = 4;

// ---------------------------------------------------------------------------
// Defaults for attributes the form did not collect
// ---------------------------------------------------------------------------

pub const DEFAULT_AWARDS_POTENTIAL: bool = false;
pub const DEFAULT_ORIGIN_IS_DOMESTIC: bool = true;
pub const DEFAULT_CONSENSUS_SCORE: u32 = 70;
pub const DEFAULT_GENRE_BREADTH: u32 = 2;

// ---------------------------------------------------------------------------
// Release timing
// ---------------------------------------------------------------------------

/// Release window. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseTiming {
    /// June to August.
    Summer,
    /// November and December.
    Holiday,
    Other,
}

impl ReleaseTiming {
    pub fn is_summer(self) -> bool {
        self == Self::Summer
    }

    pub fn is_holiday(self) -> bool {
        self == Self::Holiday
    }
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// Primary genre offered to the user.
///
/// The declaration order is the label encoding the models were trained
/// with and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Comedy,
    Drama,
    Horror,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Thriller,
}

impl Genre {
    /// All genres in encoding order.
    pub const ALL: [Genre; 6] = [
        Genre::Action,
        Genre::Comedy,
        Genre::Drama,
        Genre::Horror,
        Genre::SciFi,
        Genre::Thriller,
    ];

    /// Position in [`Genre::ALL`], used as the model encoding.
    pub fn encoded(self) -> u32 {
        Self::ALL
            .iter()
            .position(|g| *g == self)
            .map(|p| p as u32)
            .unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Comedy => "Comedy",
            Self::Drama => "Drama",
            Self::Horror => "Horror",
            Self::SciFi => "Sci-Fi",
            Self::Thriller => "Thriller",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Budget tiers
// ---------------------------------------------------------------------------

/// How the budget is bucketed into the `budget_category_encoded` feature.
///
/// Two conventions exist for the trained models; the process picks one
/// through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTierScheme {
    /// `< 20M -> 0`, `20M..75M -> 1`, `>= 75M -> 2`.
    #[default]
    ThreeTier,
    /// `< 50M -> 1`, otherwise `2`.
    TwoTier,
}

impl BudgetTierScheme {
    /// Tier code for a budget given in millions.
    pub fn tier(self, budget_millions: f64) -> u8 {
        match self {
            Self::ThreeTier => {
                if budget_millions < 20.0 {
                    0
                } else if budget_millions < 75.0 {
                    1
                } else {
                    2
                }
            }
            Self::TwoTier => {
                if budget_millions < 50.0 {
                    1
                } else {
                    2
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeTier => "three_tier",
            Self::TwoTier => "two_tier",
        }
    }
}

impl FromStr for BudgetTierScheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "three_tier" => Ok(Self::ThreeTier),
            "two_tier" => Ok(Self::TwoTier),
            other => Err(CoreError::Validation(format!(
                "Unknown budget tier scheme '{other}' (expected three_tier or two_tier)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Movie attributes
// ---------------------------------------------------------------------------

/// User-entered attributes for one prediction request.
///
/// Optional fields are only collected when the active model's schema uses
/// them; missing values fall back to the `DEFAULT_*` constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MovieAttributes {
    /// Production budget in millions USD.
    #[validate(range(min = 1.0, max = 300.0))]
    pub budget: f64,
    /// Runtime in minutes.
    #[validate(range(min = 60, max = 240))]
    pub runtime: u32,
    /// Expected audience (TMDB) rating.
    #[validate(range(min = 1.0, max = 10.0))]
    pub audience_rating: f64,
    /// Expected critic (IMDb) rating.
    #[validate(range(min = 1.0, max = 10.0))]
    pub critic_rating: f64,
    pub release_timing: ReleaseTiming,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub awards_potential: Option<bool>,
    #[serde(default)]
    pub origin_is_domestic: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub critic_consensus_score: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 1, max = 4))]
    pub genre_breadth_count: Option<u32>,
}

impl MovieAttributes {
    /// Attributes with only the always-collected fields set.
    pub fn new(
        budget: f64,
        runtime: u32,
        audience_rating: f64,
        critic_rating: f64,
        release_timing: ReleaseTiming,
    ) -> Self {
        Self {
            budget,
            runtime,
            audience_rating,
            critic_rating,
            release_timing,
            genre: None,
            awards_potential: None,
            origin_is_domestic: None,
            critic_consensus_score: None,
            genre_breadth_count: None,
        }
    }

    /// Reject out-of-range or non-finite values. Nothing is clamped.
    pub fn validate_bounds(&self) -> Result<(), CoreError> {
        validate_closed_range(self.budget, BUDGET_MIN, BUDGET_MAX, "budget")?;
        validate_closed_range(
            self.audience_rating,
            RATING_MIN,
            RATING_MAX,
            "audience_rating",
        )?;
        validate_closed_range(self.critic_rating, RATING_MIN, RATING_MAX, "critic_rating")?;
        self.validate()?;
        Ok(())
    }

    /// Budget tier under the given scheme.
    pub fn budget_tier(&self, scheme: BudgetTierScheme) -> u8 {
        scheme.tier(self.budget)
    }

    pub fn awards_potential_or_default(&self) -> bool {
        self.awards_potential.unwrap_or(DEFAULT_AWARDS_POTENTIAL)
    }

    pub fn origin_is_domestic_or_default(&self) -> bool {
        self.origin_is_domestic.unwrap_or(DEFAULT_ORIGIN_IS_DOMESTIC)
    }

    pub fn critic_consensus_or_default(&self) -> u32 {
        self.critic_consensus_score.unwrap_or(DEFAULT_CONSENSUS_SCORE)
    }

    pub fn genre_breadth_or_default(&self) -> u32 {
        self.genre_breadth_count.unwrap_or(DEFAULT_GENRE_BREADTH)
    }

    /// Genre encoding; an uncollected genre encodes as the first entry.
    pub fn genre_encoded(&self) -> u32 {
        self.genre.map(Genre::encoded).unwrap_or(0)
    }
}
