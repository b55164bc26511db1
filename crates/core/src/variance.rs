//! IBCS-style variance analysis: group the dataset, aggregate one metric
//! per group, and express each group as a variance against a benchmark.
//!
//! The output is chart-ready data. Bars above the benchmark are `good`,
//! everything else is `bad`, and percentage labels are only shown when the
//! deviation is large enough to be worth annotating.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::MovieRecord;
use crate::error::CoreError;
use crate::prediction::{SuccessLabel, HIT_REVENUE_RATIO};
use crate::threshold_validation::validate_finite;

/// Default minimum |variance %| for a bar to carry a label.
pub const DEFAULT_LABEL_THRESHOLD_PCT: f64 = 1.0;

/// Mean revenue (dollars) a budget bracket needs to count as hit territory.
pub const REVENUE_HIT_THRESHOLD: f64 = 250_000_000.0;

/// Directors with fewer movies have no track record to bucket.
pub const MIN_DIRECTOR_MOVIES: usize = 3;

const BUDGET_BIN_COUNT: usize = 10;

/// Budget bins only consider budgets and revenues strictly inside these
/// windows (dollars).
const BUDGET_WINDOW: (f64, f64) = (100_000.0, 300_000_000.0);
const REVENUE_WINDOW: (f64, f64) = (0.0, 2_000_000_000.0);

/// `(max movies inclusive, label)`; anything above the last entry is `10+`.
const EXPERIENCE_BINS: [(usize, &str); 3] =
    [(3, "3 movies"), (5, "4-5 movies"), (10, "6-10 movies")];

/// `(upper bound inclusive, label)`; the lower bound is the previous entry's
/// upper bound (exclusive). Values outside the outer bounds are skipped.
const RUNTIME_BINS: (f64, [(f64, &str); 4]) = (
    60.0,
    [
        (90.0, "Short (60-90)"),
        (120.0, "Standard (90-120)"),
        (150.0, "Long (120-150)"),
        (300.0, "Epic (150+)"),
    ],
);

const IMDB_BINS: (f64, [(f64, &str); 4]) = (
    0.0,
    [
        (5.5, "Poor (<5.5)"),
        (6.5, "Fair (5.5-6.5)"),
        (7.5, "Good (6.5-7.5)"),
        (10.0, "Excellent (7.5+)"),
    ],
);

fn bin(value: f64, bins: &(f64, [(f64, &'static str); 4])) -> Option<(u32, &'static str)> {
    let (mut lower, edges) = (bins.0, &bins.1);
    for (i, (upper, label)) in edges.iter().enumerate() {
        if value > lower && value <= *upper {
            return Some((i as u32, *label));
        }
        lower = *upper;
    }
    None
}

fn experience_bucket(movies: usize) -> Option<(u32, String)> {
    if movies < MIN_DIRECTOR_MOVIES {
        return None;
    }
    let (rank, label) = EXPERIENCE_BINS
        .iter()
        .enumerate()
        .find(|(_, (max, _))| movies <= *max)
        .map(|(i, (_, label))| (i, *label))
        .unwrap_or((EXPERIENCE_BINS.len(), "10+ movies"));
    Some((rank as u32, label.to_string()))
}

/// Budget of a record inside the budget-bin window.
fn windowed_budget(record: &MovieRecord) -> Option<f64> {
    let budget = record.budget.filter(|b| *b > BUDGET_WINDOW.0 && *b < BUDGET_WINDOW.1)?;
    record
        .revenue
        .filter(|r| *r > REVENUE_WINDOW.0 && *r < REVENUE_WINDOW.1)
        .map(|_| budget)
}

/// Equal-width budget bins spanning the windowed budgets of a dataset.
#[derive(Debug, Clone, Copy)]
struct BudgetBins {
    lower: f64,
    width: f64,
}

impl BudgetBins {
    fn from_records(records: &[MovieRecord]) -> Option<Self> {
        let (lower, upper) = records
            .iter()
            .filter_map(windowed_budget)
            .fold(None, |range: Option<(f64, f64)>, b| match range {
                Some((lo, hi)) => Some((lo.min(b), hi.max(b))),
                None => Some((b, b)),
            })?;
        Some(Self {
            lower,
            width: (upper - lower) / BUDGET_BIN_COUNT as f64,
        })
    }

    /// Right-inclusive bin; the lowest budget falls in the first bin.
    fn key(&self, budget: f64) -> (u32, String) {
        let index = if self.width > 0.0 {
            let steps = ((budget - self.lower) / self.width).ceil() as usize;
            steps.saturating_sub(1).min(BUDGET_BIN_COUNT - 1)
        } else {
            0
        };
        let lo = self.lower + index as f64 * self.width;
        let hi = lo + self.width;
        (index as u32, format!("${:.0}M-${:.0}M", lo / 1e6, hi / 1e6))
    }
}

/// Dataset-wide inputs some groupings need before keying records.
#[derive(Debug)]
struct KeyContext {
    budget_bins: Option<BudgetBins>,
}

impl KeyContext {
    fn new(group_by: GroupBy, records: &[MovieRecord]) -> Self {
        Self {
            budget_bins: match group_by {
                GroupBy::BudgetBin => BudgetBins::from_records(records),
                _ => None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    BudgetCategory,
    PrimaryGenre,
    ReleaseMonth,
    SummerRelease,
    RuntimeBin,
    ImdbRatingBin,
    Director,
    /// Main production company.
    Studio,
    LeadActor,
    /// Directors with at least [`MIN_DIRECTOR_MOVIES`] movies, bucketed by
    /// how many they made. Each director contributes one aggregated value.
    DirectorExperience,
    /// Ten equal-width brackets over the dataset's budget range.
    BudgetBin,
}

impl GroupBy {
    pub const ALL: [GroupBy; 11] = [
        GroupBy::BudgetCategory,
        GroupBy::PrimaryGenre,
        GroupBy::ReleaseMonth,
        GroupBy::SummerRelease,
        GroupBy::RuntimeBin,
        GroupBy::ImdbRatingBin,
        GroupBy::Director,
        GroupBy::Studio,
        GroupBy::LeadActor,
        GroupBy::DirectorExperience,
        GroupBy::BudgetBin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BudgetCategory => "budget_category",
            Self::PrimaryGenre => "primary_genre",
            Self::ReleaseMonth => "release_month",
            Self::SummerRelease => "summer_release",
            Self::RuntimeBin => "runtime_bin",
            Self::ImdbRatingBin => "imdb_rating_bin",
            Self::Director => "director",
            Self::Studio => "studio",
            Self::LeadActor => "lead_actor",
            Self::DirectorExperience => "director_experience",
            Self::BudgetBin => "budget_bin",
        }
    }

    /// Group key of a record: `(natural rank, display label)`.
    ///
    /// Free-text categories share rank 0 so they sort by label. Director
    /// experience keys by director here and is bucketed afterwards.
    fn key(self, record: &MovieRecord, ctx: &KeyContext) -> Option<(u32, String)> {
        match self {
            Self::BudgetCategory => non_blank(&record.budget_category).map(|c| (0, c)),
            Self::PrimaryGenre => non_blank(&record.primary_genre).map(|g| (0, g)),
            Self::ReleaseMonth => record.release_month.and_then(|m| {
                let month = chrono::Month::try_from(u8::try_from(m).ok()?).ok()?;
                Some((m, month.name().to_string()))
            }),
            Self::SummerRelease => record.is_summer().map(|summer| {
                if summer {
                    (1, "Summer".to_string())
                } else {
                    (0, "Non-Summer".to_string())
                }
            }),
            Self::RuntimeBin => record
                .runtime
                .and_then(|r| bin(r, &RUNTIME_BINS))
                .map(|(i, l)| (i, l.to_string())),
            Self::ImdbRatingBin => record
                .imdb_rating
                .and_then(|r| bin(r, &IMDB_BINS))
                .map(|(i, l)| (i, l.to_string())),
            Self::Director | Self::DirectorExperience => non_blank(&record.director).map(|d| (0, d)),
            Self::Studio => non_blank(&record.production_company).map(|c| (0, c)),
            Self::LeadActor => non_blank(&record.lead_actor).map(|a| (0, a)),
            Self::BudgetBin => {
                let bins = ctx.budget_bins.as_ref()?;
                windowed_budget(record).map(|b| bins.key(b))
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMetric {
    /// Share of movies categorized as Hit.
    HitRate,
    MedianProfitRatio,
    MeanProfitRatio,
    /// Mean revenue in dollars.
    MeanRevenue,
}

impl VarianceMetric {
    pub const ALL: [VarianceMetric; 4] = [
        VarianceMetric::HitRate,
        VarianceMetric::MedianProfitRatio,
        VarianceMetric::MeanProfitRatio,
        VarianceMetric::MeanRevenue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HitRate => "hit_rate",
            Self::MedianProfitRatio => "median_profit_ratio",
            Self::MeanProfitRatio => "mean_profit_ratio",
            Self::MeanRevenue => "mean_revenue",
        }
    }

    /// Per-record input of the aggregate.
    fn sample(self, record: &MovieRecord) -> Option<f64> {
        match self {
            Self::HitRate => record
                .success()
                .map(|s| if s == SuccessLabel::Hit { 1.0 } else { 0.0 }),
            Self::MedianProfitRatio | Self::MeanProfitRatio => record.profit_ratio(),
            Self::MeanRevenue => record.revenue.filter(|r| r.is_finite()),
        }
    }

    fn aggregate(self, samples: &mut [f64]) -> f64 {
        match self {
            Self::HitRate | Self::MeanProfitRatio | Self::MeanRevenue => mean(samples),
            Self::MedianProfitRatio => median(samples),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; even-length input averages the two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

macro_rules! impl_parse {
    ($ty:ty, $what:literal, $all:expr) => {
        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $all.into_iter()
                    .find(|v| v.as_str() == s.trim())
                    .ok_or_else(|| CoreError::Validation(format!("unknown {}: {s}", $what)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_parse!(GroupBy, "group_by", GroupBy::ALL);
impl_parse!(VarianceMetric, "metric", VarianceMetric::ALL);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Key order: month number, bin order, or alphabetical.
    #[default]
    Natural,
    Ascending,
    Descending,
    /// Listed categories only, in the given order.
    Explicit(Vec<String>),
}

impl FromStr for GroupOrder {
    type Err = CoreError;

    /// `natural`, `asc`, `desc`, or a comma-separated category list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "natural" => Ok(Self::Natural),
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            list => Ok(Self::Explicit(
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Benchmark {
    /// Mean of the group values.
    #[default]
    Mean,
    Fixed(f64),
}

impl Benchmark {
    /// Industry hit threshold for profit ratio charts.
    pub const HIT_THRESHOLD: Benchmark = Benchmark::Fixed(HIT_REVENUE_RATIO);
    /// Hit threshold for mean revenue charts.
    pub const REVENUE_THRESHOLD: Benchmark = Benchmark::Fixed(REVENUE_HIT_THRESHOLD);
}

impl FromStr for Benchmark {
    type Err = CoreError;

    /// `mean`, `hit_threshold`, `revenue_threshold`, or a number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "mean" => Ok(Self::Mean),
            "hit_threshold" => Ok(Self::HIT_THRESHOLD),
            "revenue_threshold" => Ok(Self::REVENUE_THRESHOLD),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Fixed)
                .ok_or_else(|| CoreError::Validation(format!("invalid benchmark: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarianceQuery {
    pub group_by: GroupBy,
    pub metric: VarianceMetric,
    pub order: GroupOrder,
    pub benchmark: Benchmark,
    /// Groups with fewer records are dropped. 0 and 1 keep everything.
    pub min_group_size: usize,
    /// Keep only the first `n` groups after ordering.
    pub top_n: Option<usize>,
    pub label_threshold_pct: f64,
}

impl VarianceQuery {
    pub fn new(group_by: GroupBy, metric: VarianceMetric) -> Self {
        Self {
            group_by,
            metric,
            order: GroupOrder::default(),
            benchmark: Benchmark::default(),
            min_group_size: 0,
            top_n: None,
            label_threshold_pct: DEFAULT_LABEL_THRESHOLD_PCT,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceBar {
    pub category: String,
    pub count: usize,
    pub value: f64,
    pub variance: f64,
    /// Absent when the benchmark is zero.
    pub variance_pct: Option<f64>,
    pub direction: Direction,
    pub show_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformer {
    pub category: String,
    pub value: f64,
    pub variance_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceSeries {
    pub group_by: GroupBy,
    pub metric: VarianceMetric,
    /// Absent for a mean benchmark over no groups.
    pub benchmark: Option<f64>,
    pub bars: Vec<VarianceBar>,
    pub top_performer: Option<TopPerformer>,
}

type Groups = BTreeMap<(u32, String), Vec<f64>>;

fn collect_groups(records: &[MovieRecord], query: &VarianceQuery) -> Groups {
    let ctx = KeyContext::new(query.group_by, records);
    let mut groups = Groups::new();
    for record in records {
        let (Some(key), Some(sample)) =
            (query.group_by.key(record, &ctx), query.metric.sample(record))
        else {
            continue;
        };
        groups.entry(key).or_default().push(sample);
    }

    if query.group_by != GroupBy::DirectorExperience {
        return groups;
    }
    let mut buckets = Groups::new();
    for (_, mut samples) in groups {
        let Some(bucket) = experience_bucket(samples.len()) else {
            continue;
        };
        let value = query.metric.aggregate(&mut samples);
        buckets.entry(bucket).or_default().push(value);
    }
    buckets
}

/// Run one variance analysis over `records`.
pub fn analyze(records: &[MovieRecord], query: &VarianceQuery) -> Result<VarianceSeries, CoreError> {
    if let Benchmark::Fixed(v) = query.benchmark {
        validate_finite(&[v], "benchmark")?;
    }
    validate_finite(&[query.label_threshold_pct], "label_threshold_pct")?;

    let groups = collect_groups(records, query);

    let mut values: Vec<(String, usize, f64)> = groups
        .into_iter()
        .filter(|(_, samples)| samples.len() >= query.min_group_size)
        .map(|((_, label), mut samples)| {
            let value = query.metric.aggregate(&mut samples);
            (label, samples.len(), value)
        })
        .collect();

    match &query.order {
        GroupOrder::Natural => {}
        GroupOrder::Ascending => values.sort_by(|a, b| a.2.total_cmp(&b.2)),
        GroupOrder::Descending => values.sort_by(|a, b| b.2.total_cmp(&a.2)),
        GroupOrder::Explicit(order) => {
            values = order
                .iter()
                .filter_map(|c| values.iter().find(|(label, ..)| label == c).cloned())
                .collect();
        }
    }
    if let Some(n) = query.top_n {
        values.truncate(n);
    }

    let benchmark = match query.benchmark {
        Benchmark::Fixed(v) => Some(v),
        Benchmark::Mean if values.is_empty() => None,
        Benchmark::Mean => Some(values.iter().map(|v| v.2).sum::<f64>() / values.len() as f64),
    };

    let bars: Vec<VarianceBar> = values
        .into_iter()
        .map(|(category, count, value)| {
            let base = benchmark.unwrap_or(0.0);
            let variance = value - base;
            let variance_pct = (base != 0.0).then(|| variance / base * 100.0);
            VarianceBar {
                category,
                count,
                value,
                variance,
                variance_pct,
                direction: if variance > 0.0 {
                    Direction::Good
                } else {
                    Direction::Bad
                },
                show_label: variance_pct.is_some_and(|p| p.abs() > query.label_threshold_pct),
            }
        })
        .collect();

    // First bar wins ties so the result follows the requested order.
    let top_performer = bars
        .iter()
        .fold(None::<&VarianceBar>, |best, bar| match best {
            Some(b) if b.value >= bar.value => Some(b),
            _ => Some(bar),
        })
        .map(|bar| TopPerformer {
            category: bar.category.clone(),
            value: bar.value,
            variance_pct: bar.variance_pct,
        });

    tracing::debug!(
        group_by = %query.group_by,
        metric = %query.metric,
        groups = bars.len(),
        "Variance analysis computed",
    );

    Ok(VarianceSeries {
        group_by: query.group_by,
        metric: query.metric,
        benchmark,
        bars,
        top_performer,
    })
}
