//! Classify a merged attack record and synthesize its rating line.
//!
//! Branches are tried in a fixed order and the first match wins. A record
//! with a defender is always rated as a defense, even when stat-loss or item
//! data is also present.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::merge::CompositeRecord;

/// Players whose stat-loss attacks always rate a perfect ten.
pub const EXEMPT_NAMES: [&str; 2] = ["Chorby Soul", "Parker MacMillan"];

const SALMON_PREFIX: &str = "SALMON";
const SALMON_BASE_RATING: f64 = 2.0;
/// Exclusive upper bound of the jitter draw.
const JITTER_CEILING: f64 = 0.99;

/// Source of the small random addend applied to some ratings.
pub trait JitterSource {
    /// Next jitter value drawn from `[0, 0.99)` and rounded to one decimal.
    fn variance(&mut self) -> f64;
}

/// Uniform jitter from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomJitter<R> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomJitter<StdRng> {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn variance(&mut self) -> f64 {
        round_tenths(self.rng.gen_range(0.0..JITTER_CEILING))
    }
}

/// Jitter pinned to one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn variance(&mut self) -> f64 {
        self.0
    }
}

/// Round half away from zero to one decimal place.
#[must_use]
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A rating out of ten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    /// Sentinel for records no branch matched; renders as a bare `0`.
    Unclassified,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Score(value) if value.is_nan() => f.write_str("NaN/10"),
            Self::Score(value) if value.is_infinite() => {
                let sign = if value < 0.0 { "-" } else { "" };
                write!(f, "{sign}Infinity/10")
            }
            Self::Score(value) if value.fract().abs() < f64::EPSILON => {
                write!(f, "{value:.1}/10")
            }
            Self::Score(value) => write!(f, "{value}/10"),
            Self::Unclassified => f.write_str("0/10"),
        }
    }
}

/// Which branch of the decision tree produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    DefendedWithItem,
    Defended,
    ItemBroken,
    StatLoss,
    SalmonCannon,
    Unclassified,
}

/// One row handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLine {
    pub target: String,
    pub rating: Rating,
    pub comment: String,
}

impl Serialize for DisplayLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_tuple(3)?;
        row.serialize_element(&self.target)?;
        row.serialize_element(&self.rating.to_string())?;
        row.serialize_element(&self.comment)?;
        row.end()
    }
}

/// Pick the branch for `record`.
#[must_use]
pub fn verdict(record: &CompositeRecord) -> Verdict {
    if record.secondary_actor_id.is_some() {
        if record.item_defended {
            return Verdict::DefendedWithItem;
        }
        return Verdict::Defended;
    }
    if record.item.is_some() && !record.item_defended {
        return Verdict::ItemBroken;
    }
    if record.before.is_some() && record.after.is_some() {
        return Verdict::StatLoss;
    }
    if record.description.starts_with(SALMON_PREFIX) {
        return Verdict::SalmonCannon;
    }
    Verdict::Unclassified
}

fn is_exempt(record: &CompositeRecord) -> bool {
    record
        .primary_name
        .as_deref()
        .is_some_and(|name| EXEMPT_NAMES.contains(&name))
}

/// Classify `record` and build its line.
///
/// Jitter is drawn fresh on every call. Unclassifiable records are reported
/// to `diagnostics` and still produce a placeholder line.
pub fn classify(
    record: &CompositeRecord,
    jitter: &mut dyn JitterSource,
    diagnostics: &mut Diagnostics,
) -> DisplayLine {
    let primary = record.primary_name.as_deref().unwrap_or_default();
    let secondary = record.secondary_name.as_deref().unwrap_or_default();
    let item = record.item.as_deref().unwrap_or_default();
    let modifiers = f64::from(record.modifiers.unwrap_or(0));

    match verdict(record) {
        Verdict::DefendedWithItem => DisplayLine {
            target: primary.to_string(),
            rating: Rating::Score(modifiers + jitter.variance()),
            comment: format!("(Meal prevented by {secondary}'s {item})"),
        },
        Verdict::Defended => DisplayLine {
            target: primary.to_string(),
            rating: Rating::Score(0.0),
            comment: format!("(Meal prevented by {secondary})"),
        },
        Verdict::ItemBroken => DisplayLine {
            target: format!("{primary}'s {item}"),
            rating: Rating::Score(modifiers + jitter.variance()),
            comment: String::new(),
        },
        Verdict::StatLoss => {
            let (before, after) = (record.before.unwrap_or(1.0), record.after.unwrap_or(0.0));
            let score = if is_exempt(record) {
                10.0
            } else {
                round_tenths(after / before * 5.0 + 5.0)
            };
            if !score.is_finite() {
                diagnostics.push(Diagnostic::NonFiniteRating {
                    record_id: record.record_id.clone(),
                });
            }
            DisplayLine {
                target: primary.to_string(),
                rating: Rating::Score(score),
                comment: String::new(),
            }
        }
        Verdict::SalmonCannon => DisplayLine {
            target: primary.to_string(),
            rating: Rating::Score(SALMON_BASE_RATING + jitter.variance()),
            comment: "(Meal prevented by Salmon Cannons)".to_string(),
        },
        Verdict::Unclassified => {
            diagnostics.push(Diagnostic::UnclassifiableRecord {
                record_id: record.record_id.clone(),
                description: record.description.clone(),
            });
            DisplayLine {
                target: format!("{primary}'s ????"),
                rating: Rating::Unclassified,
                comment: String::new(),
            }
        }
    }
}
