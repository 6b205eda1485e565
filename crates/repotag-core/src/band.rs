//! Banding: map a continuous measurement onto an ordered set of named ranges.
//!
//! A band table is a list of `UpTo` thresholds in strictly increasing order
//! followed by one `Default` band. A value belongs to the first band whose
//! threshold it is `<=`, so a value sitting exactly on a threshold lands in the
//! lower band. Negative and NaN inputs are clamped to zero: day counts are
//! derived from timestamps and clock skew can push them below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::BandError;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Upper limit of one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandLimit {
    /// Inclusive upper threshold.
    UpTo(f64),
    /// Catch-all for everything above the last threshold.
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    pub limit: BandLimit,
}

impl Band {
    pub fn up_to(name: impl Into<String>, upper: f64) -> Self {
        Self {
            name: name.into(),
            limit: BandLimit::UpTo(upper),
        }
    }

    pub fn default_band(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limit: BandLimit::Default,
        }
    }
}

/// A validated band table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bands {
    bands: Vec<Band>,
}

impl Bands {
    /// Validate and build a band table.
    pub fn new(bands: Vec<Band>) -> Result<Self, BandError> {
        let Some(last) = bands.last() else {
            return Err(BandError::Empty);
        };
        if last.limit != BandLimit::Default {
            return Err(BandError::MissingDefault);
        }

        let mut previous: Option<f64> = None;
        for band in &bands[..bands.len() - 1] {
            let upper = match band.limit {
                BandLimit::Default => {
                    return Err(BandError::DefaultNotLast {
                        name: band.name.clone(),
                    })
                }
                BandLimit::UpTo(upper) => upper,
            };
            if !upper.is_finite() {
                return Err(BandError::NonFiniteThreshold {
                    name: band.name.clone(),
                });
            }
            if let Some(prev) = previous {
                if upper <= prev {
                    return Err(BandError::NonIncreasing {
                        name: band.name.clone(),
                        previous: prev,
                        upper,
                    });
                }
            }
            previous = Some(upper);
        }

        Ok(Self { bands })
    }

    /// Tables defined in this module are known to be well formed.
    fn fixed(entries: &[(&str, Option<f64>)]) -> Self {
        let bands = entries
            .iter()
            .map(|(name, upper)| match upper {
                Some(u) => Band::up_to(*name, *u),
                None => Band::default_band(*name),
            })
            .collect();
        Self { bands }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    fn locate(&self, value: f64) -> &Band {
        let mut chosen = &self.bands[self.bands.len() - 1];
        for band in &self.bands {
            if let BandLimit::UpTo(upper) = band.limit {
                if value <= upper {
                    chosen = band;
                    break;
                }
            }
        }
        chosen
    }
}

impl<'de> Deserialize<'de> for Bands {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            bands: Vec<Band>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Bands::new(raw.bands).map_err(serde::de::Error::custom)
    }
}

/// Display options for [`band_for`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandOptions {
    /// Append the measured value, e.g. `"recent (14)"`.
    pub include_number: bool,
}

impl BandOptions {
    pub fn with_number() -> Self {
        Self {
            include_number: true,
        }
    }
}

/// Label for `value` in `bands`.
pub fn band_for(bands: &Bands, value: f64, options: BandOptions) -> String {
    let value = clamp_measurement(value);
    let band = bands.locate(value);
    if options.include_number {
        format!("{} ({})", band.name, format_measurement(value))
    } else {
        band.name.clone()
    }
}

fn clamp_measurement(value: f64) -> f64 {
    // `!(v > 0)` also catches NaN.
    if !(value > 0.0) {
        0.0
    } else {
        value
    }
}

fn format_measurement(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Time since last activity: current, recent, ancient, prehistoric.
pub fn age_bands() -> Bands {
    Bands::fixed(&[
        ("current", Some(7.0)),
        ("recent", Some(30.0)),
        ("ancient", Some(365.0)),
        ("prehistoric", None),
    ])
}

/// Repository size in lines of code.
pub fn size_bands() -> Bands {
    Bands::fixed(&[
        ("tiny", Some(200.0)),
        ("small", Some(3_000.0)),
        ("big", Some(10_000.0)),
        ("huge", None),
    ])
}

/// Generic item counts (branches, committers, dependencies).
pub fn count_bands() -> Bands {
    Bands::fixed(&[("low", Some(5.0)), ("medium", Some(20.0)), ("high", None)])
}

/// Whole days from `then` to `now`, rounded to nearest.
///
/// `then` after `now` (clock skew) yields 0.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - then).num_milliseconds() as f64;
    let days = (millis / MILLIS_PER_DAY).round();
    if days > 0.0 {
        days as u64
    } else {
        0
    }
}

/// Age band for a last-commit instant, with the day count included.
pub fn recency_band(last_commit: DateTime<Utc>, now: DateTime<Utc>) -> String {
    band_for(
        &age_bands(),
        days_since(last_commit, now) as f64,
        BandOptions::with_number(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_threshold_value_falls_in_lower_band() {
        let bands = age_bands();
        assert_eq!(band_for(&bands, 7.0, BandOptions::default()), "current");
        assert_eq!(band_for(&bands, 30.0, BandOptions::default()), "recent");
        assert_eq!(band_for(&bands, 365.0, BandOptions::default()), "ancient");
    }

    #[test]
    fn test_just_above_threshold_falls_in_upper_band() {
        let bands = age_bands();
        assert_eq!(band_for(&bands, 7.5, BandOptions::default()), "recent");
        assert_eq!(band_for(&bands, 31.0, BandOptions::default()), "ancient");
        assert_eq!(band_for(&bands, 366.0, BandOptions::default()), "prehistoric");
    }

    #[test]
    fn test_include_number() {
        let bands = age_bands();
        assert_eq!(band_for(&bands, 14.0, BandOptions::with_number()), "recent (14)");
        assert_eq!(band_for(&bands, 2.5, BandOptions::with_number()), "current (2.5)");
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        let bands = size_bands();
        assert_eq!(band_for(&bands, -4.0, BandOptions::with_number()), "tiny (0)");
        assert_eq!(band_for(&bands, f64::NAN, BandOptions::default()), "tiny");
    }

    #[test]
    fn test_infinity_lands_in_default() {
        assert_eq!(
            band_for(&count_bands(), f64::INFINITY, BandOptions::default()),
            "high"
        );
    }

    #[test]
    fn test_validation_rejects_bad_tables() {
        assert_eq!(Bands::new(vec![]), Err(BandError::Empty));
        assert_eq!(
            Bands::new(vec![Band::up_to("low", 1.0)]),
            Err(BandError::MissingDefault)
        );
        assert!(matches!(
            Bands::new(vec![
                Band::default_band("a"),
                Band::up_to("b", 1.0),
                Band::default_band("c"),
            ]),
            Err(BandError::DefaultNotLast { .. })
        ));
        assert!(matches!(
            Bands::new(vec![
                Band::up_to("a", 5.0),
                Band::up_to("b", 5.0),
                Band::default_band("c"),
            ]),
            Err(BandError::NonIncreasing { .. })
        ));
        assert!(matches!(
            Bands::new(vec![Band::up_to("a", f64::NAN), Band::default_band("b")]),
            Err(BandError::NonFiniteThreshold { .. })
        ));
    }

    #[test]
    fn test_builtin_tables_validate() {
        for bands in [age_bands(), size_bands(), count_bands()] {
            let rebuilt = Bands::new(bands.bands.clone()).expect("builtin table is valid");
            assert_eq!(rebuilt, bands);
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Bands = serde_json::from_str(
            r#"{"bands":[{"name":"few","limit":{"up_to":3.0}},{"name":"many","limit":"default"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<Bands>(r#"{"bands":[]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_days_since_rounds_and_clamps() {
        let now = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(days_since(now - Duration::days(14), now), 14);
        assert_eq!(days_since(now - Duration::hours(36), now), 2);
        assert_eq!(days_since(now + Duration::days(3), now), 0);
        assert_eq!(recency_band(now - Duration::days(14), now), "recent (14)");
    }
}
