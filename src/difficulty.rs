//! Route difficulty from a heart-rate-reserve load model.
//!
//! The model estimates the total heartbeats a reference hiker spends on the
//! route, subtracts what the same hiker would spend at rest, and expresses the
//! remainder as a percentage of the heart-rate reserve available over the same
//! duration. The percentage is bucketed into four levels.
//!
//! ## Example
//! ```rust
//! use route_metrics::difficulty::{classify_difficulty, estimated_hours, Difficulty};
//!
//! let distance_km = 12.0;
//! let gain_m = 900.0;
//! let hours = estimated_hours(distance_km, gain_m);
//! let level = classify_difficulty(distance_km, gain_m, hours).unwrap();
//! println!("{} ({:.1} h)", level, hours);
//! ```

use crate::error::{Result, RouteMetricsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-level route difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Expert,
}

impl Difficulty {
    /// Wire name used in exported records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    /// Chinese label used in synthesized descriptions.
    pub fn label_zh(&self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Moderate => "中等",
            Difficulty::Hard => "困难",
            Difficulty::Expert => "专家级",
        }
    }

    /// Bucket a heart-rate-reserve percentage.
    pub fn from_reserve_percentage(pct: f64) -> Self {
        if pct < 35.0 {
            Difficulty::Easy
        } else if pct < 60.0 {
            Difficulty::Moderate
        } else if pct < 80.0 {
            Difficulty::Hard
        } else {
            Difficulty::Expert
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Parse an author-supplied difficulty, English or Chinese.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "easy" | "简单" | "容易" => Ok(Difficulty::Easy),
            "moderate" | "medium" | "中等" | "适中" => Ok(Difficulty::Moderate),
            "hard" | "difficult" | "困难" | "较难" => Ok(Difficulty::Hard),
            "expert" | "专家" | "专家级" | "极难" => Ok(Difficulty::Expert),
            _ => Err(s.to_string()),
        }
    }
}

/// Physiological constants of the reference hiker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartRateModel {
    /// Resting heart rate (bpm)
    pub resting_hr: f64,
    /// Maximum heart rate (bpm)
    pub max_hr: f64,
    /// Carried load (kg)
    pub pack_kg: f64,
    /// Body mass (kg)
    pub body_kg: f64,
    /// Height (m)
    pub height_m: f64,
}

impl HeartRateModel {
    /// Reference hiker of a given age; max HR from the 220-minus-age rule.
    pub fn for_age(age: u8) -> Self {
        Self {
            resting_hr: 60.0,
            max_hr: 220.0 - age as f64,
            pack_kg: 5.0,
            body_kg: 70.0,
            height_m: 1.75,
        }
    }

    /// Total heartbeats spent covering `distance_m` with `gain_m` of climbing
    /// in `duration_s` seconds.
    pub fn total_heartbeats(&self, distance_m: f64, gain_m: f64, duration_s: f64) -> f64 {
        let r = self.resting_hr;
        let t = duration_s;
        let bmi_term = 201.0 / (self.height_m * self.height_m);

        13.0 * (60.0 * r * t + 1587.6 * distance_m + 23709.6 * gain_m + 100.8 * self.pack_kg * t
            + bmi_term * self.body_kg * t
            - 4049.4 * t)
            / 50000.0
    }

    /// Spent heart-rate reserve as a percentage of the available reserve.
    ///
    /// Inputs are in km, m and hours. Fails for a non-positive duration.
    pub fn reserve_percentage(&self, distance_km: f64, gain_m: f64, hours: f64) -> Result<f64> {
        if !hours.is_finite() || hours <= 0.0 || !distance_km.is_finite() || !gain_m.is_finite() {
            return Err(RouteMetricsError::DegenerateRoute {
                name: String::new(),
                message: format!(
                    "cannot rate d={}km h={}m over t={}h",
                    distance_km, gain_m, hours
                ),
            });
        }

        let d = distance_km * 1000.0;
        let t = hours * 3600.0;

        let beats = self.total_heartbeats(d, gain_m, t);
        let reserve = beats - self.resting_hr * t / 60.0;
        let max_reserve = (self.max_hr - self.resting_hr) * t / 60.0;

        Ok(100.0 * reserve / max_reserve)
    }

    /// Classify a route with this model.
    pub fn classify(&self, distance_km: f64, gain_m: f64, hours: f64) -> Result<Difficulty> {
        self.reserve_percentage(distance_km, gain_m, hours)
            .map(Difficulty::from_reserve_percentage)
    }
}

impl Default for HeartRateModel {
    fn default() -> Self {
        Self::for_age(30)
    }
}

/// Estimated hiking time in hours: 4 km/h on the flat plus 1 h per 250 m of ascent.
pub fn estimated_hours(distance_km: f64, gain_m: f64) -> f64 {
    distance_km / 4.0 + gain_m / 250.0
}

/// Classify a route with the default reference hiker.
pub fn classify_difficulty(distance_km: f64, gain_m: f64, hours: f64) -> Result<Difficulty> {
    HeartRateModel::default().classify(distance_km, gain_m, hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        // Fixed two-hour outing over 5 km, increasing climb
        assert_eq!(classify_difficulty(5.0, 0.0, 2.0).unwrap(), Difficulty::Easy); // ~22.9%
        assert_eq!(classify_difficulty(5.0, 400.0, 2.0).unwrap(), Difficulty::Moderate); // ~38.7%
        assert_eq!(classify_difficulty(5.0, 1200.0, 2.0).unwrap(), Difficulty::Hard); // ~70.3%
        assert_eq!(classify_difficulty(5.0, 2000.0, 2.0).unwrap(), Difficulty::Expert); // ~101.9%
    }

    #[test]
    fn test_reserve_percentage_value() {
        let pct = HeartRateModel::default()
            .reserve_percentage(5.0, 0.0, 2.0)
            .unwrap();
        assert!((pct - 22.86).abs() < 0.05);
    }

    #[test]
    fn test_monotonic_in_distance_and_gain() {
        let hours = 3.0;
        let mut previous = Difficulty::Easy;
        for d in 0..40 {
            let level = classify_difficulty(d as f64, 300.0, hours).unwrap();
            assert!(level >= previous);
            previous = level;
        }

        let mut previous = Difficulty::Easy;
        for h in 0..40 {
            let level = classify_difficulty(8.0, h as f64 * 100.0, hours).unwrap();
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_zero_duration_is_degenerate() {
        let result = classify_difficulty(0.0, 0.0, 0.0);
        assert!(matches!(result, Err(RouteMetricsError::DegenerateRoute { .. })));
    }

    #[test]
    fn test_nan_duration_is_degenerate() {
        assert!(classify_difficulty(1.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_estimated_hours() {
        assert!((estimated_hours(8.0, 500.0) - 4.0).abs() < 1e-12);
        assert_eq!(estimated_hours(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("中等".parse::<Difficulty>(), Ok(Difficulty::Moderate));
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_for_age() {
        let model = HeartRateModel::for_age(30);
        assert_eq!(model.max_hr, 190.0);
        assert_eq!(HeartRateModel::for_age(50).max_hr, 170.0);
    }

    #[test]
    fn test_default_is_thirty_year_old() {
        let model = HeartRateModel::default();
        assert_eq!(model.max_hr, HeartRateModel::for_age(30).max_hr);
        assert_eq!(model.resting_hr, 60.0);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Moderate).unwrap(),
            "\"moderate\""
        );
    }
}
