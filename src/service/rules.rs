use crate::Probability;
use chrono::NaiveDate;
use serde::Serialize;

/// per-category amount policy: the typical range and the hard ceiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub min: f64,
    pub max: f64,
    pub hard_max: f64,
}

/// amount policy for a category, case-insensitive; unknown categories
/// carry no policy and fall through to the base bands
pub fn policy(category: &str) -> Option<Policy> {
    match category.to_lowercase().as_str() {
        "meals" => Some(Policy { min: 5., max: 300., hard_max: 1500. }),
        "transport" => Some(Policy { min: 10., max: 800., hard_max: 5000. }),
        "taxi" => Some(Policy { min: 10., max: 300., hard_max: 2000. }),
        "toll" => Some(Policy { min: 2., max: 200., hard_max: 5000. }),
        "lodging" => Some(Policy { min: 80., max: 600., hard_max: 5000. }),
        _ => None,
    }
}

/// discretized risk of a scored expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    VeryLow,
    Low,
    Medium,
    High,
}

/// the positive check the API applies before scoring.
/// the category is accepted for future per-category floors.
pub fn validate_amount(_category: &str, amount: f64) -> Option<&'static str> {
    match amount > 0. {
        true => None,
        false => Some("amount must be greater than zero"),
    }
}

/// rule-based anomaly flags, independent of the model score
pub fn anomalies(
    category: &str,
    amount: f64,
    request: NaiveDate,
    travel: NaiveDate,
) -> Vec<&'static str> {
    let mut flags = vec![];
    if amount <= 0. {
        flags.push("amount is not positive");
    }
    if let Some(p) = policy(category) {
        if amount > p.hard_max {
            flags.push("amount above the category hard maximum");
        } else if amount > p.max {
            flags.push("amount above the typical category range");
        } else if amount < p.min {
            flags.push("amount below the typical category range");
        }
    }
    if travel < request {
        flags.push("travel date precedes the request");
    }
    flags
}

/// base bands on the calibrated probability alone
fn band(p: Probability) -> Risk {
    match p {
        _ if p >= 0.95 => Risk::High,
        _ if p >= 0.7 => Risk::Medium,
        _ if p >= 0.5 => Risk::Low,
        _ => Risk::VeryLow,
    }
}

/// base bands nudged by the category amount policy
fn banded(p: Probability, category: &str, amount: f64) -> Risk {
    let base = band(p);
    match policy(category) {
        None => base,
        Some(r) if amount > r.max => match p < 0.7 {
            true => Risk::Medium,
            false => Risk::High,
        },
        Some(r) if amount < r.min && p < 0.7 => Risk::Low,
        _ => base,
    }
}

/// final banding: critical anomalies override everything, an
/// over-range amount lifts a very low score to medium
pub fn risk(
    p: Probability,
    category: &str,
    amount: f64,
    request: NaiveDate,
    travel: NaiveDate,
) -> Risk {
    let base = banded(p, category, amount);
    let over = policy(category);
    let critical = amount <= 0.
        || travel < request
        || over.map_or(false, |r| amount > r.hard_max);
    if critical {
        return Risk::High;
    }
    match over {
        Some(r) if amount > r.max && base == Risk::VeryLow => Risk::Medium,
        _ => base,
    }
}

/// fallback scorer for when no trained artifact is available: a few
/// hand rules over the same feature vector, capped below certainty
pub fn heuristic(v: &[f64]) -> Probability {
    let mut s: f64 = 0.05;
    if v[4] == 1. {
        s += 0.35; // approver is requester
    }
    if v[5] == 1. {
        s += 0.1; // requester travels
    }
    if v[6] == 1. {
        s += 0.15; // whole amount
    }
    if v[7] == 1. {
        s += 0.15; // multiple of five
    }
    if v[v.len() - 3] == 1. && v[0] > 200. {
        s += 0.2; // expensive taxi
    }
    if v[1] < 0. {
        s += 0.3; // trip before request
    }
    s.min(0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn base_bands_cut_at_the_documented_scores() {
        assert!(band(0.96) == Risk::High);
        assert!(band(0.95) == Risk::High);
        assert!(band(0.7) == Risk::Medium);
        assert!(band(0.5) == Risk::Low);
        assert!(band(0.49) == Risk::VeryLow);
    }

    #[test]
    fn unknown_categories_keep_the_base_band() {
        assert!(risk(0.6, "supplies", 999999., day(1), day(2)) == Risk::Low);
    }

    #[test]
    fn over_range_amounts_escalate_by_probability() {
        // above the taxi typical range but under the hard ceiling
        assert!(risk(0.2, "taxi", 400., day(1), day(2)) == Risk::Medium);
        assert!(risk(0.8, "taxi", 400., day(1), day(2)) == Risk::High);
    }

    #[test]
    fn under_range_amounts_calm_a_low_score() {
        assert!(risk(0.55, "lodging", 20., day(1), day(2)) == Risk::Low);
    }

    #[test]
    fn critical_anomalies_always_read_high() {
        // inverted dates
        assert!(risk(0.01, "meals", 50., day(9), day(2)) == Risk::High);
        // non-positive amount
        assert!(risk(0.01, "meals", 0., day(1), day(2)) == Risk::High);
        // above the hard ceiling
        assert!(risk(0.01, "taxi", 2500., day(1), day(2)) == Risk::High);
    }

    #[test]
    fn flags_name_each_anomaly() {
        let flags = anomalies("taxi", 2500., day(9), day(2));
        assert!(flags.contains(&"amount above the category hard maximum"));
        assert!(flags.contains(&"travel date precedes the request"));
        assert!(anomalies("meals", 50., day(1), day(2)).is_empty());
    }

    #[test]
    fn the_amount_check_only_rejects_nonpositive() {
        assert!(validate_amount("meals", 10.).is_none());
        assert!(validate_amount("meals", 0.).is_some());
        assert!(validate_amount("anything", -5.).is_some());
    }

    #[test]
    fn the_heuristic_is_a_capped_probability() {
        let mut v = vec![0.; crate::features::WIDTH];
        v[0] = 250.;
        assert!((heuristic(&v) - 0.05).abs() < 1e-12);
        v[4] = 1.;
        v[5] = 1.;
        v[6] = 1.;
        v[7] = 1.;
        v[10] = 1.; // taxi slot
        v[1] = -2.;
        assert!(heuristic(&v) == 0.95);
    }

    #[test]
    fn risk_serializes_in_snake_case() {
        assert!(serde_json::to_string(&Risk::VeryLow).unwrap() == "\"very_low\"");
        assert!(serde_json::to_string(&Risk::High).unwrap() == "\"high\"");
    }
}
