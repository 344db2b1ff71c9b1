//! Deterministic point scoring of a resolved metric record.

use std::fmt;

use serde::Serialize;

use crate::metrics::MetricRecord;

/// Scoring thresholds. These constants and their comparison directions are
/// the contract; a record earns one point per satisfied criterion.
const PBR_CEILING: f64 = 1.0;
const ROE_FLOOR: f64 = 10.0;
const EQUITY_RATIO_FLOOR: f64 = 50.0;
const REVENUE_GROWTH_FLOOR: f64 = 5.0;
const DIVIDEND_PAYOUT_FLOOR: f64 = 30.0;

/// Ordinal investment grade, best to worst.
///
/// Derive order follows declaration order, so `Grade::A < Grade::E`:
/// a *smaller* `Grade` is a *better* one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Maps a 0–5 point score to a grade.
    ///
    /// | Score | Grade |
    /// |-------|-------|
    /// | 5     | A     |
    /// | 4     | B     |
    /// | 3     | C     |
    /// | 2     | D     |
    /// | 1, 0  | E     |
    ///
    /// Scores 0 and 1 both collapse to E; the scale stays five grades wide.
    pub fn from_score(score: u8) -> Grade {
        match score {
            5 => Grade::A,
            4 => Grade::B,
            3 => Grade::C,
            2 => Grade::D,
            _ => Grade::E,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts satisfied criteria: below-book valuation, profitability, solvency,
/// growth, and shareholder return. Each is worth exactly one point.
pub fn score(record: &MetricRecord) -> u8 {
    let mut points = 0;
    if record.pbr < PBR_CEILING {
        points += 1;
    }
    if record.roe > ROE_FLOOR {
        points += 1;
    }
    if record.equity_ratio > EQUITY_RATIO_FLOOR {
        points += 1;
    }
    if record.revenue_growth > REVENUE_GROWTH_FLOOR {
        points += 1;
    }
    if record.dividend_payout > DIVIDEND_PAYOUT_FLOOR {
        points += 1;
    }
    points
}

/// Grades a resolved record. Total and pure: a record that reached this
/// stage always gets a grade.
pub fn grade(record: &MetricRecord) -> Grade {
    Grade::from_score(score(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        pbr: f64,
        roe: f64,
        equity_ratio: f64,
        revenue_growth: f64,
        dividend_payout: f64,
    ) -> MetricRecord {
        MetricRecord {
            name: "テスト".to_string(),
            pbr,
            roe,
            equity_ratio,
            revenue_growth,
            dividend_payout,
            current_ratio: None,
            liquidation_value: None,
            market_cap: None,
        }
    }

    #[test]
    fn test_all_criteria_pass_scores_five() {
        let r = record(0.85, 12.5, 55.0, 8.2, 35.0);
        assert_eq!(score(&r), 5);
        assert_eq!(grade(&r), Grade::A);
    }

    #[test]
    fn test_no_criteria_pass_scores_zero() {
        let r = record(1.2, 9.0, 45.0, 3.0, 20.0);
        assert_eq!(score(&r), 0);
        assert_eq!(grade(&r), Grade::E);
    }

    #[test]
    fn test_score_to_grade_table() {
        assert_eq!(Grade::from_score(5), Grade::A);
        assert_eq!(Grade::from_score(4), Grade::B);
        assert_eq!(Grade::from_score(3), Grade::C);
        assert_eq!(Grade::from_score(2), Grade::D);
        assert_eq!(Grade::from_score(1), Grade::E);
        assert_eq!(Grade::from_score(0), Grade::E);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Values exactly at a threshold earn no point.
        let r = record(1.0, 10.0, 50.0, 5.0, 30.0);
        assert_eq!(score(&r), 0);

        // Just inside every threshold earns all five.
        let r = record(0.999, 10.001, 50.001, 5.001, 30.001);
        assert_eq!(score(&r), 5);
    }

    #[test]
    fn test_each_criterion_worth_one_point() {
        let fail = record(1.2, 9.0, 45.0, 3.0, 20.0);
        let singles = [
            record(0.9, 9.0, 45.0, 3.0, 20.0),
            record(1.2, 11.0, 45.0, 3.0, 20.0),
            record(1.2, 9.0, 55.0, 3.0, 20.0),
            record(1.2, 9.0, 45.0, 6.0, 20.0),
            record(1.2, 9.0, 45.0, 3.0, 31.0),
        ];
        assert_eq!(score(&fail), 0);
        for r in &singles {
            assert_eq!(score(r), 1);
            assert_eq!(grade(r), Grade::E);
        }
    }

    #[test]
    fn test_monotonic_in_each_criterion() {
        // Flipping any single criterion from failing to passing never makes
        // the grade worse (Grade derives Ord with A smallest/best).
        let bases = [
            record(1.2, 9.0, 45.0, 3.0, 20.0),
            record(0.9, 11.0, 45.0, 3.0, 20.0),
            record(0.9, 11.0, 55.0, 6.0, 20.0),
            record(0.9, 11.0, 55.0, 6.0, 31.0),
        ];
        for base in &bases {
            let improved = [
                MetricRecord { pbr: 0.5, ..base.clone() },
                MetricRecord { roe: 20.0, ..base.clone() },
                MetricRecord { equity_ratio: 70.0, ..base.clone() },
                MetricRecord { revenue_growth: 9.0, ..base.clone() },
                MetricRecord { dividend_payout: 40.0, ..base.clone() },
            ];
            for better in &improved {
                assert!(grade(better) <= grade(base));
            }
        }
    }

    #[test]
    fn test_score_is_idempotent() {
        let r = record(0.85, 12.5, 55.0, 8.2, 35.0);
        assert_eq!(grade(&r), grade(&r));
        assert_eq!(score(&r), score(&r));
    }

    #[test]
    fn test_optional_fields_never_move_the_grade() {
        let mut r = record(0.85, 12.5, 55.0, 8.2, 35.0);
        r.current_ratio = Some(10.0);
        r.liquidation_value = Some(-5000.0);
        r.market_cap = Some(1.0);
        assert_eq!(grade(&r), Grade::A);
    }
}
