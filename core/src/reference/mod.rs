//! Gestational-age reference data and the rule-based evaluator
//!
//! Each target has its own rules:
//! - [`brain`]: BPD and HC within a relative band, plus a combined summary
//! - [`cerebellum`]: TCD within an absolute tolerance of the expected diameter
//! - [`ventricle`]: LVW below a one-sided limit, with severity tiers above it

pub mod brain;
pub mod cerebellum;
mod table;
pub mod ventricle;
mod verdict;

pub use brain::BrainSummary;
pub use table::{ReferenceData, ReferenceRow, STANDARD_ROWS};
pub use verdict::{Evaluation, Verdict};

use crate::error::{FetalscanError, Result};
use crate::processing::Measurement;
use crate::types::{GestationalAge, MeasurementKind, Target};
use log::info;

/// Classifies measurements against a [`ReferenceData`] table
///
/// Stateless apart from the read-only table; every call is independent.
///
/// # Example
///
/// ```
/// use fetalscan_core::{GestationalAge, ReferenceEvaluator, Status};
///
/// let evaluator = ReferenceEvaluator::default();
/// let evaluation = evaluator
///     .evaluate_brain(48.0, 190.0, GestationalAge::new(20))
///     .unwrap();
///
/// assert_eq!(evaluation.verdicts[0].status, Status::Normal);
/// assert_eq!(evaluation.verdicts[1].status, Status::Abnormal);
/// assert_eq!(evaluation.summary, "HC measurement is abnormal while BPD is normal.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReferenceEvaluator {
    reference: ReferenceData,
}

impl ReferenceEvaluator {
    pub fn new(reference: ReferenceData) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Checks that `age` is usable for every measurement of `target`
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeGestationalAge` if the target's age policy rejects it
    pub fn check_age(&self, target: Target, age: GestationalAge) -> Result<()> {
        for &kind in target.measurements() {
            self.reference.expected(kind, age)?;
        }
        Ok(())
    }

    /// Evaluates BPD and HC together
    pub fn evaluate_brain(
        &self,
        bpd_mm: f64,
        hc_mm: f64,
        age: GestationalAge,
    ) -> Result<Evaluation> {
        let ratio = self.reference.evaluation().brain_tolerance_ratio;
        let bpd = brain::evaluate_head(
            MeasurementKind::Bpd,
            bpd_mm,
            self.reference.expected(MeasurementKind::Bpd, age)?,
            ratio,
            age,
        );
        let hc = brain::evaluate_head(
            MeasurementKind::Hc,
            hc_mm,
            self.reference.expected(MeasurementKind::Hc, age)?,
            ratio,
            age,
        );
        let summary = BrainSummary::from_statuses(bpd.status, hc.status);

        Ok(Evaluation {
            verdicts: vec![bpd, hc],
            summary: summary.message().to_string(),
        })
    }

    /// Evaluates a transverse cerebellar diameter
    pub fn evaluate_tcd(&self, tcd_mm: f64, age: GestationalAge) -> Result<Evaluation> {
        let expected = self.reference.expected(MeasurementKind::Tcd, age)?;
        let verdict = cerebellum::evaluate_tcd(
            tcd_mm,
            expected,
            self.reference.evaluation().tcd_tolerance_mm,
            age,
        );
        let summary = if verdict.is_normal() {
            cerebellum::SUMMARY_NORMAL
        } else {
            cerebellum::SUMMARY_ABNORMAL
        };

        Ok(Evaluation {
            verdicts: vec![verdict],
            summary: summary.to_string(),
        })
    }

    /// Evaluates a lateral ventricular width
    pub fn evaluate_lvw(&self, lvw_mm: f64, age: GestationalAge) -> Result<Evaluation> {
        let max = self.reference.expected(MeasurementKind::Lvw, age)?;
        let verdict = ventricle::evaluate_lvw(
            lvw_mm,
            max,
            self.reference.evaluation().lvw_severe_mm,
            age,
        );
        let summary = if verdict.is_normal() {
            ventricle::SUMMARY_NORMAL
        } else {
            ventricle::SUMMARY_ABNORMAL
        };

        Ok(Evaluation {
            verdicts: vec![verdict],
            summary: summary.to_string(),
        })
    }

    /// Evaluates the measurements produced for `target`
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if a measurement the target needs is missing,
    /// or `OutOfRangeGestationalAge` if the age is rejected
    pub fn evaluate(
        &self,
        target: Target,
        measurements: &[Measurement],
        age: GestationalAge,
    ) -> Result<Evaluation> {
        let value = |kind: MeasurementKind| {
            measurements
                .iter()
                .find(|m| m.kind == kind)
                .map(|m| m.value_mm)
                .ok_or_else(|| {
                    FetalscanError::InvalidValue(format!("Missing {} measurement", kind))
                })
        };

        let evaluation = match target {
            Target::Brain => {
                self.evaluate_brain(value(MeasurementKind::Bpd)?, value(MeasurementKind::Hc)?, age)?
            }
            Target::Cerebellum => self.evaluate_tcd(value(MeasurementKind::Tcd)?, age)?,
            Target::Ventricle => self.evaluate_lvw(value(MeasurementKind::Lvw)?, age)?,
        };
        info!("{} at {}: {}", target, age, evaluation.summary);
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, Status};
    use rstest::rstest;

    #[rstest]
    #[case(17, 18)]
    #[case(18, 18)]
    #[case(24, 24)]
    #[case(25, 24)]
    fn test_ventricle_age_clamps_to_table(#[case] weeks: u32, #[case] row_weeks: u32) {
        // A table whose limit differs per row shows which row was used
        let rows = STANDARD_ROWS
            .iter()
            .map(|r| ReferenceRow {
                lvw_max_mm: r.weeks as f64,
                ..*r
            })
            .collect();
        let reference = ReferenceData::new(rows, Default::default()).unwrap();
        let evaluation = ReferenceEvaluator::new(reference)
            .evaluate_lvw(5.0, GestationalAge::new(weeks))
            .unwrap();
        assert_eq!(evaluation.verdicts[0].expected_mm, row_weeks as f64);
        // Narrative keeps the requested age
        assert!(evaluation.verdicts[0]
            .detail
            .contains(&format!("gestational age {} weeks", weeks)));
    }

    #[test]
    fn test_brain_rejects_out_of_range_age() {
        let evaluator = ReferenceEvaluator::default();
        let err = evaluator
            .evaluate_brain(48.0, 170.0, GestationalAge::new(25))
            .unwrap_err();
        assert!(matches!(err, FetalscanError::OutOfRangeGestationalAge { .. }));
        assert!(evaluator.check_age(Target::Brain, GestationalAge::new(17)).is_err());
        assert!(evaluator.check_age(Target::Ventricle, GestationalAge::new(17)).is_ok());
        assert!(evaluator.check_age(Target::Cerebellum, GestationalAge::new(30)).is_ok());
    }

    #[rstest]
    #[case(22.0, "TCD normal")]
    #[case(22.01, "TCD abnormal")]
    fn test_tcd_summary_at_week_20(#[case] value: f64, #[case] summary: &str) {
        let evaluation = ReferenceEvaluator::default()
            .evaluate_tcd(value, GestationalAge::new(20))
            .unwrap();
        assert_eq!(evaluation.summary, summary);
    }

    #[test]
    fn test_tcd_outside_table_uses_weeks() {
        let evaluation = ReferenceEvaluator::default()
            .evaluate_tcd(31.0, GestationalAge::new(30))
            .unwrap();
        assert_eq!(evaluation.verdicts[0].expected_mm, 30.0);
        assert!(evaluation.is_normal());
    }

    #[test]
    fn test_lvw_summary() {
        let evaluator = ReferenceEvaluator::default();
        let normal = evaluator.evaluate_lvw(9.99, GestationalAge::new(20)).unwrap();
        assert_eq!(normal.summary, "LVW measurement was normal");

        let mild = evaluator.evaluate_lvw(10.0, GestationalAge::new(20)).unwrap();
        assert_eq!(mild.summary, "LVW measurement was abnormal");
        assert_eq!(mild.verdicts[0].severity, Some(Severity::Mild));
    }

    #[test]
    fn test_evaluate_dispatches_by_target() {
        let evaluator = ReferenceEvaluator::default();
        let measurements = [
            Measurement {
                kind: MeasurementKind::Bpd,
                value_mm: 40.0,
            },
            Measurement {
                kind: MeasurementKind::Hc,
                value_mm: 230.0,
            },
        ];
        let evaluation = evaluator
            .evaluate(Target::Brain, &measurements, GestationalAge::new(20))
            .unwrap();
        assert_eq!(evaluation.summary, "Both BPD and HC measurements are abnormal.");
        assert_eq!(
            evaluation.verdict(MeasurementKind::Hc).unwrap().status,
            Status::Abnormal
        );

        let err = evaluator
            .evaluate(Target::Cerebellum, &measurements, GestationalAge::new(20))
            .unwrap_err();
        assert!(matches!(err, FetalscanError::InvalidValue(_)));
    }

    #[test]
    fn test_custom_tolerance() {
        let evaluation = crate::types::EvaluationConfig::default().with_tcd_tolerance_mm(3.0);
        let evaluator = ReferenceEvaluator::new(ReferenceData::with_evaluation(evaluation).unwrap());
        let result = evaluator.evaluate_tcd(23.0, GestationalAge::new(20)).unwrap();
        assert!(result.is_normal());
    }
}
