use crate::error::{FetalscanError, Result};
use crate::types::{AgePolicy, EvaluationConfig, GestationalAge, MeasurementKind};
use log::debug;
#[cfg(feature = "json")]
use std::path::Path;

/// Expected biometry for one gestational week
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceRow {
    pub weeks: u32,
    pub hc_mm: f64,
    pub bpd_mm: f64,
    pub tcd_mm: f64,
    /// Upper bound (exclusive) of a normal lateral ventricle width
    pub lvw_max_mm: f64,
}

impl ReferenceRow {
    pub const fn new(weeks: u32, hc_mm: f64, bpd_mm: f64, tcd_mm: f64, lvw_max_mm: f64) -> Self {
        Self {
            weeks,
            hc_mm,
            bpd_mm,
            tcd_mm,
            lvw_max_mm,
        }
    }

    /// Reference value of one measurement
    pub fn value(&self, kind: MeasurementKind) -> f64 {
        match kind {
            MeasurementKind::Bpd => self.bpd_mm,
            MeasurementKind::Hc => self.hc_mm,
            MeasurementKind::Tcd => self.tcd_mm,
            MeasurementKind::Lvw => self.lvw_max_mm,
        }
    }
}

/// Weeks 18 to 24
pub const STANDARD_ROWS: [ReferenceRow; 7] = [
    ReferenceRow::new(18, 145.0, 42.0, 18.0, 10.0),
    ReferenceRow::new(19, 155.0, 45.0, 19.0, 10.0),
    ReferenceRow::new(20, 170.0, 48.0, 20.0, 10.0),
    ReferenceRow::new(21, 180.0, 50.0, 21.0, 10.0),
    ReferenceRow::new(22, 190.0, 53.0, 22.0, 10.0),
    ReferenceRow::new(23, 200.0, 56.0, 23.0, 10.0),
    ReferenceRow::new(24, 210.0, 59.0, 24.0, 10.0),
];

/// Gestational-age reference table plus the tolerances applied to it
///
/// Read-only once built; share it between evaluators freely.
///
/// # Example
///
/// ```
/// use fetalscan_core::{GestationalAge, MeasurementKind, ReferenceData};
///
/// let reference = ReferenceData::default();
/// let bpd = reference
///     .expected(MeasurementKind::Bpd, GestationalAge::new(20))
///     .unwrap();
/// assert_eq!(bpd, 48.0);
///
/// // Outside the table the cerebellum falls back to "TCD in mm = weeks"
/// let tcd = reference
///     .expected(MeasurementKind::Tcd, GestationalAge::new(30))
///     .unwrap();
/// assert_eq!(tcd, 30.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceData {
    rows: Vec<ReferenceRow>,
    #[cfg_attr(feature = "json", serde(default))]
    evaluation: EvaluationConfig,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            rows: STANDARD_ROWS.to_vec(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl ReferenceData {
    /// Builds a reference table
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the rows are empty, not consecutive weeks in
    /// ascending order, contain non-positive values, or the tolerances are invalid
    pub fn new(rows: Vec<ReferenceRow>, evaluation: EvaluationConfig) -> Result<Self> {
        if rows.is_empty() {
            return Err("Reference table has no rows".into());
        }
        for pair in rows.windows(2) {
            if pair[1].weeks != pair[0].weeks + 1 {
                return Err(format!(
                    "Reference table weeks must be consecutive, found {} after {}",
                    pair[1].weeks, pair[0].weeks
                )
                .into());
            }
        }
        for row in &rows {
            let values = [row.hc_mm, row.bpd_mm, row.tcd_mm, row.lvw_max_mm];
            if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(format!(
                    "Reference values for week {} must be positive",
                    row.weeks
                )
                .into());
            }
        }
        evaluation.validate()?;
        Ok(Self { rows, evaluation })
    }

    /// Standard table with custom tolerances
    pub fn with_evaluation(evaluation: EvaluationConfig) -> Result<Self> {
        Self::new(STANDARD_ROWS.to_vec(), evaluation)
    }

    /// Parses a table from JSON (`{"rows": [...], "evaluation": {...}}`)
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: ReferenceData = serde_json::from_str(s)
            .map_err(|e| FetalscanError::InvalidValue(format!("Invalid reference table: {}", e)))?;
        Self::new(raw.rows, raw.evaluation)
    }

    /// Loads a table from a JSON file
    #[cfg(feature = "json")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn evaluation(&self) -> &EvaluationConfig {
        &self.evaluation
    }

    pub fn min_weeks(&self) -> u32 {
        self.rows.first().map_or(0, |r| r.weeks)
    }

    pub fn max_weeks(&self) -> u32 {
        self.rows.last().map_or(0, |r| r.weeks)
    }

    /// Row of exactly `weeks`, if the table covers it
    pub fn row(&self, weeks: u32) -> Option<&ReferenceRow> {
        self.rows.iter().find(|r| r.weeks == weeks)
    }

    /// Expected value of `kind` at `age`, honoring the target's age policy
    ///
    /// - `Reject`: ages outside the table are an error
    /// - `Clamp`: ages outside the table use the first or last row
    /// - `RuleOfThumb`: ages outside the table expect TCD in mm equal to the
    ///   age in weeks; other measurements have no rule and are rejected
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeGestationalAge` when the policy rejects the age
    pub fn expected(&self, kind: MeasurementKind, age: GestationalAge) -> Result<f64> {
        let weeks = age.weeks();
        if let Some(row) = self.row(weeks) {
            return Ok(row.value(kind));
        }

        let target = kind.target();
        match self.evaluation.age_policies.policy_for(target) {
            AgePolicy::Clamp => {
                let clamped = weeks.clamp(self.min_weeks(), self.max_weeks());
                debug!(
                    "Gestational age {} clamped to {} weeks for {}",
                    age, clamped, target
                );
                self.row(clamped)
                    .map(|row| row.value(kind))
                    .ok_or_else(|| self.out_of_range(kind, weeks))
            }
            AgePolicy::RuleOfThumb if kind == MeasurementKind::Tcd => Ok(weeks as f64),
            AgePolicy::RuleOfThumb | AgePolicy::Reject => Err(self.out_of_range(kind, weeks)),
        }
    }

    fn out_of_range(&self, kind: MeasurementKind, weeks: u32) -> FetalscanError {
        FetalscanError::OutOfRangeGestationalAge {
            target: kind.target(),
            weeks,
            min: self.min_weeks(),
            max: self.max_weeks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Target;
    use rstest::rstest;

    #[rstest]
    #[case(17, Err(()))]
    #[case(18, Ok(42.0))]
    #[case(24, Ok(59.0))]
    #[case(25, Err(()))]
    fn test_brain_rejects_outside_table(
        #[case] weeks: u32,
        #[case] expected: std::result::Result<f64, ()>,
    ) {
        let reference = ReferenceData::default();
        let result = reference
            .expected(MeasurementKind::Bpd, GestationalAge::new(weeks))
            .map_err(|_| ());
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(10, 10.0)]
    #[case(20, 20.0)]
    #[case(30, 30.0)]
    fn test_tcd_rule_of_thumb(#[case] weeks: u32, #[case] expected: f64) {
        let reference = ReferenceData::default();
        let value = reference
            .expected(MeasurementKind::Tcd, GestationalAge::new(weeks))
            .unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_out_of_range_error_names_table_bounds() {
        let err = ReferenceData::default()
            .expected(MeasurementKind::Hc, GestationalAge::new(30))
            .unwrap_err();
        match err {
            FetalscanError::OutOfRangeGestationalAge {
                target,
                weeks,
                min,
                max,
            } => {
                assert_eq!(target, Target::Brain);
                assert_eq!((weeks, min, max), (30, 18, 24));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_clamp_policy_can_be_applied_to_brain() {
        let evaluation =
            EvaluationConfig::default().with_age_policy(Target::Brain, AgePolicy::Clamp);
        let reference = ReferenceData::with_evaluation(evaluation).unwrap();
        assert_eq!(
            reference
                .expected(MeasurementKind::Bpd, GestationalAge::new(30))
                .unwrap(),
            59.0
        );
    }

    #[test]
    fn test_rule_of_thumb_does_not_extend_to_brain() {
        let evaluation =
            EvaluationConfig::default().with_age_policy(Target::Brain, AgePolicy::RuleOfThumb);
        let reference = ReferenceData::with_evaluation(evaluation).unwrap();
        assert!(reference
            .expected(MeasurementKind::Bpd, GestationalAge::new(30))
            .is_err());
    }

    #[test]
    fn test_table_validation() {
        let evaluation = EvaluationConfig::default();
        assert!(ReferenceData::new(vec![], evaluation.clone()).is_err());

        let gap = vec![STANDARD_ROWS[0], STANDARD_ROWS[2]];
        assert!(ReferenceData::new(gap, evaluation.clone()).is_err());

        let mut bad = STANDARD_ROWS.to_vec();
        bad[3].bpd_mm = 0.0;
        assert!(ReferenceData::new(bad, evaluation.clone()).is_err());

        let invalid_tolerance = evaluation.with_tcd_tolerance_mm(f64::NAN);
        assert!(ReferenceData::with_evaluation(invalid_tolerance).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rows": [
                {{"weeks": 20, "hc_mm": 170.0, "bpd_mm": 48.0, "tcd_mm": 20.0, "lvw_max_mm": 10.0}},
                {{"weeks": 21, "hc_mm": 180.0, "bpd_mm": 50.0, "tcd_mm": 21.0, "lvw_max_mm": 11.0}}
            ]}}"#
        )
        .unwrap();

        let reference = ReferenceData::from_file(file.path()).unwrap();
        assert_eq!((reference.min_weeks(), reference.max_weeks()), (20, 21));
        assert_eq!(reference.evaluation(), &EvaluationConfig::default());
        assert_eq!(
            reference
                .expected(MeasurementKind::Lvw, GestationalAge::new(25))
                .unwrap(),
            11.0
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ReferenceData::from_json_str("{\"rows\": 3}"),
            Err(FetalscanError::InvalidValue(_))
        ));
    }
}
