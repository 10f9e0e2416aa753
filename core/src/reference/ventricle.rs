use super::verdict::Verdict;
use crate::types::{Deviation, GestationalAge, MeasurementKind, Severity, Status};

pub const SUMMARY_NORMAL: &str = "LVW measurement was normal";
pub const SUMMARY_ABNORMAL: &str = "LVW measurement was abnormal";

/// Classifies a lateral ventricular width against a one-sided limit
///
/// # Algorithm
///
/// 1. `value < max` → Normal
/// 2. `value < severe` → Abnormal, mild ventriculomegaly
/// 3. Otherwise → Abnormal, moderate to severe ventriculomegaly
pub fn evaluate_lvw(
    value_mm: f64,
    max_mm: f64,
    severe_mm: f64,
    age: GestationalAge,
) -> Verdict {
    let weeks = age.weeks();

    if value_mm < max_mm {
        return Verdict {
            kind: MeasurementKind::Lvw,
            measurement_mm: value_mm,
            expected_mm: max_mm,
            status: Status::Normal,
            deviation: None,
            severity: None,
            detail: format!(
                "The LVW measurement was {:.2}mm which is within the normal range (<{}mm) \
                 for gestational age {} weeks.",
                value_mm, max_mm, weeks
            ),
            recommendation: Some("Continue with routine prenatal care and monitoring.".into()),
        };
    }

    let severity = if value_mm < severe_mm {
        Severity::Mild
    } else {
        Severity::ModerateToSevere
    };

    Verdict {
        kind: MeasurementKind::Lvw,
        measurement_mm: value_mm,
        expected_mm: max_mm,
        status: Status::Abnormal,
        deviation: Some(Deviation::High),
        severity: Some(severity),
        detail: format!(
            "The LVW measurement was {:.2}mm which is outside the normal range (<{}mm) \
             for gestational age {} weeks, indicating {}.",
            value_mm,
            max_mm,
            weeks,
            severity.description()
        ),
        recommendation: Some(format!(
            "Please perform additional tests to narrow down potential causes including \
             obstructive hydrocephalus, neural tube defects, or agenesis of corpus callosum. {}",
            severity.prognosis()
        )),
    }
}
