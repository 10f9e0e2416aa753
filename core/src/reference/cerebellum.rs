use super::verdict::Verdict;
use crate::types::{Deviation, GestationalAge, MeasurementKind, Status};

pub const SUMMARY_NORMAL: &str = "TCD normal";
pub const SUMMARY_ABNORMAL: &str = "TCD abnormal";

/// Classifies a transverse cerebellar diameter
///
/// Normal iff `|value - expected| <= tolerance`. Abnormal values are low
/// when below the expected diameter, high otherwise.
pub fn evaluate_tcd(
    value_mm: f64,
    expected_mm: f64,
    tolerance_mm: f64,
    age: GestationalAge,
) -> Verdict {
    let weeks = age.weeks();

    if (value_mm - expected_mm).abs() <= tolerance_mm {
        return Verdict {
            kind: MeasurementKind::Tcd,
            measurement_mm: value_mm,
            expected_mm,
            status: Status::Normal,
            deviation: None,
            severity: None,
            detail: format!(
                "TCD was {:.2}mm which is within the normal range for {} weeks gestational age.",
                value_mm, weeks
            ),
            recommendation: None,
        };
    }

    let deviation = if value_mm < expected_mm {
        Deviation::Low
    } else {
        Deviation::High
    };
    let recommendation = match deviation {
        Deviation::Low => {
            "Please perform more tests to narrow down causes. Low TCD may indicate cerebellar \
             hypoplasia, which can be associated with genetic syndromes (e.g., Dandy-Walker), \
             infections, or ischemia."
        }
        Deviation::High => {
            "Please perform more tests to narrow down causes. High TCD measurements are rare \
             and might indicate advanced development, macrosomia, or misdated gestation."
        }
    };

    Verdict {
        kind: MeasurementKind::Tcd,
        measurement_mm: value_mm,
        expected_mm,
        status: Status::Abnormal,
        deviation: Some(deviation),
        severity: None,
        detail: format!(
            "TCD was {:.2}mm which is outside normal range for {} weeks gestational age.",
            value_mm, weeks
        ),
        recommendation: Some(recommendation.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(20.0, Status::Normal, None)]
    #[case(22.0, Status::Normal, None)]
    #[case(18.0, Status::Normal, None)]
    #[case(22.01, Status::Abnormal, Some(Deviation::High))]
    #[case(17.99, Status::Abnormal, Some(Deviation::Low))]
    fn test_tolerance_is_inclusive(
        #[case] value: f64,
        #[case] status: Status,
        #[case] deviation: Option<Deviation>,
    ) {
        let verdict = evaluate_tcd(value, 20.0, 2.0, GestationalAge::new(20));
        assert_eq!(verdict.status, status);
        assert_eq!(verdict.deviation, deviation);
    }

    #[test]
    fn test_low_tcd_mentions_hypoplasia() {
        let verdict = evaluate_tcd(14.0, 20.0, 2.0, GestationalAge::new(20));
        assert_eq!(
            verdict.detail,
            "TCD was 14.00mm which is outside normal range for 20 weeks gestational age."
        );
        assert!(verdict.recommendation.unwrap().contains("cerebellar hypoplasia"));
    }

    #[test]
    fn test_high_tcd_mentions_misdating() {
        let verdict = evaluate_tcd(26.0, 20.0, 2.0, GestationalAge::new(20));
        assert!(verdict.recommendation.unwrap().contains("misdated gestation"));
    }
}
