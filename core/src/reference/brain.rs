//! Head biometry (BPD, HC) against a relative tolerance band

use super::verdict::Verdict;
use crate::types::{Deviation, GestationalAge, MeasurementKind, Status};
use std::fmt;

/// Classifies one head measurement
///
/// # Algorithm
///
/// 1. Band = expected x (1 - ratio) to expected x (1 + ratio), both ends inclusive
/// 2. Inside the band → Normal
/// 3. Below → Abnormal/Low, above → Abnormal/High, each with its own
///    differential for BPD and HC
pub fn evaluate_head(
    kind: MeasurementKind,
    value_mm: f64,
    expected_mm: f64,
    tolerance_ratio: f64,
    age: GestationalAge,
) -> Verdict {
    let lower = expected_mm * (1.0 - tolerance_ratio);
    let upper = expected_mm * (1.0 + tolerance_ratio);
    let weeks = age.weeks();

    let deviation = if value_mm < lower {
        Some(Deviation::Low)
    } else if value_mm > upper {
        Some(Deviation::High)
    } else {
        None
    };

    let Some(deviation) = deviation else {
        return Verdict {
            kind,
            measurement_mm: value_mm,
            expected_mm,
            status: Status::Normal,
            deviation: None,
            severity: None,
            detail: format!(
                "{} was {:.2} mm which is within the normal range for {} weeks GA.",
                kind, value_mm, weeks
            ),
            recommendation: None,
        };
    };

    let direction = match deviation {
        Deviation::Low => "below",
        Deviation::High => "above",
    };
    Verdict {
        kind,
        measurement_mm: value_mm,
        expected_mm,
        status: Status::Abnormal,
        deviation: Some(deviation),
        severity: None,
        detail: format!(
            "{} was {:.2} mm which is {} normal range for {} weeks GA.",
            kind, value_mm, direction, weeks
        ),
        recommendation: Some(differential(kind, deviation).to_string()),
    }
}

fn differential(kind: MeasurementKind, deviation: Deviation) -> &'static str {
    match (kind, deviation) {
        (MeasurementKind::Bpd, Deviation::Low) => {
            "This may indicate microcephaly or dolichocephaly (elongated head). \
             Please conduct additional tests to evaluate potential causes such as \
             fetal growth restriction, congenital infections, or genetic abnormalities."
        }
        (MeasurementKind::Bpd, Deviation::High) => {
            "This may indicate macrosomia or brachycephaly. \
             Common in maternal diabetes; might complicate delivery. \
             Please conduct additional tests for further evaluation."
        }
        (_, Deviation::Low) => {
            "This may indicate microcephaly. Possible causes include congenital infections \
             (e.g., Zika, CMV), genetic syndromes, fetal alcohol syndrome, or severe IUGR. \
             Please conduct additional tests for further evaluation."
        }
        (_, Deviation::High) => {
            "This may indicate macrocephaly or hydrocephalus. Possible causes include \
             enlarged ventricles, genetic syndromes, brain malformations, or benign familial \
             macrocephaly. Please conduct additional tests for further evaluation."
        }
    }
}

/// Combined classification of a BPD/HC pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum BrainSummary {
    BothNormal,
    BothAbnormal,
    BpdAbnormal,
    HcAbnormal,
}

impl BrainSummary {
    pub fn from_statuses(bpd: Status, hc: Status) -> Self {
        match (bpd, hc) {
            (Status::Normal, Status::Normal) => BrainSummary::BothNormal,
            (Status::Abnormal, Status::Abnormal) => BrainSummary::BothAbnormal,
            (Status::Abnormal, Status::Normal) => BrainSummary::BpdAbnormal,
            (Status::Normal, Status::Abnormal) => BrainSummary::HcAbnormal,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BrainSummary::BothNormal => "BPD and HC measurements are normal.",
            BrainSummary::BothAbnormal => "Both BPD and HC measurements are abnormal.",
            BrainSummary::BpdAbnormal => "BPD measurement is abnormal while HC is normal.",
            BrainSummary::HcAbnormal => "HC measurement is abnormal while BPD is normal.",
        }
    }
}

impl fmt::Display for BrainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(48.0, Status::Normal, None)]
    #[case(43.2, Status::Normal, None)]
    #[case(52.8, Status::Normal, None)]
    #[case(43.1, Status::Abnormal, Some(Deviation::Low))]
    #[case(52.9, Status::Abnormal, Some(Deviation::High))]
    fn test_bpd_band_at_week_20(
        #[case] value: f64,
        #[case] status: Status,
        #[case] deviation: Option<Deviation>,
    ) {
        let verdict = evaluate_head(
            MeasurementKind::Bpd,
            value,
            48.0,
            0.10,
            GestationalAge::new(20),
        );
        assert_eq!(verdict.status, status);
        assert_eq!(verdict.deviation, deviation);
    }

    #[test]
    fn test_normal_detail_text() {
        let verdict = evaluate_head(
            MeasurementKind::Hc,
            171.234,
            170.0,
            0.10,
            GestationalAge::new(20),
        );
        assert_eq!(
            verdict.detail,
            "HC was 171.23 mm which is within the normal range for 20 weeks GA."
        );
        assert!(verdict.recommendation.is_none());
    }

    #[rstest]
    #[case(MeasurementKind::Bpd, 30.0, "dolichocephaly")]
    #[case(MeasurementKind::Bpd, 70.0, "brachycephaly")]
    #[case(MeasurementKind::Hc, 120.0, "Zika")]
    #[case(MeasurementKind::Hc, 250.0, "hydrocephalus")]
    fn test_differentials_are_specific(
        #[case] kind: MeasurementKind,
        #[case] value: f64,
        #[case] needle: &str,
    ) {
        let expected = if kind == MeasurementKind::Bpd { 48.0 } else { 170.0 };
        let verdict = evaluate_head(kind, value, expected, 0.10, GestationalAge::new(20));
        assert!(verdict.recommendation.unwrap().contains(needle));
        assert!(verdict.detail.starts_with(kind.abbreviation()));
    }

    #[rstest]
    #[case(Status::Normal, Status::Normal, "BPD and HC measurements are normal.")]
    #[case(Status::Abnormal, Status::Abnormal, "Both BPD and HC measurements are abnormal.")]
    #[case(Status::Abnormal, Status::Normal, "BPD measurement is abnormal while HC is normal.")]
    #[case(Status::Normal, Status::Abnormal, "HC measurement is abnormal while BPD is normal.")]
    fn test_summary_categories(#[case] bpd: Status, #[case] hc: Status, #[case] message: &str) {
        assert_eq!(BrainSummary::from_statuses(bpd, hc).message(), message);
    }
}
