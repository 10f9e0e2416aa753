use crate::api::Assessment;
use std::fmt;

/// Text report formatter for a biometry assessment
pub struct TextReport<'a> {
    assessment: &'a Assessment,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(assessment: &'a Assessment) -> Self {
        Self { assessment }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.assessment;

        writeln!(f, "Fetal Biometry Assessment")?;
        writeln!(f, "=========================")?;
        writeln!(f)?;
        writeln!(f, "Target:         {}", a.target.simple_name())?;
        writeln!(f, "Gestational Age: {}", a.gestational_age)?;
        writeln!(f, "Mask Source:    {}", a.mask_source)?;
        writeln!(f, "Mask Pixels:    {}", a.mask_pixels)?;
        writeln!(f, "Fitted Shape:   {}", a.fit)?;
        writeln!(f)?;

        for verdict in &a.verdicts {
            let heading = format!(
                "{} ({})",
                verdict.kind.abbreviation(),
                verdict.kind.full_name()
            );
            writeln!(f, "{}", heading)?;
            writeln!(f, "{}", "-".repeat(heading.len()))?;
            writeln!(f, "Measured:       {:.2} mm", verdict.measurement_mm)?;
            writeln!(f, "Reference:      {:.2} mm", verdict.expected_mm)?;
            writeln!(f, "Status:         {}", verdict.status.simple_name())?;
            if let Some(deviation) = verdict.deviation {
                writeln!(f, "Deviation:      {}", deviation.simple_name())?;
            }
            if let Some(severity) = verdict.severity {
                writeln!(f, "Severity:       {}", severity.description())?;
            }
            writeln!(f, "Detail:         {}", verdict.detail)?;
            if let Some(recommendation) = &verdict.recommendation {
                writeln!(f, "Recommendation: {}", recommendation)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Summary:        {}", a.summary)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::MaskSource;
    use crate::reference::Verdict;
    use crate::types::{
        BoundingBox, Deviation, GeometricFit, GestationalAge, MeasurementKind, Severity, Status,
        Target,
    };

    #[test]
    fn test_text_report_format() {
        let assessment = Assessment {
            target: Target::Ventricle,
            gestational_age: GestationalAge::new(22),
            verdicts: vec![Verdict {
                kind: MeasurementKind::Lvw,
                measurement_mm: 11.1,
                expected_mm: 10.0,
                status: Status::Abnormal,
                deviation: Some(Deviation::High),
                severity: Some(Severity::Mild),
                detail: "Outside the normal range.".to_string(),
                recommendation: Some("Follow up.".to_string()),
            }],
            summary: "LVW measurement was abnormal".to_string(),
            fit: GeometricFit::BoundingBox(BoundingBox {
                x: 40,
                y: 50,
                width: 37,
                height: 9,
            }),
            mask_source: MaskSource::Threshold { threshold: 0.25 },
            mask_pixels: 333,
        };

        let report = TextReport::new(&assessment);
        let output = format!("{}", report);

        assert!(output.starts_with("Fetal Biometry Assessment\n"));
        assert!(output.contains("Target:         ventricle"));
        assert!(output.contains("Gestational Age: 22 weeks"));
        assert!(output.contains("LVW (lateral ventricular width)\n-------------------------------"));
        assert!(output.contains("Measured:       11.10 mm"));
        assert!(output.contains("Reference:      10.00 mm"));
        assert!(output.contains("Status:         abnormal"));
        assert!(output.contains("Severity:       mild ventriculomegaly"));
        assert!(output.contains("Recommendation: Follow up."));
        assert!(output.contains("Fitted Shape:   box at (40, 50), 37 x 9 px"));
        assert!(output.ends_with("Summary:        LVW measurement was abnormal\n"));
    }
}
