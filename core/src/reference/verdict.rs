use crate::types::{Deviation, MeasurementKind, Severity, Status};
use std::fmt;

/// Classification of one measurement against its reference
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    pub kind: MeasurementKind,
    pub measurement_mm: f64,
    /// Reference value the measurement was compared against
    pub expected_mm: f64,
    pub status: Status,
    /// Direction of an abnormal value
    #[cfg_attr(feature = "json", serde(skip_serializing_if = "Option::is_none"))]
    pub deviation: Option<Deviation>,
    /// Severity tier, ventricle width only
    #[cfg_attr(feature = "json", serde(skip_serializing_if = "Option::is_none"))]
    pub severity: Option<Severity>,
    pub detail: String,
    #[cfg_attr(feature = "json", serde(skip_serializing_if = "Option::is_none"))]
    pub recommendation: Option<String>,
}

impl Verdict {
    pub fn is_normal(&self) -> bool {
        self.status.is_normal()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} mm (reference {:.2} mm): {}",
            self.kind, self.measurement_mm, self.expected_mm, self.status
        )?;
        if let Some(severity) = self.severity {
            write!(f, ", {}", severity)?;
        } else if let Some(deviation) = self.deviation {
            write!(f, ", {}", deviation)?;
        }
        Ok(())
    }
}

/// Verdicts of one target plus their one-line summary
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    pub verdicts: Vec<Verdict>,
    pub summary: String,
}

impl Evaluation {
    /// Whether every verdict is normal
    pub fn is_normal(&self) -> bool {
        self.verdicts.iter().all(Verdict::is_normal)
    }

    /// Verdict of one measurement kind
    pub fn verdict(&self, kind: MeasurementKind) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.kind == kind)
    }
}
