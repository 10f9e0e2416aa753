use std::fmt;

/// Anatomical target of a segmentation request
///
/// Each target has its own segmentation model, its own shape fit and its own
/// gestational-age policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Target {
    /// Trans-thalamic head plane (BPD, HC)
    Brain,
    /// Trans-cerebellar plane (TCD)
    Cerebellum,
    /// Trans-ventricular plane (LVW)
    Ventricle,
}

impl Target {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Target::Brain => "brain",
            Target::Cerebellum => "cerebellum",
            Target::Ventricle => "ventricle",
        }
    }

    /// Geometric primitive fitted to this target's region
    pub fn fit_shape(&self) -> FitShape {
        match self {
            Target::Brain | Target::Cerebellum => FitShape::Ellipse,
            Target::Ventricle => FitShape::BoundingBox,
        }
    }

    /// Measurements derived from this target, in output order
    pub fn measurements(&self) -> &'static [MeasurementKind] {
        match self {
            Target::Brain => &[MeasurementKind::Bpd, MeasurementKind::Hc],
            Target::Cerebellum => &[MeasurementKind::Tcd],
            Target::Ventricle => &[MeasurementKind::Lvw],
        }
    }

    /// Caller-facing message when no usable region is found
    pub fn failure_message(&self) -> &'static str {
        match self {
            Target::Brain => "Could not analyze image",
            Target::Cerebellum => "Could not detect cerebellum",
            Target::Ventricle => "Unable to detect ventricles",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Shape fitted to the dominant contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitShape {
    Ellipse,
    BoundingBox,
}

/// Physical quantity produced by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum MeasurementKind {
    /// Biparietal diameter
    Bpd,
    /// Head circumference
    Hc,
    /// Transverse cerebellar diameter
    Tcd,
    /// Lateral ventricular width
    Lvw,
}

impl MeasurementKind {
    /// Returns the clinical abbreviation ("BPD", "HC", ...)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            MeasurementKind::Bpd => "BPD",
            MeasurementKind::Hc => "HC",
            MeasurementKind::Tcd => "TCD",
            MeasurementKind::Lvw => "LVW",
        }
    }

    /// Returns the spelled-out name
    pub fn full_name(&self) -> &'static str {
        match self {
            MeasurementKind::Bpd => "biparietal diameter",
            MeasurementKind::Hc => "head circumference",
            MeasurementKind::Tcd => "transverse cerebellar diameter",
            MeasurementKind::Lvw => "lateral ventricular width",
        }
    }

    /// Target whose mask produces this measurement
    pub fn target(&self) -> Target {
        match self {
            MeasurementKind::Bpd | MeasurementKind::Hc => Target::Brain,
            MeasurementKind::Tcd => Target::Cerebellum,
            MeasurementKind::Lvw => Target::Ventricle,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Normal/abnormal classification of a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Status {
    Normal,
    Abnormal,
}

impl Status {
    /// Returns whether the status is normal
    pub fn is_normal(&self) -> bool {
        matches!(self, Status::Normal)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Abnormal => "abnormal",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Direction of an abnormal measurement relative to its reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Deviation {
    Low,
    High,
}

impl Deviation {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Deviation::Low => "low",
            Deviation::High => "high",
        }
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Ventriculomegaly severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum Severity {
    /// Width between the normal limit and the severe threshold
    Mild,
    /// Width at or above the severe threshold
    ModerateToSevere,
}

impl Severity {
    /// Returns the clinical description used in narratives
    pub fn description(&self) -> &'static str {
        match self {
            Severity::Mild => "mild ventriculomegaly",
            Severity::ModerateToSevere => "moderate to severe ventriculomegaly",
        }
    }

    /// Returns the prognosis sentence appended to recommendations
    pub fn prognosis(&self) -> &'static str {
        match self {
            Severity::Mild => {
                "Mild ventriculomegaly may resolve spontaneously and often has normal outcomes. \
                 Follow-up ultrasound recommended."
            }
            Severity::ModerateToSevere => {
                "Moderate to severe ventriculomegaly may be associated with neurodevelopmental \
                 issues or need for intervention (e.g., shunt)."
            }
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// How a target treats gestational ages outside its reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum AgePolicy {
    /// Out-of-range ages are a request error
    Reject,
    /// Out-of-range ages use the nearest table row
    Clamp,
    /// Table row when present, otherwise expected value equals the age in weeks
    RuleOfThumb,
}

impl AgePolicy {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            AgePolicy::Reject => "reject",
            AgePolicy::Clamp => "clamp",
            AgePolicy::RuleOfThumb => "rule-of-thumb",
        }
    }
}

impl fmt::Display for AgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
