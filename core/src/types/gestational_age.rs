use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Gestational age in completed weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct GestationalAge(u32);

impl GestationalAge {
    /// Creates a new GestationalAge from whole weeks
    pub fn new(weeks: u32) -> Self {
        Self(weeks)
    }

    /// Completed weeks
    pub fn weeks(&self) -> u32 {
        self.0
    }

    /// Parses gestational age from string
    ///
    /// Accepts formats like:
    /// - "20"
    /// - "20w", "20 weeks"
    /// - "20w3d", "20+3" (days are dropped, only completed weeks count)
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not start with a week count
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(
                r"(?i)^\s*(\d{1,2})\s*(?:(?:w|wk|wks|week|weeks)\s*(?:\d\s*(?:d|day|days)?)?|\+\s*\d\s*(?:d|day|days)?)?\s*$",
            )
            .expect("Failed to compile regex")
        });

        let weeks = re
            .captures(s)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| format!("Failed to parse gestational age from '{}'", s))?;

        weeks
            .as_str()
            .parse()
            .map(Self)
            .map_err(|e| format!("Failed to parse gestational age weeks: {}", e))
    }
}

impl From<u32> for GestationalAge {
    fn from(weeks: u32) -> Self {
        Self(weeks)
    }
}

impl fmt::Display for GestationalAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} weeks", self.0)
    }
}
