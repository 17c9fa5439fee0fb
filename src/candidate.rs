use serde::{Deserialize, Serialize};

/// Comparison group a candidate is scored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cohort {
    Resistant,
    NonResistant,
}

impl Cohort {
    pub fn from_resistant(resistant: bool) -> Self {
        if resistant {
            Self::Resistant
        } else {
            Self::NonResistant
        }
    }

    pub fn is_resistant(&self) -> bool {
        matches!(self, Self::Resistant)
    }
}

/// An algorithm under test. Configured once per race and never mutated during it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Algorithm identifier passed to the benchmarking service.
    pub id: String,
    pub display_name: String,
    #[serde(rename = "resistant", with = "cohort_flag")]
    pub cohort: Cohort,
    /// Presentation hint, passed through untouched.
    #[serde(default)]
    pub color: String,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        resistant: bool,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            cohort: Cohort::from_resistant(resistant),
            color: color.into(),
        }
    }

    pub fn is_resistant(&self) -> bool {
        self.cohort.is_resistant()
    }

    /// The dashboard's standard line-up: two classical and two post-quantum signature schemes.
    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::new("ecdsa", "ECDSA", false, "#ff6b6b"),
            Self::new("schnorr", "Schnorr", false, "#4ecdc4"),
            Self::new("falcon", "Falcon512", true, "#45b7d1"),
            Self::new("mldsa", "ML-DSA44", true, "#f9ca24"),
        ]
    }
}

mod cohort_flag {
    use super::Cohort;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cohort: &Cohort, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(cohort.is_resistant())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cohort, D::Error> {
        bool::deserialize(deserializer).map(Cohort::from_resistant)
    }
}
