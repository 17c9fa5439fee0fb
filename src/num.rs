use ordered_float::NotNan;

/// A non-NaN f64 value in the range [0, 1].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Normalized(NotNan<f64>);

impl Normalized {
    pub const ZERO: Self = Self(unsafe { NotNan::new_unchecked(0.0) });
    pub const ONE: Self = Self(unsafe { NotNan::new_unchecked(1.0) });

    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if value.is_sign_negative() || *value > 1.0 {
            return None;
        }
        Some(Self(value))
    }

    /// Clamp `value` into [0, 1]. NaN maps to zero.
    pub fn saturating(value: f64) -> Self {
        Self::new(value.clamp(0.0, 1.0)).unwrap_or(Self::ZERO)
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }
}

impl std::cmp::PartialOrd for Normalized {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Normalized {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Debug for Normalized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-NaN f64 value in the range [0, 100]. Scores and progress are reported on this scale.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Percent(NotNan<f64>);

impl Percent {
    pub const ZERO: Self = Self(unsafe { NotNan::new_unchecked(0.0) });
    pub const HUNDRED: Self = Self(unsafe { NotNan::new_unchecked(100.0) });

    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if value.is_sign_negative() || *value > 100.0 {
            return None;
        }
        Some(Self(value))
    }

    /// Clamp `value` into [0, 100]. NaN maps to zero.
    pub fn saturating(value: f64) -> Self {
        Self::new(value.clamp(0.0, 100.0)).unwrap_or(Self::ZERO)
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }

    pub fn is_complete(&self) -> bool {
        self == &Self::HUNDRED
    }
}

impl From<Normalized> for Percent {
    fn from(value: Normalized) -> Self {
        Self::saturating(value.as_f64() * 100.0)
    }
}

impl std::cmp::PartialOrd for Percent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Percent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Debug for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl serde::Serialize for Percent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
