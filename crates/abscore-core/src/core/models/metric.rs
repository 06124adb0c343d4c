/// A raw scalar produced by an external analysis tool for one design.
///
/// `Absent` is an explicit marker for "no valid value available" and is never
/// conflated with a low numeric result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    Present(f64),
    #[default]
    Absent,
}

impl MetricValue {
    /// Wraps a finite number; NaN and infinities become `Absent`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self::Present(value)
        } else {
            Self::Absent
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Self::Absent, Self::from_f64)
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Present(v) => Some(*v),
            Self::Absent => None,
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        Self::from_option(value)
    }
}
