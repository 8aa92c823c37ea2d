//! Version gating of schema fields.

/// Inclusive range of session versions; `None` bounds are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VersionRange {
    /// Lowest version the field appears in
    pub min: Option<f64>,
    /// Highest version the field appears in
    pub max: Option<f64>,
}

impl VersionRange {
    /// Range with explicit, possibly unconstrained, bounds.
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Closed range `[min, max]`.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Every version from `min` on.
    #[must_use]
    pub const fn since(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    /// Every version up to and including `max`.
    #[must_use]
    pub const fn until(max: f64) -> Self {
        Self::new(None, Some(max))
    }

    /// Returns true if `version` lies within the range.
    #[must_use]
    pub fn contains(&self, version: f64) -> bool {
        self.min.is_none_or(|min| min <= version) && self.max.is_none_or(|max| max >= version)
    }
}

/// Decides whether a field takes part in a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VersionGate {
    /// Present in every version
    #[default]
    Always,
    /// Never read or written
    Never,
    /// Present when any range contains the session version
    Ranges(Vec<VersionRange>),
}

impl VersionGate {
    /// Returns true if the field is active under `version`.
    #[must_use]
    pub fn is_open(&self, version: f64) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Ranges(ranges) => ranges.is_empty() || ranges.iter().any(|r| r.contains(version)),
        }
    }

    pub(crate) fn push(&mut self, range: VersionRange) {
        match self {
            Self::Never => {}
            Self::Always => *self = Self::Ranges(vec![range]),
            Self::Ranges(ranges) => ranges.push(range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_range() {
        let gate = VersionGate::Ranges(vec![VersionRange::between(2.0, 3.0)]);
        assert!(!gate.is_open(1.5));
        assert!(gate.is_open(2.0));
        assert!(gate.is_open(2.5));
        assert!(gate.is_open(3.0));
        assert!(!gate.is_open(3.01));
    }

    #[test]
    fn test_unconstrained_bounds() {
        assert!(VersionRange::since(4.0).contains(100.0));
        assert!(!VersionRange::since(4.0).contains(3.9));
        assert!(VersionRange::until(3.0).contains(0.0));
        assert!(VersionRange::new(None, None).contains(7.25));
    }

    #[test]
    fn test_any_range_opens_gate() {
        let gate = VersionGate::Ranges(vec![
            VersionRange::between(1.0, 1.5),
            VersionRange::since(3.0),
        ]);
        assert!(gate.is_open(1.25));
        assert!(!gate.is_open(2.0));
        assert!(gate.is_open(3.5));
    }

    #[test]
    fn test_empty_ranges_and_sentinels() {
        assert!(VersionGate::Ranges(Vec::new()).is_open(0.0));
        assert!(VersionGate::Always.is_open(0.0));
        assert!(!VersionGate::Never.is_open(1.0));

        let mut gate = VersionGate::Never;
        gate.push(VersionRange::since(0.0));
        assert_eq!(gate, VersionGate::Never);
    }
}
