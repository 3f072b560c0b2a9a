//! Linear data-to-pixel mapping.

/// Maps a data domain onto an output range. The range may be
/// descending, which is how y axes flip into screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened so the scale stays invertible.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.0 == domain.1 {
            (domain.0 - 0.5, domain.1 + 0.5)
        } else {
            domain
        };
        LinearScale { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a data value to the output range.
    pub fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Map an output position back to a data value.
    pub fn invert(&self, pos: f64) -> f64 {
        let t = (pos - self.range.0) / (self.range.1 - self.range.0);
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn maps_domain_onto_range() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 500.0));
        assert_relative_eq!(scale.scale(0.0), 0.0);
        assert_relative_eq!(scale.scale(5.0), 250.0);
        assert_relative_eq!(scale.scale(10.0), 500.0);
    }

    #[test]
    fn descending_range_flips_axis() {
        let scale = LinearScale::new((0.0, 10.0), (400.0, 0.0));
        assert_relative_eq!(scale.scale(0.0), 400.0);
        assert_relative_eq!(scale.scale(10.0), 0.0);
        assert_relative_eq!(scale.invert(400.0), 0.0);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_relative_eq!(scale.scale(3.0), 50.0);
    }
}
