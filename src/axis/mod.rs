//! Axis domain resolution, tick layout and scaling.

pub mod scale;
pub mod ticks;

pub use scale::LinearScale;
pub use ticks::{format_ticks, nice_ticks, with_minor_ticks, TickSet, NUM_TICKS};

use crate::error::{PlotError, PlotResult};

/// Default margin fraction added to each auto-scaled side.
pub const DEFAULT_MARGIN: f64 = 0.05;

/// One end of an axis domain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bound {
    /// Data extent plus the margin fraction
    #[default]
    Auto,
    /// Data extent exactly
    Tight,
    /// Explicit coordinate
    Value(f64),
}

impl<'de> serde::Deserialize<'de> for Bound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Bound::Value(v)),
            Raw::Text(s) => Bound::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

impl Bound {
    /// Parse the "auto" / "tight" / number surface syntax.
    pub fn parse(s: &str) -> PlotResult<Bound> {
        match s.trim() {
            "auto" => Ok(Bound::Auto),
            "tight" => Ok(Bound::Tight),
            other => other
                .replacen(',', ".", 1)
                .parse::<f64>()
                .map(Bound::Value)
                .map_err(|_| {
                    PlotError::InvalidConfig(format!(
                        "axis bound must be 'auto', 'tight' or a number, got '{other}'"
                    ))
                }),
        }
    }
}

/// User-facing limit settings for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisLimits {
    pub start: Bound,
    pub end: Bound,
}

impl AxisLimits {
    pub fn fixed(start: f64, end: f64) -> Self {
        AxisLimits {
            start: Bound::Value(start),
            end: Bound::Value(end),
        }
    }
}

/// Resolve the drawable domain of one axis.
///
/// Each visible trace contributes its error-expanded extent, padded by
/// the margin fraction of its own span (zero on a Tight side). The
/// padded extents are folded into one interval, then explicit numeric
/// bounds override their side. Traces without data contribute nothing;
/// when nothing contributes the axis has no domain.
pub fn resolve_limits(
    extents: &[(f64, f64)],
    limits: AxisLimits,
    margin: f64,
    axis: &'static str,
) -> PlotResult<(f64, f64)> {
    let margin_lo = if limits.start == Bound::Tight { 0.0 } else { margin };
    let margin_hi = if limits.end == Bound::Tight { 0.0 } else { margin };

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &(min, max) in extents {
        let range = (max - min).abs();
        lo = lo.min(min - range * margin_lo);
        hi = hi.max(max + range * margin_hi);
    }
    if extents.is_empty() {
        return Err(PlotError::NoVisibleData { axis });
    }

    if let Bound::Value(v) = limits.start {
        lo = v;
    }
    if let Bound::Value(v) = limits.end {
        hi = v;
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn auto_limits_pad_each_trace_by_its_own_span() {
        let (lo, hi) = resolve_limits(
            &[(0.0, 10.0), (5.0, 7.0)],
            AxisLimits::default(),
            DEFAULT_MARGIN,
            "x",
        )
        .unwrap();
        assert_relative_eq!(lo, -0.5);
        assert_relative_eq!(hi, 10.5);
    }

    #[test]
    fn tight_side_has_no_margin() {
        let limits = AxisLimits {
            start: Bound::Tight,
            end: Bound::Auto,
        };
        let (lo, hi) = resolve_limits(&[(0.0, 10.0)], limits, DEFAULT_MARGIN, "x").unwrap();
        assert_relative_eq!(lo, 0.0);
        assert_relative_eq!(hi, 10.5);
    }

    #[test]
    fn numeric_bounds_override_data() {
        let limits = AxisLimits::fixed(-3.0, 3.0);
        let (lo, hi) = resolve_limits(&[(0.0, 10.0)], limits, DEFAULT_MARGIN, "y").unwrap();
        assert_relative_eq!(lo, -3.0);
        assert_relative_eq!(hi, 3.0);
    }

    #[test]
    fn no_contributions_is_an_error() {
        match resolve_limits(&[], AxisLimits::default(), DEFAULT_MARGIN, "y") {
            Err(PlotError::NoVisibleData { axis }) => assert_eq!(axis, "y"),
            other => panic!("expected NoVisibleData, got {other:?}"),
        }
    }

    #[test]
    fn bound_parsing() {
        assert_eq!(Bound::parse("auto").unwrap(), Bound::Auto);
        assert_eq!(Bound::parse("tight").unwrap(), Bound::Tight);
        assert_eq!(Bound::parse("2.5").unwrap(), Bound::Value(2.5));
        assert_eq!(Bound::parse("-1,5").unwrap(), Bound::Value(-1.5));
        assert!(Bound::parse("wide").is_err());
    }
}
