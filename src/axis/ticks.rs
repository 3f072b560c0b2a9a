//! Tick placement and tick label formatting.
//!
//! Major ticks land on 1, 2 or 5 times a power of ten. Minor ticks
//! bisect the major intervals; one extra minor tick may appear before
//! the first and after the last major tick when it still falls inside
//! the axis domain.

/// Target number of major ticks per axis.
pub const NUM_TICKS: usize = 5;

/// Extra decimals shown in the -2..0 magnitude band.
pub const DECIMALS_OFFSET: i32 = 2;

/// Major and minor tick positions, interleaved in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    pub values: Vec<f64>,
    /// Whether `values[0]` is a major tick. False when a minor tick
    /// precedes the first major one.
    pub first_is_major: bool,
}

impl TickSet {
    pub fn is_major(&self, idx: usize) -> bool {
        let offset = usize::from(!self.first_is_major);
        (idx + offset) % 2 == 0
    }

    pub fn major_values(&self) -> Vec<f64> {
        self.indexed(true)
    }

    pub fn minor_values(&self) -> Vec<f64> {
        self.indexed(false)
    }

    fn indexed(&self, want_major: bool) -> Vec<f64> {
        self.values
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_major(*i) == want_major)
            .map(|(_, &v)| v)
            .collect()
    }
}

/// Step size for roughly `count` ticks over `[min, max]`, snapped to
/// 1, 2 or 5 times a power of ten.
fn tick_step(min: f64, max: f64, count: usize) -> f64 {
    let step0 = (max - min) / count.max(1) as f64;
    let power = step0.log10().floor();
    let error = step0 / 10f64.powf(power);
    let factor = if error >= 7.071 {
        10.0
    } else if error >= 3.162 {
        5.0
    } else if error >= 1.414 {
        2.0
    } else {
        1.0
    };
    factor * 10f64.powf(power)
}

/// Major tick positions inside `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !(max > min) || count == 0 {
        return Vec::new();
    }
    let step = tick_step(min, max, count);
    let start = (min / step).ceil() as i64;
    let stop = (max / step).floor() as i64;
    (start..=stop).map(|i| i as f64 * step).collect()
}

/// Interleave minor ticks between the majors. Boundary minors are
/// added when they stay inside `limits`.
pub fn with_minor_ticks(major: &[f64], limits: (f64, f64)) -> TickSet {
    if major.len() < 2 {
        return TickSet {
            values: major.to_vec(),
            first_is_major: true,
        };
    }
    let half = (major[1] - major[0]) / 2.0;
    let below = major[0] - half;
    let above = major[major.len() - 1] + half;
    let first = if below >= limits.0 { below } else { major[0] };
    let last = if above <= limits.1 { above } else { major[major.len() - 1] };

    let mut values = Vec::new();
    let mut v = first;
    while v <= last + half / 10.0 {
        values.push(v);
        v += half;
    }
    TickSet {
        values,
        first_is_major: below < limits.0,
    }
}

/// Order of magnitude of the estimated tick interval, used to decide
/// the label format.
fn tick_order_of_magnitude(ticks: &[f64]) -> i32 {
    let span = (ticks[ticks.len() - 1] - ticks[0]).abs();
    let est_interval = span / (2 * NUM_TICKS) as f64;
    est_interval.log10().floor() as i32
}

/// Format major tick values for display. Decision order: all-integer
/// ticks print without decimals; very small intervals go scientific;
/// sub-unit intervals get enough decimals to distinguish neighbors;
/// moderate intervals get one decimal; large intervals go scientific.
pub fn format_ticks(ticks: &[f64]) -> Vec<String> {
    if ticks.is_empty() {
        return Vec::new();
    }
    if ticks.len() < 2 {
        return ticks.iter().map(|&v| format_fixed(v, 1)).collect();
    }
    let magnitude = tick_order_of_magnitude(ticks);
    let all_integers = ticks.iter().all(|v| v.fract() == 0.0);

    let format: fn(f64, i32) -> String;
    let decimals;
    if all_integers {
        format = |v, d| format_fixed(v, d);
        decimals = 0;
    } else if magnitude < -2 {
        format = |v, d| format_scientific(v, d);
        decimals = 1;
    } else if magnitude <= 0 {
        format = |v, d| format_fixed(v, d);
        decimals = magnitude.abs() + DECIMALS_OFFSET;
    } else if magnitude < 4 {
        format = |v, d| format_fixed(v, d);
        decimals = 1;
    } else {
        format = |v, d| format_scientific(v, d);
        decimals = 1;
    }
    ticks.iter().map(|&v| format(v, decimals)).collect()
}

/// Fixed-point with trailing zeros trimmed.
fn format_fixed(value: f64, decimals: i32) -> String {
    let s = format!("{:.*}", decimals.max(0) as usize, value);
    trim_trailing_zeros(&s)
}

/// Scientific notation with a trimmed mantissa ("1e-3", "1.5e-3").
fn format_scientific(value: f64, decimals: i32) -> String {
    let s = format!("{:.*e}", decimals.max(0) as usize, value);
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            format!("{}e{}", trim_trailing_zeros(mantissa), exponent)
        }
        None => s,
    }
}

fn trim_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn major_ticks_land_on_nice_steps() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(3.0, 97.0, 5), vec![20.0, 40.0, 60.0, 80.0]);

        let ticks = nice_ticks(0.0, 1.0, 5);
        let expected = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        assert_eq!(ticks.len(), expected.len());
        for (got, want) in ticks.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn empty_domain_yields_no_ticks() {
        assert!(nice_ticks(5.0, 5.0, 5).is_empty());
        assert!(nice_ticks(5.0, 1.0, 5).is_empty());
    }

    #[test]
    fn minors_bisect_majors() {
        let set = with_minor_ticks(&[0.0, 2.0, 4.0], (0.0, 4.0));
        assert_eq!(set.values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(set.first_is_major);
        assert_eq!(set.major_values(), vec![0.0, 2.0, 4.0]);
        assert_eq!(set.minor_values(), vec![1.0, 3.0]);
    }

    #[test]
    fn boundary_minors_appear_when_inside_domain() {
        let set = with_minor_ticks(&[2.0, 4.0], (0.5, 5.5));
        assert_relative_eq!(set.values[0], 1.0);
        assert_relative_eq!(set.values[set.values.len() - 1], 5.0);
        assert!(!set.first_is_major);
        assert_eq!(set.major_values(), vec![2.0, 4.0]);
    }

    #[test]
    fn integer_ticks_print_without_decimals() {
        assert_eq!(
            format_ticks(&[100.0, 200.0, 300.0]),
            vec!["100", "200", "300"]
        );
    }

    #[test]
    fn tiny_intervals_go_scientific() {
        assert_eq!(format_ticks(&[0.001, 0.002]), vec!["1e-3", "2e-3"]);
        assert_eq!(format_ticks(&[0.0015, 0.0025]), vec!["1.5e-3", "2.5e-3"]);
    }

    #[test]
    fn sub_unit_intervals_get_extra_decimals() {
        // span 1.5, estimated interval 0.15, magnitude -1 -> 3 decimals
        assert_eq!(
            format_ticks(&[0.0, 0.755, 1.5]),
            vec!["0", "0.755", "1.5"]
        );
    }

    #[test]
    fn huge_intervals_go_scientific() {
        assert_eq!(
            format_ticks(&[0.5e5, 1.5e5]),
            vec!["5e4", "1.5e5"]
        );
    }
}
