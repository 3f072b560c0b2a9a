//! Ordered collection of traces with one active selection.

use log::warn;

use crate::style::{Color, ColorCycle};
use crate::trace::Trace;

/// One legend row: label plus swatch color.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// Traces in insertion order. At most one trace is active (the target
/// of style edits and curve fits). Each added trace takes the next
/// color from the Kelly palette; the cursor is re-seeded to the list
/// length on every add so colors stay aligned with list positions
/// after deletions.
#[derive(Debug, Default)]
pub struct TraceList {
    traces: Vec<Trace>,
    active: Option<usize>,
    colors: ColorCycle,
}

impl TraceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Trace> {
        self.traces.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Trace> {
        self.traces.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_trace(&self) -> Option<&Trace> {
        self.active.and_then(|i| self.traces.get(i))
    }

    pub fn active_trace_mut(&mut self) -> Option<&mut Trace> {
        self.active.and_then(|i| self.traces.get_mut(i))
    }

    pub fn set_active(&mut self, idx: usize) {
        if idx < self.traces.len() {
            self.active = Some(idx);
        } else {
            warn!("cannot activate trace {idx}, only {} traces", self.traces.len());
        }
    }

    /// Append a trace and make it active. Unless an explicit color is
    /// given, the next palette color is assigned to both the line and
    /// marker colors. Returns the new trace's index.
    pub fn add_trace(&mut self, mut trace: Trace, color: Option<Color>) -> usize {
        self.colors.seed(self.traces.len());
        let color = color.unwrap_or_else(|| self.colors.next_color());
        trace.style.line_color = color.clone();
        trace.style.marker_color = color;
        self.traces.push(trace);
        let idx = self.traces.len() - 1;
        self.active = Some(idx);
        idx
    }

    /// Remove the trace at `idx`. When the removed trace is at or
    /// before the active one, the last remaining trace becomes active;
    /// an emptied list has no active trace.
    pub fn delete_trace(&mut self, idx: usize) {
        if idx >= self.traces.len() {
            warn!("cannot delete trace {idx}, only {} traces", self.traces.len());
            return;
        }
        if let Some(active) = self.active {
            if idx <= active {
                self.active = self.traces.len().checked_sub(2);
            }
        }
        self.traces.remove(idx);
    }

    pub fn toggle_visibility(&mut self, idx: usize) {
        if let Some(trace) = self.traces.get_mut(idx) {
            trace.visible = !trace.visible;
        }
    }

    /// Visible traces in list order.
    pub fn visible_traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(|t| t.visible)
    }

    /// Legend rows for the visible traces, in list order.
    pub fn legend_data(&self) -> Vec<LegendEntry> {
        self.visible_traces()
            .map(|t| LegendEntry {
                label: t.label.clone(),
                color: t.legend_color(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ColumnLayout, NumericParser};
    use crate::style::KELLY_COLORS;
    use crate::trace::style::TraceStyle;

    fn make_trace(label: &str) -> Trace {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse("1 2\n3 4\n").unwrap();
        Trace::new(cols, TraceStyle::default(), label)
    }

    #[test]
    fn add_assigns_palette_colors_in_order() {
        let mut list = TraceList::new();
        list.add_trace(make_trace("a"), None);
        list.add_trace(make_trace("b"), None);
        assert_eq!(list.get(0).unwrap().style.line_color, Color::from(KELLY_COLORS[0]));
        assert_eq!(list.get(1).unwrap().style.line_color, Color::from(KELLY_COLORS[1]));
        assert_eq!(
            list.get(1).unwrap().style.marker_color,
            Color::from(KELLY_COLORS[1])
        );
        assert_eq!(list.active_index(), Some(1));
    }

    #[test]
    fn explicit_color_overrides_palette() {
        let mut list = TraceList::new();
        list.add_trace(make_trace("fit"), Some(Color::from("#00ff00")));
        assert_eq!(list.get(0).unwrap().style.line_color, Color::from("#00ff00"));
    }

    #[test]
    fn palette_wraps_after_21_traces() {
        let mut list = TraceList::new();
        for i in 0..22 {
            list.add_trace(make_trace(&format!("t{i}")), None);
        }
        assert_eq!(
            list.get(21).unwrap().style.line_color,
            Color::from(KELLY_COLORS[0])
        );
    }

    #[test]
    fn deleting_at_or_before_active_moves_active_to_end() {
        let mut list = TraceList::new();
        for i in 0..3 {
            list.add_trace(make_trace(&format!("t{i}")), None);
        }
        list.set_active(1);
        list.delete_trace(0);
        assert_eq!(list.active_index(), Some(1));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn deleting_after_active_keeps_active() {
        let mut list = TraceList::new();
        for i in 0..3 {
            list.add_trace(make_trace(&format!("t{i}")), None);
        }
        list.set_active(0);
        list.delete_trace(2);
        assert_eq!(list.active_index(), Some(0));
    }

    #[test]
    fn deleting_only_trace_clears_active_and_visibles() {
        let mut list = TraceList::new();
        list.add_trace(make_trace("only"), None);
        list.delete_trace(0);
        assert_eq!(list.active_index(), None);
        assert!(list.is_empty());
        assert_eq!(list.visible_traces().count(), 0);
    }

    #[test]
    fn legend_skips_hidden_traces() {
        let mut list = TraceList::new();
        list.add_trace(make_trace("a"), None);
        list.add_trace(make_trace("b"), None);
        list.toggle_visibility(0);
        let legend = list.legend_data();
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].label, "b");
    }
}
