//! Prev/next paging through map pins.
//!
//! Opening a report starts a trail; "next" walks to the geographically
//! nearest report not yet on the trail, "prev" walks back along it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::event::ReportId;
use crate::geo::haversine_distance;
use crate::report::Report;

/// Report closest to `from`, skipping `from` itself and every visited id.
///
/// Linear scan; on equal distances the earlier candidate wins. A candidate
/// whose distance is not a number is never chosen.
#[must_use]
pub fn nearest_unvisited<'a>(
    from: &Report,
    candidates: &'a [Report],
    visited: &HashSet<&ReportId>,
) -> Option<&'a Report> {
    let mut best: Option<(&Report, f64)> = None;
    for candidate in candidates {
        if candidate.id == from.id || visited.contains(&candidate.id) {
            continue;
        }
        let distance = haversine_distance(from.coordinate, candidate.coordinate);
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(report, _)| report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorState {
    Idle,
    Focused,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationCursor {
    stack: Vec<ReportId>,
    focused: Option<Report>,
}

impl NavigationCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        if self.focused.is_some() {
            CursorState::Focused
        } else {
            CursorState::Idle
        }
    }

    #[must_use]
    pub fn focused(&self) -> Option<&Report> {
        self.focused.as_ref()
    }

    #[must_use]
    pub fn trail(&self) -> &[ReportId] {
        &self.stack
    }

    pub fn open(&mut self, report: Report) {
        tracing::debug!(report_id = %report.id, "opening report");
        self.stack = vec![report.id.clone()];
        self.focused = Some(report);
    }

    pub fn close(&mut self) {
        if self.focused.is_some() {
            tracing::debug!(trail_len = self.stack.len(), "closing report");
        }
        self.stack.clear();
        self.focused = None;
    }

    /// Nearest report in `filtered` not yet on the trail.
    #[must_use]
    pub fn next_candidate<'a>(&self, filtered: &'a [Report]) -> Option<&'a Report> {
        let focused = self.focused.as_ref()?;
        let visited: HashSet<&ReportId> = self.stack.iter().collect();
        nearest_unvisited(focused, filtered, &visited)
    }

    #[must_use]
    pub fn can_go_next(&self, filtered: &[Report]) -> bool {
        self.next_candidate(filtered).is_some()
    }

    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        self.focused.is_some() && self.stack.len() > 1
    }

    /// Steps to the nearest unvisited report. Returns `false` when there is
    /// nothing left to visit.
    pub fn next(&mut self, filtered: &[Report]) -> bool {
        let Some(candidate) = self.next_candidate(filtered).cloned() else {
            return false;
        };
        tracing::debug!(report_id = %candidate.id, depth = self.stack.len() + 1, "next report");
        if self.stack.last() != Some(&candidate.id) {
            self.stack.push(candidate.id.clone());
        }
        self.focused = Some(candidate);
        true
    }

    /// Steps back along the trail. A no-op unless at least two reports have
    /// been visited. Closes when the previous report left the list.
    pub fn prev(&mut self, filtered: &[Report]) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.stack.pop();
        let Some(previous_id) = self.stack.last() else {
            self.close();
            return true;
        };
        match filtered.iter().find(|r| &r.id == previous_id) {
            Some(previous) => {
                tracing::debug!(report_id = %previous.id, "previous report");
                self.focused = Some(previous.clone());
            }
            None => self.close(),
        }
        true
    }

    /// Collapses the trail to the focused report.
    pub fn reset_trail(&mut self) {
        self.stack = self.focused.iter().map(|r| r.id.clone()).collect();
    }

    /// Re-reads the focused report from a fresh list, closing when it is
    /// gone. Returns `true` if the cursor was forced closed.
    pub fn reconcile(&mut self, filtered: &[Report]) -> bool {
        let Some(focused) = &self.focused else {
            return false;
        };
        match filtered.iter().find(|r| r.id == focused.id) {
            Some(current) => {
                self.focused = Some(current.clone());
                false
            }
            None => {
                tracing::debug!(report_id = %focused.id, "focused report left the list");
                self.close();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use proptest::prelude::*;

    fn report(id: &str, lat: f64, lng: f64) -> Report {
        report_with_status(id, lat, lng, "open")
    }

    fn report_with_status(id: &str, lat: f64, lng: f64, status: &str) -> Report {
        Report {
            id: ReportId::new(id),
            title: Some(format!("Reporte {id}")),
            description: None,
            coordinate: Coordinate::new(lat, lng).unwrap(),
            status: Some(status.to_string()),
        }
    }

    fn abc() -> Vec<Report> {
        vec![
            report("A", 19.0, -101.0),
            report("B", 19.001, -101.0),
            report("C", 20.0, -99.0),
        ]
    }

    #[test]
    fn nearest_picks_smallest_distance() {
        let list = abc();
        let nearest = nearest_unvisited(&list[0], &list, &HashSet::new()).unwrap();
        assert_eq!(nearest.id.as_str(), "B");
    }

    #[test]
    fn nearest_skips_visited() {
        let list = abc();
        let visited: HashSet<&ReportId> = [&list[1].id].into_iter().collect();
        let nearest = nearest_unvisited(&list[0], &list, &visited).unwrap();
        assert_eq!(nearest.id.as_str(), "C");
    }

    #[test]
    fn nearest_of_lone_report_is_none() {
        let list = vec![report("A", 19.0, -101.0)];
        assert!(nearest_unvisited(&list[0], &list, &HashSet::new()).is_none());
        assert!(nearest_unvisited(&list[0], &[], &HashSet::new()).is_none());
    }

    #[test]
    fn nearest_breaks_ties_by_list_order() {
        let from = report("O", 0.0, 0.0);
        let list = vec![report("E", 0.0, 1.0), report("W", 0.0, -1.0)];
        let nearest = nearest_unvisited(&from, &list, &HashSet::new()).unwrap();
        assert_eq!(nearest.id.as_str(), "E");
    }

    #[test]
    fn nearest_handles_antipodal_candidate() {
        let from = report("A", 0.08, 0.0);
        let list = vec![
            from.clone(),
            report("C", -0.08, 180.0),
            report("B", 0.09, 0.0),
        ];
        let nearest = nearest_unvisited(&from, &list, &HashSet::new()).unwrap();
        assert_eq!(nearest.id.as_str(), "B");

        let visited: HashSet<&ReportId> = [&list[2].id].into_iter().collect();
        let nearest = nearest_unvisited(&from, &list, &visited).unwrap();
        assert_eq!(nearest.id.as_str(), "C");
    }

    #[test]
    fn open_next_prev_returns_to_origin() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        assert!(cursor.next(&list));
        assert_eq!(cursor.focused().unwrap().id.as_str(), "B");
        assert_eq!(cursor.trail().len(), 2);

        assert!(cursor.prev(&list));
        assert_eq!(cursor.focused().unwrap().id.as_str(), "A");
        assert_eq!(cursor.trail().len(), 1);
    }

    #[test]
    fn prev_with_single_entry_is_noop() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        let before = cursor.clone();
        assert!(!cursor.prev(&list));
        assert_eq!(cursor, before);
    }

    #[test]
    fn prev_when_idle_is_noop() {
        let mut cursor = NavigationCursor::new();
        assert!(!cursor.prev(&abc()));
        assert_eq!(cursor.state(), CursorState::Idle);
    }

    #[test]
    fn next_walks_every_report_once() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        assert!(cursor.next(&list));
        assert!(cursor.next(&list));
        assert_eq!(cursor.focused().unwrap().id.as_str(), "C");
        assert!(!cursor.can_go_next(&list));
        assert!(!cursor.next(&list));
        assert_eq!(cursor.trail().len(), 3);
    }

    #[test]
    fn next_without_candidates_is_disabled() {
        let list = vec![report("A", 19.0, -101.0)];
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        assert!(!cursor.can_go_next(&list));
        assert!(!cursor.next(&list));
        assert_eq!(cursor.state(), CursorState::Focused);
    }

    #[test]
    fn open_resets_trail() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        cursor.next(&list);
        cursor.open(list[2].clone());
        assert_eq!(cursor.trail(), [ReportId::new("C")]);
    }

    #[test]
    fn close_returns_to_idle() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        cursor.close();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert!(cursor.trail().is_empty());
        assert!(!cursor.can_go_prev());
    }

    #[test]
    fn reconcile_closes_when_focus_filtered_out() {
        let open = report_with_status("A", 19.0, -101.0, "open");
        let closed = report_with_status("B", 19.1, -101.0, "closed");
        let mut cursor = NavigationCursor::new();
        cursor.open(open);
        assert!(cursor.reconcile(&[closed]));
        assert_eq!(cursor.state(), CursorState::Idle);
    }

    #[test]
    fn reconcile_refreshes_focused_data() {
        let mut cursor = NavigationCursor::new();
        cursor.open(report("A", 19.0, -101.0));
        let updated = report_with_status("A", 19.0, -101.0, "closed");
        assert!(!cursor.reconcile(&[updated]));
        assert_eq!(cursor.focused().unwrap().status.as_deref(), Some("closed"));
    }

    #[test]
    fn prev_closes_when_previous_report_disappeared() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        cursor.next(&list);
        assert!(cursor.prev(&list[1..]));
        assert_eq!(cursor.state(), CursorState::Idle);
    }

    #[test]
    fn reset_trail_keeps_focus() {
        let list = abc();
        let mut cursor = NavigationCursor::new();
        cursor.open(list[0].clone());
        cursor.next(&list);
        cursor.reset_trail();
        assert_eq!(cursor.trail(), [ReportId::new("B")]);
        assert_eq!(cursor.focused().unwrap().id.as_str(), "B");
    }

    fn arb_reports() -> impl Strategy<Value = Vec<Report>> {
        prop::collection::vec((-89.0f64..89.0, -179.0f64..179.0), 1..30).prop_map(|points| {
            points
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lng))| report(&i.to_string(), lat, lng))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn nearest_is_irreflexive_and_avoids_visited(
            reports in arb_reports(),
            from_index in any::<prop::sample::Index>(),
            visited_mask in prop::collection::vec(any::<bool>(), 30),
        ) {
            let from = &reports[from_index.index(reports.len())];
            let visited: HashSet<&ReportId> = reports
                .iter()
                .zip(&visited_mask)
                .filter(|(_, v)| **v)
                .map(|(r, _)| &r.id)
                .collect();

            match nearest_unvisited(from, &reports, &visited) {
                Some(found) => {
                    prop_assert_ne!(&found.id, &from.id);
                    prop_assert!(!visited.contains(&found.id));
                    let d = haversine_distance(from.coordinate, found.coordinate);
                    for other in &reports {
                        if other.id != from.id && !visited.contains(&other.id) {
                            prop_assert!(d <= haversine_distance(from.coordinate, other.coordinate));
                        }
                    }
                }
                None => {
                    prop_assert!(reports
                        .iter()
                        .all(|r| r.id == from.id || visited.contains(&r.id)));
                }
            }
        }

        #[test]
        fn trail_never_repeats_consecutively(reports in arb_reports(), steps in 0usize..40) {
            let mut cursor = NavigationCursor::new();
            cursor.open(reports[0].clone());
            for step in 0..steps {
                if step % 3 == 2 {
                    cursor.prev(&reports);
                } else {
                    cursor.next(&reports);
                }
                let trail = cursor.trail();
                prop_assert!(trail.windows(2).all(|w| w[0] != w[1]));
                prop_assert_eq!(trail.last(), cursor.focused().map(|r| &r.id));
            }
        }
    }
}
