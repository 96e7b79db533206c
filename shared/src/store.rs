use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::ReportId;
use crate::report::{RawReport, Report, StatusFilter};

/// The last successfully fetched report list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStore {
    reports: Vec<RawReport>,
}

impl ReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored list. Entries are not validated here.
    pub fn load(&mut self, reports: Vec<RawReport>) {
        self.reports = reports;
    }

    /// Loads an API response body: arrays are loaded element by element,
    /// any other JSON value loads an empty list.
    pub fn load_json(&mut self, body: Value) {
        let reports = match body {
            Value::Array(items) => items.into_iter().map(RawReport::from_value).collect(),
            other => {
                tracing::warn!(kind = json_kind(&other), "reports response is not an array");
                Vec::new()
            }
        };
        self.load(reports);
    }

    #[must_use]
    pub fn raw(&self) -> &[RawReport] {
        &self.reports
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports matching `filter` that have usable coordinates, in input order.
    #[must_use]
    pub fn filtered_view(&self, filter: StatusFilter) -> Vec<Report> {
        self.reports
            .iter()
            .enumerate()
            .filter(|(_, raw)| filter.matches(raw.status.as_deref()))
            .filter_map(|(index, raw)| {
                let coordinate = raw.coordinate()?;
                Some(Report {
                    id: raw.canonical_id(index),
                    title: raw.title.clone(),
                    description: raw.description.clone(),
                    coordinate,
                    status: raw.status.clone(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn find(&self, id: &ReportId, filter: StatusFilter) -> Option<Report> {
        self.filtered_view(filter).into_iter().find(|r| &r.id == id)
    }

    /// 1-based number shown for a report: its position in the filtered view,
    /// or in the raw list when it is not part of the view.
    #[must_use]
    pub fn position_of(&self, id: &ReportId, filtered: &[Report]) -> Option<usize> {
        if let Some(index) = filtered.iter().position(|r| &r.id == id) {
            return Some(index + 1);
        }
        self.reports
            .iter()
            .enumerate()
            .position(|(index, raw)| &raw.canonical_id(index) == id)
            .map(|index| index + 1)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
