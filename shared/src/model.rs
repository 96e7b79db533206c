use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::Notice;
use crate::event::{ReportId, UserProfile};
use crate::geo::{Coordinate, MapRegion, DEFAULT_FOCUS_DELTA};
use crate::navigation::NavigationCursor;
use crate::report::{NewReport, Report, ReportStatus, StatusFilter};
use crate::store::ReportStore;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SigningIn,
    SignedIn(UserProfile),
}

impl AuthState {
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::SignedOut | Self::SigningIn => None,
        }
    }

    #[must_use]
    pub const fn is_signing_in(&self) -> bool {
        matches!(self, Self::SigningIn)
    }
}

/// Modal sheets other than the report detail, which follows the cursor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sheet {
    Login,
    CreateReport,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub status: ReportStatus,
}

impl ReportDraft {
    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Request body for this draft at `location`, with text trimmed.
    #[must_use]
    pub fn to_new_report(&self, location: Coordinate) -> NewReport {
        NewReport {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            latitude: location.lat(),
            longitude: location.lng(),
            status: self.status,
        }
    }
}

/// Why the core asked the shell for the device position.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationPurpose {
    CenterMap,
    SubmitReport,
}

/// A region the shell should animate the map to. The revision changes every
/// time a new target is issued.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CameraTarget {
    pub region: MapRegion,
    pub revision: u64,
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: Option<AppConfig>,

    // Reports
    pub store: ReportStore,
    pub filter: StatusFilter,
    pub cursor: NavigationCursor,
    pub is_loading_reports: bool,
    pub fetch_generation: u64,

    // Map
    pub map_loaded: bool,
    pub map_region: Option<MapRegion>,
    pub camera: Option<CameraTarget>,

    // Session and sheets
    pub auth: AuthState,
    pub sheet: Option<Sheet>,

    // Report creation
    pub draft: ReportDraft,
    pub is_submitting: bool,
    pub pending_location: Option<LocationPurpose>,

    pub notice: Option<Notice>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn reports_url(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.reports_url.as_str())
    }

    #[must_use]
    pub fn filtered_reports(&self) -> Vec<Report> {
        self.store.filtered_view(self.filter)
    }

    /// Starts a new fetch and returns its generation number.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.is_loading_reports = true;
        self.fetch_generation
    }

    /// Whether a response belongs to the most recent fetch.
    #[must_use]
    pub const fn is_current_fetch(&self, generation: u64) -> bool {
        generation == self.fetch_generation
    }

    pub fn finish_fetch(&mut self) {
        self.is_loading_reports = false;
    }

    /// Loads a fetched body and drops the focus if it vanished.
    pub fn apply_reports(&mut self, body: serde_json::Value) {
        self.store.load_json(body);
        let filtered = self.filtered_reports();
        self.cursor.reconcile(&filtered);
        tracing::info!(
            total = self.store.len(),
            visible = filtered.len(),
            "reports loaded"
        );
    }

    pub fn select_filter(&mut self, filter: StatusFilter) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.cursor.reset_trail();
        let filtered = self.filtered_reports();
        if self.cursor.reconcile(&filtered) {
            tracing::debug!(?filter, "filter change closed the focused report");
        }
    }

    /// Focuses a report by id. Returns `false` if it is not visible.
    pub fn open_report(&mut self, id: &ReportId) -> bool {
        let Some(report) = self.store.find(id, self.filter) else {
            tracing::warn!(report_id = %id, "selected report is not in the current view");
            return false;
        };
        self.sheet = None;
        self.cursor.open(report);
        self.focus_camera_on_report();
        true
    }

    pub fn next_report(&mut self) -> bool {
        let filtered = self.filtered_reports();
        let moved = self.cursor.next(&filtered);
        if moved {
            self.focus_camera_on_report();
        }
        moved
    }

    pub fn previous_report(&mut self) -> bool {
        let filtered = self.filtered_reports();
        let moved = self.cursor.prev(&filtered);
        if moved {
            self.focus_camera_on_report();
        }
        moved
    }

    /// Points the camera at the focused report once the map can animate.
    pub fn focus_camera_on_report(&mut self) {
        if !self.map_loaded {
            return;
        }
        let Some(coordinate) = self.cursor.focused().map(|r| r.coordinate) else {
            return;
        };
        let region = MapRegion::focus(coordinate, self.map_region.as_ref());
        self.set_camera(region);
    }

    pub fn center_on_device(&mut self, location: Coordinate) {
        let region = MapRegion::centered_on(location, DEFAULT_FOCUS_DELTA, DEFAULT_FOCUS_DELTA);
        self.set_camera(region);
    }

    fn set_camera(&mut self, region: MapRegion) {
        let revision = self.camera.map_or(1, |c| c.revision + 1);
        self.camera = Some(CameraTarget { region, revision });
    }

    pub fn reset_draft(&mut self) {
        self.draft = ReportDraft::default();
    }

    pub fn show_notice(&mut self, notice: Notice) {
        tracing::debug!(title = %notice.title, kind = ?notice.kind, "showing notice");
        self.notice = Some(notice);
    }

    pub fn sign_out(&mut self) {
        self.auth = AuthState::SignedOut;
        if self.sheet == Some(Sheet::CreateReport) {
            self.sheet = None;
        }
        if self.pending_location == Some(LocationPurpose::SubmitReport) {
            self.pending_location = None;
            self.is_submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded_model() -> Model {
        let mut model = Model::new();
        model.apply_reports(json!([
            { "id": 1, "latitude": 19.0, "longitude": -101.0, "status": "open" },
            { "id": 2, "latitude": 19.001, "longitude": -101.0, "status": "open" },
            { "id": 3, "latitude": 20.0, "longitude": -99.0, "status": "closed" }
        ]));
        model
    }

    fn focused_id(model: &Model) -> Option<&str> {
        model.cursor.focused().map(|r| r.id.as_str())
    }

    #[test]
    fn stale_generation_is_detected() {
        let mut model = Model::new();
        let first = model.begin_fetch();
        let second = model.begin_fetch();
        assert!(!model.is_current_fetch(first));
        assert!(model.is_current_fetch(second));
        assert!(model.is_loading_reports);
    }

    #[test]
    fn filter_change_to_closed_drops_open_focus() {
        let mut model = loaded_model();
        assert!(model.open_report(&ReportId::new("1")));
        model.select_filter(StatusFilter::Closed);
        assert_eq!(focused_id(&model), None);
        assert!(model.cursor.trail().is_empty());
    }

    #[test]
    fn filter_change_clears_trail_but_keeps_visible_focus() {
        let mut model = loaded_model();
        model.open_report(&ReportId::new("1"));
        assert!(model.next_report());
        assert_eq!(model.cursor.trail().len(), 2);

        model.select_filter(StatusFilter::Open);
        assert_eq!(focused_id(&model), Some("2"));
        assert_eq!(model.cursor.trail(), [ReportId::new("2")]);
    }

    #[test]
    fn reload_without_focused_report_closes_it() {
        let mut model = loaded_model();
        model.open_report(&ReportId::new("3"));
        model.apply_reports(json!([
            { "id": 1, "latitude": 19.0, "longitude": -101.0, "status": "open" }
        ]));
        assert_eq!(focused_id(&model), None);
    }

    #[test]
    fn opening_hidden_report_fails() {
        let mut model = loaded_model();
        model.select_filter(StatusFilter::Open);
        assert!(!model.open_report(&ReportId::new("3")));
        assert_eq!(focused_id(&model), None);
    }

    #[test]
    fn camera_waits_for_map() {
        let mut model = loaded_model();
        model.open_report(&ReportId::new("1"));
        assert!(model.camera.is_none());

        model.map_loaded = true;
        model.focus_camera_on_report();
        let first = model.camera.unwrap();
        assert_eq!(first.region.latitude, 19.0);
        assert_eq!(first.revision, 1);

        model.next_report();
        let second = model.camera.unwrap();
        assert_eq!(second.region.latitude, 19.001);
        assert_eq!(second.revision, 2);
    }

    #[test]
    fn draft_is_trimmed_into_request() {
        let draft = ReportDraft {
            title: "  Llantas  ".into(),
            description: " junto al río ".into(),
            status: ReportStatus::Closed,
        };
        let body = draft.to_new_report(Coordinate::new(19.5, -101.5).unwrap());
        assert_eq!(body.title, "Llantas");
        assert_eq!(body.description, "junto al río");
        assert_eq!(body.status, ReportStatus::Closed);
        assert!(!ReportDraft::default().has_title());
    }

    #[test]
    fn sign_out_closes_create_sheet() {
        let mut model = Model::new();
        model.sheet = Some(Sheet::CreateReport);
        model.pending_location = Some(LocationPurpose::SubmitReport);
        model.sign_out();
        assert_eq!(model.sheet, None);
        assert_eq!(model.pending_location, None);
    }
}
