use serde::{Deserialize, Serialize};

use crate::error::Notice;
use crate::geo::{format_distance, MapRegion};
use crate::model::{CameraTarget, Model, ReportDraft, Sheet};
use crate::report::{Report, ReportStatus, StatusFilter};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_open: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterChipView {
    pub filter: StatusFilter,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReportDetailView {
    pub id: String,
    pub heading: String,
    /// "Reporte No. n", shown under a real title.
    pub number_line: Option<String>,
    pub description: String,
    pub has_description: bool,
    pub status_label: String,
    pub is_open: bool,
    /// Distance to the report "next" would jump to.
    pub next_distance: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NavigationView {
    /// Arrows are shown under TODOS and ABIERTOS even with nothing selected.
    pub visible: bool,
    /// "Previous" only appears once a report is open.
    pub show_prev: bool,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftView {
    pub title: String,
    pub description: String,
    pub status: ReportStatus,
    pub status_options: Vec<(ReportStatus, String)>,
    pub is_submitting: bool,
    pub awaiting_location: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SheetView {
    Login { signing_in: bool },
    CreateReport(DraftView),
    Report(ReportDetailView),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub is_configured: bool,
    /// Web client id the shell configures Google sign-in with.
    pub sign_in_client_id: Option<String>,
    pub initial_region: MapRegion,
    pub camera: Option<CameraTarget>,
    pub markers: Vec<MarkerView>,
    pub filters: Vec<FilterChipView>,
    pub is_loading_reports: bool,
    pub navigation: NavigationView,
    pub sheet: Option<SheetView>,
    pub user_label: Option<String>,
    pub is_signed_in: bool,
    pub locating: bool,
    pub notice: Option<Notice>,
}

impl ViewModel {
    #[must_use]
    pub fn build(model: &Model) -> Self {
        let filtered = model.filtered_reports();
        let user = model.auth.user();

        Self {
            is_configured: model.is_initialized(),
            sign_in_client_id: model.config.as_ref().map(|c| c.google_web_client_id.clone()),
            initial_region: model
                .config
                .as_ref()
                .map_or_else(MapRegion::default, |c| c.initial_region),
            camera: model.camera,
            markers: filtered.iter().map(marker).collect(),
            filters: StatusFilter::ALL
                .iter()
                .map(|&filter| FilterChipView {
                    filter,
                    label: filter.label().to_string(),
                    selected: filter == model.filter,
                })
                .collect(),
            is_loading_reports: model.is_loading_reports,
            navigation: navigation(model, &filtered),
            sheet: sheet(model, &filtered),
            user_label: user.map(|u| u.label().to_string()),
            is_signed_in: user.is_some(),
            locating: model.pending_location.is_some(),
            notice: model.notice.clone(),
        }
    }
}

fn marker(report: &Report) -> MarkerView {
    MarkerView {
        id: report.id.to_string(),
        latitude: report.coordinate.lat(),
        longitude: report.coordinate.lng(),
        is_open: report.is_open(),
    }
}

fn navigation(model: &Model, filtered: &[Report]) -> NavigationView {
    NavigationView {
        visible: model.filter.allows_navigation(),
        show_prev: model.cursor.focused().is_some(),
        can_go_prev: model.cursor.can_go_prev(),
        can_go_next: model.cursor.can_go_next(filtered),
    }
}

fn sheet(model: &Model, filtered: &[Report]) -> Option<SheetView> {
    match model.sheet {
        Some(Sheet::Login) => Some(SheetView::Login {
            signing_in: model.auth.is_signing_in(),
        }),
        Some(Sheet::CreateReport) => Some(SheetView::CreateReport(draft(model, &model.draft))),
        None => model
            .cursor
            .focused()
            .map(|report| SheetView::Report(detail(model, report, filtered))),
    }
}

fn draft(model: &Model, draft: &ReportDraft) -> DraftView {
    DraftView {
        title: draft.title.clone(),
        description: draft.description.clone(),
        status: draft.status,
        status_options: [ReportStatus::Open, ReportStatus::Closed]
            .into_iter()
            .map(|s| (s, s.label().to_uppercase()))
            .collect(),
        is_submitting: model.is_submitting,
        awaiting_location: model.pending_location.is_some(),
    }
}

fn detail(model: &Model, report: &Report, filtered: &[Report]) -> ReportDetailView {
    let number = model.store.position_of(&report.id, filtered);
    let title = report.display_title();

    let heading = match (title, number) {
        (Some(title), _) => title.to_string(),
        (None, Some(n)) => format!("Reporte No. {n}"),
        (None, None) => "Reporte".to_string(),
    };
    let number_line = title.and(number).map(|n| format!("Reporte No. {n}"));

    let description = report
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let next_distance = model
        .cursor
        .next_candidate(filtered)
        .map(|next| format_distance(report.coordinate.distance_to(next.coordinate)));

    ReportDetailView {
        id: report.id.to_string(),
        heading,
        number_line,
        has_description: description.is_some(),
        description: description.unwrap_or_else(|| "Sin descripción.".to_string()),
        status_label: report.status_label(),
        is_open: report.is_open(),
        next_distance,
    }
}
