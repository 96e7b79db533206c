use serde_json::Value;

use crate::capabilities::http::{outcome, Outcome, JSON_CONTENT_TYPE};
use crate::capabilities::Capabilities;
use crate::config::{AppConfig, ConfigError};
use crate::error::{AppError, LocationError, Notice, SignInError};
use crate::event::{Event, ReportId, UserProfile};
use crate::geo::Coordinate;
use crate::model::{AuthState, LocationPurpose, Model, Sheet};
use crate::report::StatusFilter;
use crate::view::ViewModel;

const FETCH_FAILED: &str = "No se pudieron cargar los reportes.";
const SUBMIT_FAILED: &str = "No se pudo crear el reporte.";
const LOCATION_FAILED: &str = "No se pudo obtener tu ubicación.";

#[derive(Default)]
pub struct App;

impl App {
    fn initialize(config: AppConfig, model: &mut Model) -> bool {
        if model.is_initialized() {
            tracing::warn!(error = %ConfigError::AlreadyInitialized, "ignoring second initialization");
            return false;
        }
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "invalid configuration");
            let error = AppError::from(e);
            model.show_notice(Notice::error("Error", error.message));
            return true;
        }
        tracing::info!(
            reports_host = config.reports_url.host(),
            has_firebase = config.firebase.is_some(),
            "core initialized"
        );
        model.config = Some(config);
        true
    }

    fn fetch_reports(model: &mut Model, caps: &Capabilities) -> bool {
        let Some(url) = model.reports_url().map(str::to_string) else {
            tracing::warn!("cannot fetch reports before initialization");
            return false;
        };
        let generation = model.begin_fetch();
        tracing::debug!(generation, "fetching reports");

        caps.http
            .get(&url)
            .expect_json::<Value>()
            .send(move |result| Event::ReportsFetched {
                generation,
                result: Box::new(result),
            });
        true
    }

    fn handle_reports_fetched(
        generation: u64,
        result: crux_http::Result<crux_http::Response<Value>>,
        model: &mut Model,
    ) -> bool {
        if !model.is_current_fetch(generation) {
            tracing::debug!(generation, latest = model.fetch_generation, "dropping stale reports response");
            return false;
        }
        model.finish_fetch();

        match outcome(result) {
            Outcome::Success(body) => {
                model.apply_reports(body.unwrap_or(Value::Null));
            }
            Outcome::Failed(error) => {
                // Keep the last list we managed to load.
                tracing::warn!(
                    error = %error,
                    severity = ?error.severity,
                    retryable = error.is_retryable(),
                    kept = model.store.len(),
                    "reports fetch failed"
                );
                model.show_notice(Notice::error("Error", FETCH_FAILED));
            }
        }
        true
    }

    fn navigate(model: &mut Model, forward: bool) -> bool {
        if !model.filter.allows_navigation() {
            tracing::debug!(filter = ?model.filter, "navigation disabled for filter");
            return false;
        }
        if forward {
            model.next_report()
        } else {
            model.previous_report()
        }
    }

    fn select_report(id: &ReportId, model: &mut Model) -> bool {
        model.open_report(id)
    }

    fn select_filter(filter: StatusFilter, model: &mut Model) -> bool {
        if model.filter == filter {
            return false;
        }
        model.select_filter(filter);
        true
    }

    fn request_sign_in(model: &mut Model) -> bool {
        match model.auth {
            AuthState::SigningIn => {
                tracing::debug!("sign-in already in progress");
                false
            }
            AuthState::SignedIn(_) => false,
            AuthState::SignedOut => {
                model.auth = AuthState::SigningIn;
                true
            }
        }
    }

    fn sign_in_failed(error: &SignInError, model: &mut Model) -> bool {
        if model.auth.is_signing_in() {
            model.auth = AuthState::SignedOut;
        }
        tracing::warn!(error = %AppError::from(error), "sign-in failed");
        model.show_notice(error.notice());
        true
    }

    fn auth_state_changed(user: Option<UserProfile>, model: &mut Model) -> bool {
        match user {
            Some(user) => {
                tracing::info!(uid = %user.uid, "signed in");
                model.auth = AuthState::SignedIn(user);
                if model.sheet == Some(Sheet::Login) {
                    model.sheet = None;
                }
            }
            None if model.auth.is_signing_in() => {}
            None => model.sign_out(),
        }
        true
    }

    fn request_create(model: &mut Model) -> bool {
        model.sheet = Some(if model.auth.user().is_some() {
            Sheet::CreateReport
        } else {
            Sheet::Login
        });
        true
    }

    fn request_submit(model: &mut Model, caps: &Capabilities) -> bool {
        if model.is_submitting {
            return false;
        }
        if model.auth.user().is_none() {
            model.sheet = Some(Sheet::Login);
            return true;
        }
        if !model.draft.has_title() {
            model.show_notice(Notice::warning(
                "Falta título",
                "Escribe un título para el reporte.",
            ));
            return true;
        }
        model.is_submitting = true;
        model.pending_location = Some(LocationPurpose::SubmitReport);
        tracing::debug!("waiting for device location to submit report");
        Self::request_location(caps);
        true
    }

    fn request_my_location(model: &mut Model, caps: &Capabilities) -> bool {
        if model.pending_location.is_some() {
            return false;
        }
        model.pending_location = Some(LocationPurpose::CenterMap);
        Self::request_location(caps);
        true
    }

    fn request_location(caps: &Capabilities) {
        caps.location.current_position(|result| match result {
            Ok(position) => Event::LocationReceived {
                latitude: position.latitude,
                longitude: position.longitude,
            },
            Err(error) => Event::LocationFailed { error },
        });
    }

    fn location_received(
        latitude: f64,
        longitude: f64,
        model: &mut Model,
        caps: &Capabilities,
    ) -> bool {
        let Some(purpose) = model.pending_location.take() else {
            tracing::debug!("ignoring unsolicited location");
            return false;
        };
        let location = match Coordinate::new(latitude, longitude) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %AppError::from(e), "shell returned an invalid location");
                let error = LocationError::Unavailable {
                    reason: e.to_string(),
                };
                return Self::location_failed_for(purpose, &error, model);
            }
        };
        match purpose {
            LocationPurpose::CenterMap => model.center_on_device(location),
            LocationPurpose::SubmitReport => Self::submit_report(location, model, caps),
        }
        true
    }

    fn location_failed(error: &LocationError, model: &mut Model) -> bool {
        let Some(purpose) = model.pending_location.take() else {
            return false;
        };
        Self::location_failed_for(purpose, error, model)
    }

    fn location_failed_for(purpose: LocationPurpose, error: &LocationError, model: &mut Model) -> bool {
        tracing::warn!(?purpose, error = %AppError::from(error), "location unavailable");
        if purpose == LocationPurpose::SubmitReport {
            model.is_submitting = false;
        }
        let notice = match (error, purpose) {
            (LocationError::PermissionDenied, _) => {
                Notice::warning("Permiso requerido", "Activa permisos de ubicación.")
            }
            (LocationError::Unavailable { .. }, LocationPurpose::CenterMap) => {
                Notice::error("Error", LOCATION_FAILED)
            }
            (LocationError::Unavailable { .. }, LocationPurpose::SubmitReport) => {
                Notice::error("Error", SUBMIT_FAILED)
            }
        };
        model.show_notice(notice);
        true
    }

    fn submit_report(location: Coordinate, model: &mut Model, caps: &Capabilities) {
        let Some(url) = model.reports_url().map(str::to_string) else {
            tracing::warn!("cannot submit report before initialization");
            model.is_submitting = false;
            model.show_notice(Notice::error("Error", SUBMIT_FAILED));
            return;
        };
        let payload = model.draft.to_new_report(location);
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "could not serialize report");
                model.is_submitting = false;
                model.show_notice(Notice::error("Error", SUBMIT_FAILED));
                return;
            }
        };
        tracing::info!(status = %payload.status, "submitting report");

        caps.http
            .post(&url)
            .body_bytes(body)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .send(|result| Event::ReportSubmitted(Box::new(result)));
    }

    fn handle_report_submitted(
        result: crux_http::Result<crux_http::Response<Vec<u8>>>,
        model: &mut Model,
        caps: &Capabilities,
    ) -> bool {
        model.is_submitting = false;
        match outcome(result) {
            Outcome::Success(_) => {
                tracing::info!("report created");
                model.reset_draft();
                if model.sheet == Some(Sheet::CreateReport) {
                    model.sheet = None;
                }
                Self::fetch_reports(model, caps);
                model.show_notice(Notice::success("Listo", "Reporte creado correctamente."));
            }
            Outcome::Failed(error) => {
                tracing::warn!(
                    error = %error,
                    severity = ?error.severity,
                    retryable = error.is_retryable(),
                    "report submission failed"
                );
                model.show_notice(Notice::error("Error", SUBMIT_FAILED));
            }
        }
        true
    }

    fn dismiss_sheet(model: &mut Model) -> bool {
        if model.sheet.take().is_some() {
            return true;
        }
        if model.cursor.focused().is_some() {
            model.cursor.close();
            return true;
        }
        false
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let span = tracing::debug_span!("update", event = event.name());
        let _entered = span.enter();

        if event.is_user_initiated() {
            tracing::debug!("user action");
        }

        let changed = match event {
            Event::Noop => false,

            Event::Initialize(config) => Self::initialize(*config, model),
            Event::AppStarted | Event::RefreshRequested => Self::fetch_reports(model, caps),

            Event::MapLoaded => {
                model.map_loaded = true;
                model.focus_camera_on_report();
                true
            }
            Event::MapRegionChanged(region) => {
                model.map_region = Some(region);
                false
            }
            Event::MyLocationRequested => Self::request_my_location(model, caps),

            Event::ReportsFetched { generation, result } => {
                Self::handle_reports_fetched(generation, *result, model)
            }
            Event::FilterSelected(filter) => Self::select_filter(filter, model),
            Event::ReportSelected { id } => Self::select_report(&id, model),
            Event::NextReportRequested => Self::navigate(model, true),
            Event::PreviousReportRequested => Self::navigate(model, false),
            Event::ReportClosed => {
                model.cursor.close();
                true
            }

            Event::LoginPromptRequested => {
                if model.auth.user().is_some() {
                    false
                } else {
                    model.sheet = Some(Sheet::Login);
                    true
                }
            }
            Event::SignInRequested => Self::request_sign_in(model),
            Event::SignInCancelled => {
                if model.auth.is_signing_in() {
                    model.auth = AuthState::SignedOut;
                }
                true
            }
            Event::SignInFailed { error } => Self::sign_in_failed(&error, model),
            Event::AuthStateChanged { user } => Self::auth_state_changed(user, model),
            Event::SignOutRequested => {
                tracing::info!("signed out");
                model.sign_out();
                true
            }

            Event::CreateReportRequested => Self::request_create(model),
            Event::DraftTitleChanged(title) => {
                model.draft.title = title;
                true
            }
            Event::DraftDescriptionChanged(description) => {
                model.draft.description = description;
                true
            }
            Event::DraftStatusChanged(status) => {
                model.draft.status = status;
                true
            }
            Event::SubmitReportRequested => Self::request_submit(model, caps),
            Event::ReportSubmitted(result) => Self::handle_report_submitted(*result, model, caps),

            Event::LocationReceived {
                latitude,
                longitude,
            } => Self::location_received(latitude, longitude, model, caps),
            Event::LocationFailed { error } => Self::location_failed(&error, model),

            Event::SheetDismissed => Self::dismiss_sheet(model),
            Event::NoticeDismissed => model.notice.take().is_some(),
        };

        if changed {
            caps.render.render();
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::build(model)
    }
}
