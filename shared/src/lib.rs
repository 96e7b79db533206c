#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

//! Shared core of the PresaWatch report map.
//!
//! Loads community reports from the backend, filters them by status, and
//! drives the nearest-unvisited walk between reports. The shell renders the
//! map, runs Google sign-in, and reads the device location.

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod geo;
pub mod model;
pub mod navigation;
pub mod report;
pub mod store;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect, EffectFfi};
pub use config::{AppConfig, ConfigError, FirebaseConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, ErrorKind, ErrorSeverity, LocationError, Notice, NoticeKind, SignInError};
pub use event::{Event, ReportId, UserId, UserProfile};
pub use geo::{format_distance, haversine_distance, Coordinate, CoordinateError, MapRegion};
pub use model::{AuthState, CameraTarget, LocationPurpose, Model, ReportDraft, Sheet};
pub use navigation::{nearest_unvisited, CursorState, NavigationCursor};
pub use report::{NewReport, RawReport, Report, ReportStatus, StatusFilter};
pub use store::ReportStore;
pub use view::ViewModel;
