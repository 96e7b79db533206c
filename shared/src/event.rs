use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::AppConfig;
use crate::error::{LocationError, SignInError};
use crate::geo::MapRegion;
use crate::report::{ReportStatus, StatusFilter};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(ReportId);
typed_id!(UserId);

/// The signed-in account as reported by the identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    /// Short label for the account chip.
    #[must_use]
    pub fn label(&self) -> &str {
        [self.display_name.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("Usuario")
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    Noop,

    // Lifecycle
    Initialize(Box<AppConfig>),
    AppStarted,

    // Map surface
    MapLoaded,
    MapRegionChanged(MapRegion),
    MyLocationRequested,

    // Reports
    RefreshRequested,
    #[serde(skip)]
    ReportsFetched {
        generation: u64,
        result: Box<crux_http::Result<crux_http::Response<Value>>>,
    },
    FilterSelected(StatusFilter),
    ReportSelected {
        id: ReportId,
    },
    NextReportRequested,
    PreviousReportRequested,
    ReportClosed,

    // Authentication, driven by the shell's Google/Firebase SDKs
    LoginPromptRequested,
    SignInRequested,
    SignInCancelled,
    SignInFailed {
        error: SignInError,
    },
    AuthStateChanged {
        user: Option<UserProfile>,
    },
    SignOutRequested,

    // Report creation
    CreateReportRequested,
    DraftTitleChanged(String),
    DraftDescriptionChanged(String),
    DraftStatusChanged(ReportStatus),
    SubmitReportRequested,
    #[serde(skip)]
    ReportSubmitted(Box<crux_http::Result<crux_http::Response<Vec<u8>>>>),

    // Device location answers
    LocationReceived {
        latitude: f64,
        longitude: f64,
    },
    LocationFailed {
        error: LocationError,
    },

    SheetDismissed,
    NoticeDismissed,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Initialize(_) => "initialize",
            Self::AppStarted => "app_started",
            Self::MapLoaded => "map_loaded",
            Self::MapRegionChanged(_) => "map_region_changed",
            Self::MyLocationRequested => "my_location_requested",
            Self::RefreshRequested => "refresh_requested",
            Self::ReportsFetched { .. } => "reports_fetched",
            Self::FilterSelected(_) => "filter_selected",
            Self::ReportSelected { .. } => "report_selected",
            Self::NextReportRequested => "next_report_requested",
            Self::PreviousReportRequested => "previous_report_requested",
            Self::ReportClosed => "report_closed",
            Self::LoginPromptRequested => "login_prompt_requested",
            Self::SignInRequested => "sign_in_requested",
            Self::SignInCancelled => "sign_in_cancelled",
            Self::SignInFailed { .. } => "sign_in_failed",
            Self::AuthStateChanged { .. } => "auth_state_changed",
            Self::SignOutRequested => "sign_out_requested",
            Self::CreateReportRequested => "create_report_requested",
            Self::DraftTitleChanged(_) => "draft_title_changed",
            Self::DraftDescriptionChanged(_) => "draft_description_changed",
            Self::DraftStatusChanged(_) => "draft_status_changed",
            Self::SubmitReportRequested => "submit_report_requested",
            Self::ReportSubmitted(_) => "report_submitted",
            Self::LocationReceived { .. } => "location_received",
            Self::LocationFailed { .. } => "location_failed",
            Self::SheetDismissed => "sheet_dismissed",
            Self::NoticeDismissed => "notice_dismissed",
        }
    }

    /// Events that come from a tap or gesture rather than a callback.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::MyLocationRequested
                | Self::RefreshRequested
                | Self::FilterSelected(_)
                | Self::ReportSelected { .. }
                | Self::NextReportRequested
                | Self::PreviousReportRequested
                | Self::ReportClosed
                | Self::LoginPromptRequested
                | Self::SignInRequested
                | Self::SignOutRequested
                | Self::CreateReportRequested
                | Self::SubmitReportRequested
                | Self::SheetDismissed
                | Self::NoticeDismissed
        )
    }
}
