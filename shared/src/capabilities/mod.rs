//! Capabilities the core uses to reach the shell.
//!
//! Http and Render come from Crux. Location is ours; Google sign-in stays in
//! the shell and reports back through events.

pub mod http;
pub mod location;

use crux_core::capability::ProtoContext;
use crux_core::render::RenderOperation;
use crux_core::{bridge::ResolveSerialized, Request, WithContext};
use crux_http::protocol::HttpRequest;
use serde::{Deserialize, Serialize};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use location::{Location, LocationOperation, LocationResponse, Position};

use crate::app::App;
use crate::event::Event;

pub struct Capabilities {
    pub http: Http<Event>,
    pub location: Location<Event>,
    pub render: Render<Event>,
}

#[derive(Debug)]
pub enum Effect {
    Http(Request<HttpRequest>),
    Location(Request<LocationOperation>),
    Render(Request<RenderOperation>),
}

/// Serializable mirror of [`Effect`] handed across the bridge.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(HttpRequest),
    Location(LocationOperation),
    Render(RenderOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Self::Http(request) => request.serialize(EffectFfi::Http),
            Self::Location(request) => request.serialize(EffectFfi::Location),
            Self::Render(request) => request.serialize(EffectFfi::Render),
        }
    }
}

impl WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            location: Location::new(context.specialize(Effect::Location)),
            render: Render::new(context.specialize(Effect::Render)),
        }
    }
}
