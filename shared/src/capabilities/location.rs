use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Requests the shell can answer about the device position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    /// Foreground permission, prompting the user when not yet decided.
    RequestPermission,
    /// A single fresh position fix.
    CurrentPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LocationResponse {
    Permission { granted: bool },
    Position { latitude: f64, longitude: f64 },
    Unavailable { reason: String },
}

impl Operation for LocationOperation {
    type Output = LocationResponse;
}

/// A raw fix as reported by the shell. Range checks happen in the app.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<E> Clone for Location<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    /// Asks for permission and then for one position fix. The position is
    /// only requested once permission was granted.
    pub fn current_position<F>(&self, callback: F)
    where
        F: FnOnce(Result<Position, LocationError>) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = locate(&context).await;
            context.update_app(callback(result));
        });
    }
}

async fn locate<E: 'static>(
    context: &CapabilityContext<LocationOperation, E>,
) -> Result<Position, LocationError> {
    match context
        .request_from_shell(LocationOperation::RequestPermission)
        .await
    {
        LocationResponse::Permission { granted: true } => {}
        LocationResponse::Permission { granted: false } => {
            return Err(LocationError::PermissionDenied)
        }
        LocationResponse::Unavailable { reason } => {
            return Err(LocationError::Unavailable { reason })
        }
        LocationResponse::Position { .. } => return Err(unexpected("position")),
    }

    match context
        .request_from_shell(LocationOperation::CurrentPosition)
        .await
    {
        LocationResponse::Position {
            latitude,
            longitude,
        } => Ok(Position {
            latitude,
            longitude,
        }),
        LocationResponse::Unavailable { reason } => Err(LocationError::Unavailable { reason }),
        LocationResponse::Permission { .. } => Err(unexpected("permission")),
    }
}

fn unexpected(answer: &str) -> LocationError {
    LocationError::Unavailable {
        reason: format!("unexpected {answer} answer from shell"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_serialize_by_name() {
        let json = serde_json::to_string(&LocationOperation::CurrentPosition).unwrap();
        assert_eq!(json, "\"CurrentPosition\"");
    }

    #[test]
    fn responses_deserialize_from_shell_json() {
        let response: LocationResponse =
            serde_json::from_str(r#"{"Position":{"latitude":19.7,"longitude":-101.2}}"#).unwrap();
        assert_eq!(
            response,
            LocationResponse::Position {
                latitude: 19.7,
                longitude: -101.2
            }
        );
        let denied: LocationResponse =
            serde_json::from_str(r#"{"Permission":{"granted":false}}"#).unwrap();
        assert_eq!(denied, LocationResponse::Permission { granted: false });
    }

    #[test]
    fn unexpected_answers_become_unavailable() {
        assert!(matches!(
            unexpected("position"),
            LocationError::Unavailable { .. }
        ));
    }
}
