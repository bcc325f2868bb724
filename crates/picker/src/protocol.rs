//! Outbound message protocol.
//!
//! Three message shapes, serialized as
//! `{"action": "fail"}`, `{"action": "reject", "data": ErrorReport}` and
//! `{"action": "onChange", "data": {"latLng", "record"?, "isOutDistance"}}`.

use crate::candidate::Candidate;
use crate::provider::HostFrame;
use crate::state::PositionState;
use geopin_core::ErrorReport;
use geopin_geo::Coordinate;
use geopin_telemetry::metrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A message for the embedding page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Message {
    /// Widget cannot do its job: bad config, no geolocation, handled provider failure
    Fail,
    /// A provider rejected a request
    Reject(ErrorReport),
    /// The picked position changed
    OnChange(ChangePayload),
}

impl Message {
    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Reject(_) => "reject",
            Self::OnChange(_) => "onChange",
        }
    }

    fn metric_name(&self) -> &'static str {
        match self {
            Self::Fail => "protocol.fail",
            Self::Reject(_) => "protocol.reject",
            Self::OnChange(_) => "protocol.on_change",
        }
    }

    /// Serialize to the JSON text posted to the host.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The change payload, if this is an `onChange`.
    pub fn as_change(&self) -> Option<&ChangePayload> {
        match self {
            Self::OnChange(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Body of an `onChange` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    pub lat_lng: Coordinate,
    /// Active candidate; omitted when none is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Candidate>,
    pub is_out_distance: bool,
}

impl From<&PositionState> for ChangePayload {
    fn from(state: &PositionState) -> Self {
        Self {
            lat_lng: state.current(),
            record: state.active_candidate().cloned(),
            is_out_distance: state.is_out_of_range(),
        }
    }
}

/// Turns state-machine outcomes into messages and hands them to the host
/// immediately, in call order.
#[derive(Debug)]
pub struct ProtocolEmitter<H> {
    host: H,
    sent: u64,
}

impl<H: HostFrame> ProtocolEmitter<H> {
    pub fn new(host: H) -> Self {
        Self { host, sent: 0 }
    }

    pub fn fail(&mut self) {
        self.emit(Message::Fail);
    }

    pub fn reject(&mut self, report: ErrorReport) {
        self.emit(Message::Reject(report));
    }

    pub fn change(&mut self, state: &PositionState) {
        self.emit(Message::OnChange(ChangePayload::from(state)));
    }

    /// Number of messages delivered so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn emit(&mut self, message: Message) {
        debug!(action = message.action(), seq = self.sent, "posting message to host");
        metrics().increment(message.metric_name());
        self.host.post(&message);
        self.sent += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopin_core::Error;
    use serde_json::json;

    #[test]
    fn test_fail_has_no_payload() {
        assert_eq!(Message::Fail.to_json().unwrap(), r#"{"action":"fail"}"#);
    }

    #[test]
    fn test_reject_carries_report() {
        let message = Message::Reject(Error::missing_api_key().to_report());
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(json["action"], "reject");
        assert_eq!(json["data"]["codeStr"], "E2001");
    }

    #[test]
    fn test_on_change_shape() {
        let payload = ChangePayload {
            lat_lng: Coordinate::new(1.0, 1.0),
            record: Some(Candidate::new("p1", "Here", Coordinate::new(1.0, 1.0))),
            is_out_distance: false,
        };
        let json = serde_json::to_value(Message::OnChange(payload)).unwrap();
        assert_eq!(json["action"], "onChange");
        assert_eq!(json["data"]["latLng"], json!({"lat": 1.0, "lng": 1.0}));
        assert_eq!(json["data"]["record"]["placeId"], "p1");
        assert_eq!(json["data"]["isOutDistance"], false);
    }

    #[test]
    fn test_absent_record_is_omitted() {
        let payload = ChangePayload {
            lat_lng: Coordinate::new(0.0, 0.0),
            record: None,
            is_out_distance: true,
        };
        let json = serde_json::to_value(Message::OnChange(payload)).unwrap();
        assert!(json["data"].get("record").is_none());
    }

    #[test]
    fn test_messages_parse_back() {
        let parsed: Message = serde_json::from_str(r#"{"action":"fail"}"#).unwrap();
        assert_eq!(parsed, Message::Fail);
    }

    #[test]
    fn test_emitter_counts_and_orders() {
        let mut emitter = ProtocolEmitter::new(Vec::new());
        emitter.fail();
        emitter.reject(Error::missing_api_key().to_report());
        assert_eq!(emitter.sent(), 2);

        let actions: Vec<_> = emitter.host().iter().map(Message::action).collect();
        assert_eq!(actions, ["fail", "reject"]);
    }
}
