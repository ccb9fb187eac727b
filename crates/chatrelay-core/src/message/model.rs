use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payload::{MessageBody, Payload, PayloadExt};

/// A stored message: the payload minus its transient `localeExt` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub uuid: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub msg: MessageBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<PayloadExt>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Payload> for MessageRecord {
    fn from(payload: Payload) -> Self {
        Self {
            uuid: payload.uuid,
            from: payload.from,
            to: payload.to,
            msg: payload.msg,
            ext: payload.ext,
            extra: payload.extra,
        }
    }
}
