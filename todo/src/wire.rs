//! Serialized form of [`TodoAction`].
//!
//! Actions travel as `{"type": TAG, "payload": ...}` objects:
//!
//! | Tag | Payload |
//! |---|---|
//! | `ADD_ITEM` | `{"id": N, "title": "..."}` |
//! | `LIKED_ITEM` | `N` |
//! | `SAVED_ITEM` | `N` |
//! | `UPDATE_ITEM` | `{"id": N, "title": "..."}` |
//! | `REMOVE_ITEM` (or `DELETE_ITEM`) | `N` |
//!
//! The id-only actions are also accepted with an `{"id": N}` payload. The
//! tag is read before the payload, so an unrecognised tag becomes
//! [`TodoAction::Unknown`] whatever payload it carries.

use crate::types::{TodoAction, TodoId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Borrowed outgoing form
#[derive(Serialize)]
#[serde(tag = "type", content = "payload")]
enum Outgoing<'a> {
    #[serde(rename = "ADD_ITEM")]
    Add { id: TodoId, title: &'a str },
    #[serde(rename = "LIKED_ITEM")]
    ToggleLiked(TodoId),
    #[serde(rename = "SAVED_ITEM")]
    ToggleSaved(TodoId),
    #[serde(rename = "UPDATE_ITEM")]
    UpdateTitle { id: TodoId, title: &'a str },
    #[serde(rename = "REMOVE_ITEM")]
    Delete(TodoId),
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// Incoming envelope; the payload is kept raw until the tag is known
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct TitledPayload {
    id: TodoId,
    title: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdPayload {
    Bare(TodoId),
    Wrapped { id: TodoId },
}

impl From<IdPayload> for TodoId {
    fn from(payload: IdPayload) -> Self {
        match payload {
            IdPayload::Bare(id) | IdPayload::Wrapped { id } => id,
        }
    }
}

impl Serialize for TodoAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let outgoing = match self {
            Self::Add { id, title } => Outgoing::Add { id: *id, title },
            Self::ToggleLiked { id } => Outgoing::ToggleLiked(*id),
            Self::ToggleSaved { id } => Outgoing::ToggleSaved(*id),
            Self::UpdateTitle { id, title } => Outgoing::UpdateTitle { id: *id, title },
            Self::Delete { id } => Outgoing::Delete(*id),
            Self::Unknown => Outgoing::Unknown,
        };
        outgoing.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TodoAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Envelope { tag, payload } = Envelope::deserialize(deserializer)?;

        let action = match tag.as_str() {
            "ADD_ITEM" => {
                let TitledPayload { id, title } = payload_as::<_, D::Error>(payload)?;
                Self::Add { id, title }
            },
            "LIKED_ITEM" => Self::ToggleLiked {
                id: payload_as::<IdPayload, D::Error>(payload)?.into(),
            },
            "SAVED_ITEM" => Self::ToggleSaved {
                id: payload_as::<IdPayload, D::Error>(payload)?.into(),
            },
            "UPDATE_ITEM" => {
                let TitledPayload { id, title } = payload_as::<_, D::Error>(payload)?;
                Self::UpdateTitle { id, title }
            },
            "REMOVE_ITEM" | "DELETE_ITEM" => Self::Delete {
                id: payload_as::<IdPayload, D::Error>(payload)?.into(),
            },
            _ => Self::Unknown,
        };

        Ok(action)
    }
}

fn payload_as<T, E>(payload: Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: serde::de::Error,
{
    serde_json::from_value(payload).map_err(|error| E::custom(format!("invalid payload: {error}")))
}
