//! JSON:API documents for event types.
//!
//! ```json
//! {
//!   "data": {
//!     "type": "event-type",
//!     "id": "3",
//!     "attributes": { "name": "Conference", "slug": "conference" },
//!     "relationships": {
//!       "events": {
//!         "links": {
//!           "self": "/v1/event-types/3/relationships/event",
//!           "related": "/v1/events?event_type_id=3"
//!         }
//!       }
//!     },
//!     "links": { "self": "/v1/event-types/3" }
//!   },
//!   "links": { "self": "/v1/event-types/3" }
//! }
//! ```

use axum::{
    Json,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::entity::event_type;
use crate::error::{EventError, EventResult};

pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";
pub const EVENT_TYPE: &str = "event-type";

const EVENT_TYPES_PATH: &str = "/v1/event-types";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

impl Links {
    fn to_self(path: String) -> Self {
        Self {
            self_link: path,
            related: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct EventTypeAttributes {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Relationship {
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventTypeRelationships {
    pub events: Relationship,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventTypeResource {
    #[serde(rename = "type")]
    pub kind: String,
    /// Rendered as a string
    pub id: String,
    pub attributes: EventTypeAttributes,
    pub relationships: EventTypeRelationships,
    pub links: Links,
}

impl From<event_type::Model> for EventTypeResource {
    fn from(model: event_type::Model) -> Self {
        let id = model.id;
        Self {
            kind: EVENT_TYPE.to_string(),
            id: id.to_string(),
            attributes: EventTypeAttributes {
                name: model.name,
                slug: model.slug,
            },
            relationships: EventTypeRelationships {
                events: Relationship {
                    links: Links {
                        self_link: format!("{EVENT_TYPES_PATH}/{id}/relationships/event"),
                        related: Some(format!("/v1/events?event_type_id={id}")),
                    },
                },
            },
            links: Links::to_self(format!("{EVENT_TYPES_PATH}/{id}")),
        }
    }
}

/// Single resource document
#[derive(Debug, Serialize, ToSchema)]
pub struct EventTypeDocument {
    pub data: EventTypeResource,
    pub links: Links,
}

impl From<event_type::Model> for EventTypeDocument {
    fn from(model: event_type::Model) -> Self {
        let data = EventTypeResource::from(model);
        let links = data.links.clone();
        Self { data, links }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionMeta {
    pub count: u64,
}

/// Collection document
#[derive(Debug, Serialize, ToSchema)]
pub struct EventTypeCollection {
    pub data: Vec<EventTypeResource>,
    pub links: Links,
    pub meta: CollectionMeta,
}

impl From<Vec<event_type::Model>> for EventTypeCollection {
    fn from(models: Vec<event_type::Model>) -> Self {
        Self {
            meta: CollectionMeta {
                count: models.len() as u64,
            },
            data: models.into_iter().map(EventTypeResource::from).collect(),
            links: Links::to_self(EVENT_TYPES_PATH.to_string()),
        }
    }
}

/// Request document for create and update
#[derive(Debug, Deserialize, ToSchema)]
pub struct EventTypeInput {
    pub data: InputData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InputData {
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Option<String>)]
    pub id: Option<Value>,
    /// Dasherized attribute keys; `slug` is ignored
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: Value,
}

impl EventTypeInput {
    /// Attributes of a creation document, after checking the resource type.
    pub fn into_create_attributes(self) -> EventResult<Value> {
        self.data.checked_type()?;
        Ok(self.data.attributes_object())
    }

    /// Attributes of an update document, which must name the resource it updates.
    pub fn into_update_attributes(self, id: i32) -> EventResult<Value> {
        self.data.checked_type()?;
        let body_id = match &self.data.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(EventError::BadDocument("Missing id in \"data\" node".to_string())),
        };
        if body_id != id.to_string() {
            return Err(EventError::BadDocument(format!(
                "Value of id in the URL ({id}) doesn't match id in the request body ({body_id})"
            )));
        }
        Ok(self.data.attributes_object())
    }
}

impl InputData {
    fn checked_type(&self) -> EventResult<()> {
        if self.kind == EVENT_TYPE {
            Ok(())
        } else {
            Err(EventError::TypeMismatch {
                expected: EVENT_TYPE,
                found: self.kind.clone(),
            })
        }
    }

    fn attributes_object(self) -> Value {
        match self.attributes {
            Value::Null => Value::Object(Map::new()),
            other => other,
        }
    }
}

/// JSON body served as `application/vnd.api+json`
#[derive(Debug)]
pub struct JsonApi<T>(pub T);

impl<T: Serialize> IntoResponse for JsonApi<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_API_MEDIA_TYPE),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conference() -> event_type::Model {
        event_type::Model {
            id: 3,
            name: "Tech Conference".to_string(),
            slug: "tech-conference".to_string(),
        }
    }

    #[test]
    fn test_resource_document_shape() {
        let doc = serde_json::to_value(EventTypeDocument::from(conference())).unwrap();

        assert_eq!(doc["data"]["type"], "event-type");
        assert_eq!(doc["data"]["id"], "3");
        assert_eq!(doc["data"]["attributes"]["name"], "Tech Conference");
        assert_eq!(doc["data"]["attributes"]["slug"], "tech-conference");
        assert_eq!(doc["data"]["links"]["self"], "/v1/event-types/3");
        assert_eq!(
            doc["data"]["relationships"]["events"]["links"]["related"],
            "/v1/events?event_type_id=3"
        );
        assert_eq!(
            doc["data"]["relationships"]["events"]["links"]["self"],
            "/v1/event-types/3/relationships/event"
        );
        assert_eq!(doc["links"]["self"], "/v1/event-types/3");
    }

    #[test]
    fn test_collection_carries_count() {
        let doc = serde_json::to_value(EventTypeCollection::from(vec![conference()])).unwrap();
        assert_eq!(doc["meta"]["count"], 1);
        assert_eq!(doc["links"]["self"], "/v1/event-types");
        assert_eq!(doc["data"][0]["id"], "3");
    }

    #[test]
    fn test_wrong_type_is_mismatch() {
        let input: EventTypeInput = serde_json::from_value(json!({
            "data": { "type": "event", "attributes": { "name": "x" } }
        }))
        .unwrap();

        assert!(matches!(
            input.into_create_attributes(),
            Err(EventError::TypeMismatch { found, .. }) if found == "event"
        ));
    }

    #[test]
    fn test_missing_attributes_become_empty_object() {
        let input: EventTypeInput =
            serde_json::from_value(json!({ "data": { "type": "event-type" } })).unwrap();
        assert_eq!(input.into_create_attributes().unwrap(), json!({}));
    }

    #[test]
    fn test_update_requires_matching_id() {
        let doc = |id: Value| -> EventTypeInput {
            serde_json::from_value(json!({
                "data": { "type": "event-type", "id": id, "attributes": { "name": "x" } }
            }))
            .unwrap()
        };

        assert!(doc(json!("4")).into_update_attributes(4).is_ok());
        assert!(doc(json!(4)).into_update_attributes(4).is_ok());
        assert!(matches!(
            doc(json!("5")).into_update_attributes(4),
            Err(EventError::BadDocument(_))
        ));
        assert!(matches!(
            doc(Value::Null).into_update_attributes(4),
            Err(EventError::BadDocument(msg)) if msg.contains("Missing id")
        ));
    }
}
