//! Persistence-record layouts and their JSON-Schema conversion.
//!
//! A [`RecordLayout`] describes how a stored record is marshalled: an ordered
//! list of attributes, each with an [`AttributeType`]. Conversion walks the
//! layout recursively and produces an object schema whose `properties` mirror
//! the attributes.

use serde_json::{json, Map, Value};

/// Storage type of one record attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    Any,
    String,
    Hash,
    Custom,
    Date,
    Number,
    Boolean,
    Binary,
    Null,
    /// Untyped collection of scalars.
    Collection,
    /// Nested document with named members.
    Document(RecordLayout),
    /// Fixed-length positional members.
    Tuple(Vec<AttributeType>),
    /// Homogeneous list.
    List(Box<AttributeType>),
    /// String-keyed map with homogeneous values.
    Map(Box<AttributeType>),
    /// Set of scalars.
    Set(Box<AttributeType>),
}

impl AttributeType {
    pub fn list(member: AttributeType) -> Self {
        AttributeType::List(Box::new(member))
    }

    pub fn map(member: AttributeType) -> Self {
        AttributeType::Map(Box::new(member))
    }

    pub fn set(member: AttributeType) -> Self {
        AttributeType::Set(Box::new(member))
    }

    /// Schema node for this attribute.
    pub fn to_json_schema(&self) -> Value {
        match self {
            AttributeType::Any
            | AttributeType::String
            | AttributeType::Hash
            | AttributeType::Custom => json!({"type": "string"}),
            AttributeType::Date | AttributeType::Number => json!({"type": "number"}),
            AttributeType::Collection => json!({"type": "array"}),
            AttributeType::Document(layout) => layout.to_json_schema(),
            AttributeType::Tuple(members) => {
                let properties: Map<String, Value> = members
                    .iter()
                    .enumerate()
                    .map(|(index, member)| (index.to_string(), member.to_json_schema()))
                    .collect();
                json!({"type": "object", "properties": properties})
            }
            // Only document members carry enough structure to describe items.
            AttributeType::List(member) => match member.as_ref() {
                AttributeType::Document(layout) => {
                    json!({"type": "array", "items": layout.to_json_schema()})
                }
                _ => json!({"type": "array"}),
            },
            AttributeType::Map(member) | AttributeType::Set(member) => member.to_json_schema(),
            AttributeType::Boolean => json!({"type": "boolean"}),
            // JSON has no binary type.
            AttributeType::Binary | AttributeType::Null => json!({"type": "null"}),
        }
    }
}

/// Ordered attribute layout of a persisted record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordLayout {
    attributes: Vec<(String, AttributeType)>,
}

impl RecordLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute. Re-declaring a name replaces the earlier type in place.
    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeType) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = kind,
            None => self.attributes.push((name, kind)),
        }
        self
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeType)> {
        self.attributes.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// `{type: object, properties: {...}}` for this layout.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(name, kind)| (name.clone(), kind.to_json_schema()))
            .collect();
        json!({"type": "object", "properties": properties})
    }

    /// `{type: array, items: <layout schema>}`.
    pub fn to_json_schema_array(&self) -> Value {
        json!({"type": "array", "items": self.to_json_schema()})
    }
}

/// Domain types that know their own persisted layout.
pub trait Record {
    fn layout() -> RecordLayout;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pet;

    impl Record for Pet {
        fn layout() -> RecordLayout {
            RecordLayout::new()
                .attribute("id", AttributeType::Hash)
                .attribute("name", AttributeType::String)
                .attribute("born", AttributeType::Date)
        }
    }

    #[test]
    fn test_flat_layout() {
        assert_eq!(
            Pet::layout().to_json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "name": {"type": "string"},
                    "born": {"type": "number"}
                }
            })
        );
    }

    #[test]
    fn test_nested_documents_and_lists() {
        let owner = RecordLayout::new().attribute("email", AttributeType::String);
        let layout = RecordLayout::new()
            .attribute("owner", AttributeType::Document(owner.clone()))
            .attribute("visits", AttributeType::list(AttributeType::Document(owner)))
            .attribute("tags", AttributeType::list(AttributeType::String))
            .attribute("vaccinated", AttributeType::Boolean);

        let schema = layout.to_json_schema();
        assert_eq!(schema["properties"]["owner"]["properties"]["email"]["type"], "string");
        assert_eq!(schema["properties"]["visits"]["type"], "array");
        assert_eq!(schema["properties"]["visits"]["items"]["type"], "object");
        assert_eq!(schema["properties"]["tags"], json!({"type": "array"}));
        assert_eq!(schema["properties"]["vaccinated"]["type"], "boolean");
    }

    #[test]
    fn test_maps_and_sets_take_member_type() {
        assert_eq!(
            AttributeType::map(AttributeType::Number).to_json_schema(),
            json!({"type": "number"})
        );
        assert_eq!(
            AttributeType::set(AttributeType::String).to_json_schema(),
            json!({"type": "string"})
        );
    }

    #[test]
    fn test_binary_and_null_become_null() {
        assert_eq!(AttributeType::Binary.to_json_schema(), json!({"type": "null"}));
        assert_eq!(AttributeType::Null.to_json_schema(), json!({"type": "null"}));
    }

    #[test]
    fn test_tuple_members_keyed_by_position() {
        let schema = AttributeType::Tuple(vec![AttributeType::String, AttributeType::Number])
            .to_json_schema();
        assert_eq!(schema["properties"]["0"]["type"], "string");
        assert_eq!(schema["properties"]["1"]["type"], "number");
    }

    #[test]
    fn test_redeclared_attribute_replaces_type() {
        let layout = RecordLayout::new()
            .attribute("id", AttributeType::Number)
            .attribute("id", AttributeType::String);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.to_json_schema()["properties"]["id"]["type"], "string");
    }

    #[test]
    fn test_array_form() {
        let schema = Pet::layout().to_json_schema_array();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["properties"]["id"]["type"], "string");
    }
}
