//! Bundled pets API.
//!
//! Served by `route-ledger serve` when no other registry is wired in, and
//! used by the integration tests as a realistic registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::dispatch::{Fault, FaultCatalog, FaultKind, FaultMapping, Reply};
use crate::http::request::RequestEnvelope;
use crate::http::response::ApiResponse;
use crate::routing::{Registry, RegistryError, RegistryHandle, ResponseDescriptor, RouteSpec};
use crate::rules::{JsonSchemaRules, RouteRules, RuleError};
use crate::schema::{AttributeType, Record, RecordLayout, ReferenceObject};

pub const CLIENT_ERROR: FaultKind = FaultKind::new("ClientError");
pub const NOT_FOUND: FaultKind = FaultKind::new("NotFound");
pub const CONFLICT: FaultKind = FaultKind::new("Conflict");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Record for Pet {
    fn layout() -> RecordLayout {
        RecordLayout::new()
            .attribute("id", AttributeType::Hash)
            .attribute("name", AttributeType::String)
            .attribute("tag", AttributeType::String)
    }
}

#[derive(Debug)]
pub enum PetFault {
    Missing(String),
    Exists(String),
}

impl fmt::Display for PetFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetFault::Missing(id) => write!(f, "pet '{}' not found", id),
            PetFault::Exists(id) => write!(f, "pet '{}' already exists", id),
        }
    }
}

impl FaultCatalog for PetFault {
    fn kind(&self) -> FaultKind {
        match self {
            PetFault::Missing(_) => NOT_FOUND,
            PetFault::Exists(_) => CONFLICT,
        }
    }

    fn lineage(&self) -> Vec<FaultKind> {
        vec![CLIENT_ERROR]
    }

    fn details(&self) -> Option<Value> {
        match self {
            PetFault::Missing(id) | PetFault::Exists(id) => Some(json!({ "id": id })),
        }
    }
}

/// Why the sample registry could not be built.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// In-memory pet store shared by the handlers.
#[derive(Debug, Clone, Default)]
pub struct PetStore {
    pets: Arc<RwLock<BTreeMap<String, Pet>>>,
}

impl PetStore {
    pub fn seeded() -> Self {
        let pets = ["fluffy", "spot"]
            .into_iter()
            .map(|id| {
                let pet = Pet {
                    id: id.to_string(),
                    name: id.to_string(),
                    tag: None,
                };
                (pet.id.clone(), pet)
            })
            .collect();
        Self {
            pets: Arc::new(RwLock::new(pets)),
        }
    }

    /// Every pet, or only those carrying `tag`.
    pub async fn list(&self, tag: Option<&str>) -> Vec<Pet> {
        self.pets
            .read()
            .await
            .values()
            .filter(|pet| tag.is_none() || pet.tag.as_deref() == tag)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Pet, PetFault> {
        self.pets
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| PetFault::Missing(id.to_string()))
    }

    pub async fn insert(&self, pet: Pet) -> Result<Pet, PetFault> {
        let mut pets = self.pets.write().await;
        if pets.contains_key(&pet.id) {
            return Err(PetFault::Exists(pet.id));
        }
        pets.insert(pet.id.clone(), pet.clone());
        Ok(pet)
    }

    pub async fn remove(&self, id: &str) -> Result<Pet, PetFault> {
        self.pets
            .write()
            .await
            .remove(id)
            .ok_or_else(|| PetFault::Missing(id.to_string()))
    }
}

fn pet_id(request: &RequestEnvelope) -> Result<String, Fault> {
    request
        .path_parameters
        .get("id")
        .cloned()
        .ok_or_else(|| Fault::new(CLIENT_ERROR, "missing path parameter 'id'"))
}

/// Routes of the pets API, backed by `store`.
pub fn pet_routes(store: PetStore) -> Result<Vec<RouteSpec>, SampleError> {
    let pet_ref = || ReferenceObject::record::<Pet>("pet");
    let not_found = || FaultMapping::new(NOT_FOUND, 404).describe("No pet with that id");

    let list = {
        let store = store.clone();
        move |req: RequestEnvelope, _body: Option<Value>| {
            let store = store.clone();
            async move {
                let pets = store.list(req.query.get("tag").map(String::as_str)).await;
                Reply::json(&pets)
            }
        }
    };

    let fetch = {
        let store = store.clone();
        move |req: RequestEnvelope, _body: Option<Value>| {
            let store = store.clone();
            async move {
                let pet = store.get(&pet_id(&req)?).await?;
                Reply::json(&pet)
            }
        }
    };

    let create = {
        let store = store.clone();
        move |_req: RequestEnvelope, body: Option<Value>| {
            let store = store.clone();
            async move {
                let pet: Pet = serde_json::from_value(body.unwrap_or(Value::Null))
                    .map_err(|e| Fault::new(CLIENT_ERROR, e.to_string()))?;
                let pet = store.insert(pet).await?;
                let body = serde_json::to_value(&pet)
                    .map_err(|e| Fault::unclassified(e.to_string()))?;
                Ok::<_, Fault>(ApiResponse::new(body, 201))
            }
        }
    };

    let remove = move |req: RequestEnvelope, _body: Option<Value>| {
        let store = store.clone();
        async move {
            store.remove(&pet_id(&req)?).await?;
            Ok::<_, Fault>(ApiResponse::new(Value::Null, 204))
        }
    };

    let id_rules = || {
        JsonSchemaRules::object(
            json!({"id": {"type": "string", "pattern": "^[a-z0-9-]+$", "description": "Pet id"}}),
            &["id"],
        )
    };

    Ok(vec![
        RouteSpec::get("/pets", list)
            .operation_id("listPets")
            .summary("List every pet")
            .tag("pets")
            .rules(RouteRules::new().query(JsonSchemaRules::object(
                json!({"tag": {"type": "string", "description": "Only pets with this tag"}}),
                &[],
            )?))
            .response(
                ResponseDescriptor::new(200)
                    .describe("All pets")
                    .schema(json!({"type": "array", "items": {"$ref": pet_ref().pointer()}}))
                    .example(json!([{"id": "fluffy", "name": "fluffy"}]))
                    .reference(pet_ref()),
            ),
        RouteSpec::get("/pets/{id}", fetch)
            .operation_id("getPet")
            .summary("Fetch one pet")
            .tag("pets")
            .rules(RouteRules::new().path(id_rules()?))
            .fault(not_found())
            .fault(FaultMapping::new(CLIENT_ERROR, 400))
            .response(
                ResponseDescriptor::new(200)
                    .describe("The pet")
                    .schema(json!({"$ref": pet_ref().pointer()}))
                    .reference(pet_ref()),
            ),
        RouteSpec::post("/pets", create)
            .operation_id("createPet")
            .summary("Add a pet")
            .tag("pets")
            .rules(RouteRules::new().body(JsonSchemaRules::new(json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "pattern": "^[a-z0-9-]+$"},
                    "name": {"type": "string", "minLength": 1},
                    "tag": {"type": "string"}
                },
                "required": ["id", "name"],
                "additionalProperties": false
            }))?))
            .fault(
                FaultMapping::new(CONFLICT, 409)
                    .describe("A pet with that id exists")
                    .resolve(|fault| {
                        ApiResponse::new(
                            json!({"error": fault.message, "details": fault.details}),
                            409,
                        )
                    }),
            )
            .fault(FaultMapping::new(CLIENT_ERROR, 400).describe("Malformed pet"))
            .response(
                ResponseDescriptor::new(201)
                    .describe("Created")
                    .schema(json!({"$ref": pet_ref().pointer()}))
                    .reference(pet_ref()),
            ),
        RouteSpec::delete("/pets/{id}", remove)
            .operation_id("deletePet")
            .tag("pets")
            .rules(RouteRules::new().path(id_rules()?))
            .fault(not_found())
            .response(ResponseDescriptor::new(204).describe("Deleted")),
    ])
}

/// Frozen registry with the seeded pets API.
pub fn pets_registry() -> Result<RegistryHandle, SampleError> {
    Ok(Registry::from_routes(pet_routes(PetStore::seeded())?)?)
}
