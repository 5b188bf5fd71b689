//! Registry bootstrap
//!
//! Turns the raw `[[entity]]` tables into a populated registry plus the
//! adapter router the use case will dispatch through. With no entities
//! configured, a default all-capability loopback roster is installed so the
//! binary runs out of the box.

use crate::adapters::{AdapterRouter, LoopbackAdapter};
use crate::config::file_config::FileConfig;
use circle_domain::{AdapterRef, Entity, EntityCapability, EntityId, EntityRegistry, RegistryError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("entity table has an empty id")]
    EmptyEntityId,

    #[error("entity {entity}: {message}")]
    InvalidCapability { entity: String, message: String },

    #[error("entity {entity}: no adapter bound for ref: {adapter}")]
    UnknownAdapter { entity: String, adapter: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The composition root's wired collaborators
pub struct Bootstrap {
    pub registry: Arc<EntityRegistry>,
    pub router: Arc<AdapterRouter>,
    /// Configured participant ids, in roster order
    pub participants: Vec<EntityId>,
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}

/// Build the registry and router from configuration.
pub fn bootstrap(config: &FileConfig) -> Result<Bootstrap, BootstrapError> {
    let router = AdapterRouter::new().bind("loopback", Arc::new(LoopbackAdapter::new()));
    let registry = Arc::new(EntityRegistry::new());
    let mut participants = Vec::new();

    if config.entity.is_empty() {
        info!("No entities configured, installing default loopback roster");
        for id in ["ember", "oak", "sage"] {
            register_default(&registry, id)?;
            participants.push(EntityId::new(id));
        }
        return Ok(Bootstrap {
            registry,
            router: Arc::new(router),
            participants,
        });
    }

    for table in &config.entity {
        let id = EntityId::try_new(table.id.clone()).ok_or(BootstrapError::EmptyEntityId)?;

        let adapter_ref = AdapterRef::new(table.adapter.clone());
        if !router.has_route(&adapter_ref) {
            return Err(BootstrapError::UnknownAdapter {
                entity: table.id.clone(),
                adapter: table.adapter.clone(),
            });
        }

        let capabilities = if table.capabilities.is_empty() {
            EntityCapability::all().to_vec()
        } else {
            table
                .capabilities
                .iter()
                .map(|s| {
                    s.parse().map_err(|message| BootstrapError::InvalidCapability {
                        entity: table.id.clone(),
                        message,
                    })
                })
                .collect::<Result<Vec<EntityCapability>, _>>()?
        };

        let display_name = table.name.clone().unwrap_or_else(|| table.id.clone());
        debug!(entity = %id, adapter = %adapter_ref, "registering entity");
        registry.register(Entity::new(id.clone(), display_name, capabilities, adapter_ref))?;
        participants.push(id);
    }

    Ok(Bootstrap {
        registry,
        router: Arc::new(router),
        participants,
    })
}

fn register_default(registry: &EntityRegistry, id: &str) -> Result<(), BootstrapError> {
    registry.register(Entity::new(
        EntityId::new(id),
        capitalize(id),
        EntityCapability::all(),
        AdapterRef::new("loopback"),
    ))?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
