//! Entity adapter implementations
//!
//! The [`AdapterRouter`] is what the use case actually holds: it dispatches
//! each call to the concrete adapter bound to the entity's `adapter_ref`,
//! so one session can mix providers.

mod loopback;
mod scripted;

pub use loopback::LoopbackAdapter;
pub use scripted::{ScriptStep, ScriptedAdapter};

use async_trait::async_trait;
use circle_application::{AdapterError, EntityAdapter, TurnCall};
use circle_domain::{AdapterRef, DraftMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Routes each turn to the adapter bound to the entity's `adapter_ref`
#[derive(Default)]
pub struct AdapterRouter {
    routes: HashMap<AdapterRef, Arc<dyn EntityAdapter>>,
}

impl AdapterRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an adapter under a ref name, replacing any previous binding
    pub fn bind(mut self, name: impl Into<String>, adapter: Arc<dyn EntityAdapter>) -> Self {
        self.routes.insert(AdapterRef::new(name), adapter);
        self
    }

    pub fn has_route(&self, adapter_ref: &AdapterRef) -> bool {
        self.routes.contains_key(adapter_ref)
    }
}

#[async_trait]
impl EntityAdapter for AdapterRouter {
    async fn invoke(&self, call: TurnCall) -> Result<DraftMessage, AdapterError> {
        let adapter_ref = call.entity.adapter_ref();
        match self.routes.get(adapter_ref) {
            Some(adapter) => {
                debug!(entity = %call.entity.id(), adapter = %adapter_ref, "routing turn");
                adapter.invoke(call).await
            }
            None => Err(AdapterError::NoRoute(adapter_ref.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_application::{PromptContext, TurnPurpose};
    use circle_domain::{
        CircleContext, CircleId, Entity, EntityCapability, EntityId, MessageKind,
    };

    fn call_for(adapter_ref: &str) -> TurnCall {
        let entity = Entity::new(
            EntityId::new("ember"),
            "Ember",
            [EntityCapability::Generate],
            AdapterRef::new(adapter_ref),
        );
        TurnCall {
            entity,
            prompt: PromptContext {
                circle_id: CircleId::new("circle-test"),
                topic: "testing the router".to_string(),
                round: 0,
                purpose: TurnPurpose::Dialogue,
                history: Arc::new(vec![]),
                context: Arc::new(CircleContext::new()),
            },
            deadline: tokio::time::Instant::now() + std::time::Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_routes_by_adapter_ref() {
        let router = AdapterRouter::new().bind("loopback", Arc::new(LoopbackAdapter::new()));

        let draft = router.invoke(call_for("loopback")).await.unwrap();
        assert_eq!(draft.sender, EntityId::new("ember"));
        assert_eq!(draft.kind(), MessageKind::Proposal);
    }

    #[tokio::test]
    async fn test_unbound_ref_is_no_route() {
        let router = AdapterRouter::new();
        let err = router.invoke(call_for("missing")).await.unwrap_err();
        assert!(matches!(err, AdapterError::NoRoute(r) if r == "missing"));
    }
}
