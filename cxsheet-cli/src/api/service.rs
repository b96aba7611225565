//! The agent-management seam used by the batch pipeline

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use super::models::{EntityType, Intent, ResourceKind};
use crate::error::Result;

/// Remote operations on an agent's intents and entity types
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn get_intent(&self, name: &str) -> Result<Intent>;
    async fn create_intent(&self, parent: &str, intent: &Intent) -> Result<Intent>;
    async fn update_intent(&self, name: &str, intent: &Intent) -> Result<Intent>;
    async fn list_intents(&self, parent: &str) -> Result<Vec<Intent>>;

    async fn get_entity_type(&self, name: &str) -> Result<EntityType>;
    async fn create_entity_type(&self, parent: &str, entity_type: &EntityType) -> Result<EntityType>;
    async fn update_entity_type(&self, name: &str, entity_type: &EntityType) -> Result<EntityType>;
    async fn list_entity_types(&self, parent: &str) -> Result<Vec<EntityType>>;

    /// `display_name -> name` when `reverse`, otherwise `name -> display_name`
    async fn list_intents_map(&self, parent: &str, reverse: bool) -> Result<BTreeMap<String, String>> {
        let intents = self.list_intents(parent).await?;
        Ok(name_map(
            intents.iter().map(|i| (i.name.as_deref(), i.display_name.as_str())),
            reverse,
        ))
    }

    async fn list_entity_types_map(
        &self,
        parent: &str,
        reverse: bool,
    ) -> Result<BTreeMap<String, String>> {
        let entity_types = self.list_entity_types(parent).await?;
        Ok(name_map(
            entity_types
                .iter()
                .map(|e| (e.name.as_deref(), e.display_name.as_str())),
            reverse,
        ))
    }
}

fn name_map<'a>(
    pairs: impl Iterator<Item = (Option<&'a str>, &'a str)>,
    reverse: bool,
) -> BTreeMap<String, String> {
    pairs
        .filter_map(|(name, display_name)| {
            let name = name?.to_string();
            let display_name = display_name.to_string();
            Some(if reverse {
                (display_name, name)
            } else {
                (name, display_name)
            })
        })
        .collect()
}

/// A collection the batch submitter can build and push: dispatches to the
/// matching [`AgentService`] calls for its kind.
#[async_trait]
pub trait Resource: Clone + Send + Sync + Serialize + 'static {
    const KIND: ResourceKind;

    fn display_name(&self) -> &str;
    fn name(&self) -> Option<&str>;

    async fn fetch(service: &dyn AgentService, name: &str) -> Result<Self>;
    async fn create(service: &dyn AgentService, parent: &str, item: &Self) -> Result<Self>;
    async fn update(service: &dyn AgentService, name: &str, item: &Self) -> Result<Self>;
    /// `display_name -> name` for every resource of this kind under `parent`
    async fn names(service: &dyn AgentService, parent: &str) -> Result<BTreeMap<String, String>>;
}

#[async_trait]
impl Resource for Intent {
    const KIND: ResourceKind = ResourceKind::Intent;

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn fetch(service: &dyn AgentService, name: &str) -> Result<Self> {
        service.get_intent(name).await
    }

    async fn create(service: &dyn AgentService, parent: &str, item: &Self) -> Result<Self> {
        service.create_intent(parent, item).await
    }

    async fn update(service: &dyn AgentService, name: &str, item: &Self) -> Result<Self> {
        service.update_intent(name, item).await
    }

    async fn names(service: &dyn AgentService, parent: &str) -> Result<BTreeMap<String, String>> {
        service.list_intents_map(parent, true).await
    }
}

#[async_trait]
impl Resource for EntityType {
    const KIND: ResourceKind = ResourceKind::EntityType;

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn fetch(service: &dyn AgentService, name: &str) -> Result<Self> {
        service.get_entity_type(name).await
    }

    async fn create(service: &dyn AgentService, parent: &str, item: &Self) -> Result<Self> {
        service.create_entity_type(parent, item).await
    }

    async fn update(service: &dyn AgentService, name: &str, item: &Self) -> Result<Self> {
        service.update_entity_type(name, item).await
    }

    async fn names(service: &dyn AgentService, parent: &str) -> Result<BTreeMap<String, String>> {
        service.list_entity_types_map(parent, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeAgentService;

    const AGENT: &str = "projects/p/locations/global/agents/a";

    #[tokio::test]
    async fn test_list_map_directions() {
        let service = FakeAgentService::new();
        service.seed_intent(AGENT, "greeting");
        service.seed_intent(AGENT, "order.status");

        let by_display = service.list_intents_map(AGENT, true).await.unwrap();
        let name = &by_display["order.status"];
        assert!(name.starts_with(AGENT));

        let by_name = service.list_intents_map(AGENT, false).await.unwrap();
        assert_eq!(by_name[name], "order.status");
    }

    #[tokio::test]
    async fn test_resource_dispatch_for_entity_types() {
        let service = FakeAgentService::new();
        let created = EntityType::create(
            &service,
            AGENT,
            &EntityType {
                display_name: "color".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let name = created.name().unwrap().to_string();
        let fetched = EntityType::fetch(&service, &name).await.unwrap();
        assert_eq!(fetched.display_name(), "color");

        let names = EntityType::names(&service, AGENT).await.unwrap();
        assert_eq!(names["color"], name);
        assert!(Intent::names(&service, AGENT).await.unwrap().is_empty());
    }
}
