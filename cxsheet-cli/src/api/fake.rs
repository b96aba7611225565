//! In-memory agent used by tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::models::{EntityType, Intent, ResourceKind};
use super::service::AgentService;
use crate::error::{CxSheetError, Result};

/// Stores resources in memory and records every mutating call
#[derive(Default)]
pub struct FakeAgentService {
    intents: Mutex<Vec<Intent>>,
    entity_types: Mutex<Vec<EntityType>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl FakeAgentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_intent(&self, parent: &str, display_name: &str) -> Intent {
        let mut intents = self.intents.lock().unwrap();
        let intent = Intent {
            name: Some(format!("{}/intents/{}", parent, intents.len() + 1)),
            display_name: display_name.to_string(),
            priority: 500_000,
            description: format!("seeded {}", display_name),
            ..Default::default()
        };
        intents.push(intent.clone());
        intent
    }

    pub fn seed_entity_type(&self, parent: &str, display_name: &str) -> EntityType {
        let mut entity_types = self.entity_types.lock().unwrap();
        let entity_type = EntityType {
            name: Some(format!("{}/entityTypes/{}", parent, entity_types.len() + 1)),
            display_name: display_name.to_string(),
            enable_fuzzy_extraction: true,
            ..Default::default()
        };
        entity_types.push(entity_type.clone());
        entity_type
    }

    /// Make any create or update of `display_name` fail with a remote error
    pub fn fail_on(&self, display_name: &str) {
        *self.fail_on.lock().unwrap() = Some(display_name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn intents(&self) -> Vec<Intent> {
        self.intents.lock().unwrap().clone()
    }

    fn record(&self, call: String, display_name: &str) -> Result<()> {
        if self.fail_on.lock().unwrap().as_deref() == Some(display_name) {
            return Err(CxSheetError::Remote {
                operation: call,
                status: Some(500),
                message: "internal error".to_string(),
            });
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn missing(kind: ResourceKind, name: &str) -> CxSheetError {
        CxSheetError::Remote {
            operation: format!("get {}", kind),
            status: Some(404),
            message: format!("{} not found", name),
        }
    }
}

#[async_trait]
impl AgentService for FakeAgentService {
    async fn get_intent(&self, name: &str) -> Result<Intent> {
        self.intents
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| Self::missing(ResourceKind::Intent, name))
    }

    async fn create_intent(&self, parent: &str, intent: &Intent) -> Result<Intent> {
        self.record(format!("create {}", intent.display_name), &intent.display_name)?;
        let mut intents = self.intents.lock().unwrap();
        let mut created = intent.clone();
        created.name = Some(format!("{}/intents/{}", parent, intents.len() + 1));
        intents.push(created.clone());
        Ok(created)
    }

    async fn update_intent(&self, name: &str, intent: &Intent) -> Result<Intent> {
        self.record(format!("update {}", intent.display_name), &intent.display_name)?;
        let mut intents = self.intents.lock().unwrap();
        let slot = intents
            .iter_mut()
            .find(|i| i.name.as_deref() == Some(name))
            .ok_or_else(|| Self::missing(ResourceKind::Intent, name))?;
        *slot = intent.clone();
        Ok(slot.clone())
    }

    async fn list_intents(&self, parent: &str) -> Result<Vec<Intent>> {
        Ok(self
            .intents
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.name.as_deref().is_some_and(|n| n.starts_with(parent)))
            .cloned()
            .collect())
    }

    async fn get_entity_type(&self, name: &str) -> Result<EntityType> {
        self.entity_types
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| Self::missing(ResourceKind::EntityType, name))
    }

    async fn create_entity_type(&self, parent: &str, entity_type: &EntityType) -> Result<EntityType> {
        self.record(
            format!("create {}", entity_type.display_name),
            &entity_type.display_name,
        )?;
        let mut entity_types = self.entity_types.lock().unwrap();
        let mut created = entity_type.clone();
        created.name = Some(format!("{}/entityTypes/{}", parent, entity_types.len() + 1));
        entity_types.push(created.clone());
        Ok(created)
    }

    async fn update_entity_type(&self, name: &str, entity_type: &EntityType) -> Result<EntityType> {
        self.record(
            format!("update {}", entity_type.display_name),
            &entity_type.display_name,
        )?;
        let mut entity_types = self.entity_types.lock().unwrap();
        let slot = entity_types
            .iter_mut()
            .find(|e| e.name.as_deref() == Some(name))
            .ok_or_else(|| Self::missing(ResourceKind::EntityType, name))?;
        *slot = entity_type.clone();
        Ok(slot.clone())
    }

    async fn list_entity_types(&self, parent: &str) -> Result<Vec<EntityType>> {
        Ok(self
            .entity_types
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name.as_deref().is_some_and(|n| n.starts_with(parent)))
            .cloned()
            .collect())
    }
}
