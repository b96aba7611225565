//! Dialogflow CX REST client (v3beta1)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::auth::TokenSource;
use super::models::{EntityType, Intent, location_of};
use super::service::AgentService;
use crate::error::{CxSheetError, Result};

pub const API_VERSION: &str = "v3beta1";
const PAGE_SIZE: &str = "1000";
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

/// HTTP client shared by the agent, sheets, drive and token calls
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CxSheetError::configuration(format!("cannot build HTTP client: {}", e)))
}

/// Host for a resource: regional agents live on `<location>-dialogflow`
pub fn regional_base_url(resource: &str) -> String {
    match location_of(resource) {
        Some(location) if location != "global" => {
            format!("https://{}-dialogflow.googleapis.com", location)
        }
        _ => "https://dialogflow.googleapis.com".to_string(),
    }
}

pub struct DialogflowClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: Option<String>,
    language_code: Option<String>,
}

impl DialogflowClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let http = http_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?;
        Ok(Self {
            http,
            tokens,
            endpoint: None,
            language_code: None,
        })
    }

    /// Send every request to `endpoint` instead of the regional host
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

    /// Language of the training phrases and entity values read and written
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    fn url(&self, resource: &str, collection: Option<&str>) -> String {
        let base = self
            .endpoint
            .clone()
            .unwrap_or_else(|| regional_base_url(resource));
        match collection {
            Some(collection) => format!("{}/{}/{}/{}", base, API_VERSION, resource, collection),
            None => format!("{}/{}/{}", base, API_VERSION, resource),
        }
    }

    fn with_language(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.language_code {
            Some(code) => request.query(&[("languageCode", code.as_str())]),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let token = self.tokens.token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CxSheetError::remote(operation, e))?;
        let response = check_response(operation, response).await?;
        response
            .json()
            .await
            .map_err(|e| CxSheetError::remote(operation, e))
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, name: &str) -> Result<T> {
        let request = self.with_language(self.http.get(self.url(name, None)));
        self.send(operation, request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        operation: &str,
        parent: &str,
        collection: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.with_language(self.http.post(self.url(parent, Some(collection))).json(body));
        self.send(operation, request).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        operation: &str,
        name: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.with_language(self.http.patch(self.url(name, None)).json(body));
        self.send(operation, request).await
    }

    /// Follow `nextPageToken` until the listing is exhausted
    async fn list_all<T: DeserializeOwned>(
        &self,
        operation: &str,
        parent: &str,
        collection: &str,
    ) -> Result<Vec<T>> {
        let url = self.url(parent, Some(collection));
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&url).query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let mut page: Value = self.send(operation, self.with_language(request)).await?;

            if let Some(batch) = page.get_mut(collection).map(Value::take) {
                let batch: Vec<T> =
                    serde_json::from_value(batch).map_err(|e| CxSheetError::parse(operation, e))?;
                items.extend(batch);
            }

            match page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
            {
                Some(token) => page_token = Some(token.to_string()),
                None => break,
            }
        }

        log::debug!("{}: {} item(s) under {}", operation, items.len(), parent);
        Ok(items)
    }
}

/// Turn a non-2xx response into a remote error carrying Google's message
pub(crate) async fn check_response(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CxSheetError::Remote {
        operation: operation.to_string(),
        status: Some(status.as_u16()),
        message: google_error_message(&body),
    })
}

fn google_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AgentService for DialogflowClient {
    async fn get_intent(&self, name: &str) -> Result<Intent> {
        self.get("get intent", name).await
    }

    async fn create_intent(&self, parent: &str, intent: &Intent) -> Result<Intent> {
        self.post("create intent", parent, "intents", intent).await
    }

    async fn update_intent(&self, name: &str, intent: &Intent) -> Result<Intent> {
        self.patch("update intent", name, intent).await
    }

    async fn list_intents(&self, parent: &str) -> Result<Vec<Intent>> {
        self.list_all("list intents", parent, "intents").await
    }

    async fn get_entity_type(&self, name: &str) -> Result<EntityType> {
        self.get("get entity type", name).await
    }

    async fn create_entity_type(&self, parent: &str, entity_type: &EntityType) -> Result<EntityType> {
        self.post("create entity type", parent, "entityTypes", entity_type)
            .await
    }

    async fn update_entity_type(&self, name: &str, entity_type: &EntityType) -> Result<EntityType> {
        self.patch("update entity type", name, entity_type).await
    }

    async fn list_entity_types(&self, parent: &str) -> Result<Vec<EntityType>> {
        self.list_all("list entity types", parent, "entityTypes")
            .await
    }
}
