//! The `CxSheets` facade: table in, agent resources out
//!
//! One instance owns the agent-service client and the Google Sheets client,
//! both built from the same service-account key, and reuses them across calls.

use std::path::Path;
use std::sync::Arc;

use crate::api::{
    AgentPath, AgentService, DialogflowClient, EntityType, Intent, ResourceKind,
    ServiceAccountTokenSource, TokenSource,
};
use crate::batch::{
    Action, BatchResult, BatchSubmitter, LogProgress, PacingConfig, ProgressReporter,
};
use crate::config::AppConfig;
use crate::convert::{
    BuildMode, EntityTypeMetadata, EntityTypeSource, IntentMetadata, IntentSource, IntentTables,
    NameSource, SchemaPolicy, Table, flatten_entity_types, flatten_intents,
};
use crate::error::Result;
use crate::sheets::{GoogleSheetsClient, TableLocation, read_csv, read_xlsx, write_csv, write_xlsx};

/// Options shared by the bulk operations
#[derive(Clone, Copy)]
pub struct BulkOptions<'a> {
    /// Push each built collection to the agent
    pub commit: bool,
    /// Schema handling; `None` is strict on create and lenient on update
    pub schema: Option<SchemaPolicy>,
    pub progress: &'a dyn ProgressReporter,
}

impl Default for BulkOptions<'_> {
    fn default() -> Self {
        Self {
            commit: false,
            schema: None,
            progress: &LogProgress,
        }
    }
}

impl<'a> BulkOptions<'a> {
    pub fn commit(commit: bool) -> Self {
        Self {
            commit,
            ..Default::default()
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    fn schema_for(&self, action: Action) -> SchemaPolicy {
        self.schema.unwrap_or(match action {
            Action::Create => SchemaPolicy::Strict,
            Action::Update => SchemaPolicy::Lenient,
        })
    }
}

pub struct CxSheets {
    agents: Arc<dyn AgentService>,
    sheets: GoogleSheetsClient,
    pacing: PacingConfig,
}

impl CxSheets {
    pub fn new(agents: Arc<dyn AgentService>, sheets: GoogleSheetsClient) -> Self {
        Self {
            agents,
            sheets,
            pacing: PacingConfig::default(),
        }
    }

    /// Build both clients from one service-account key
    pub fn from_credentials(credentials: &Path, config: &AppConfig) -> Result<Self> {
        log::info!("create cx credentials {}", credentials.display());
        let tokens: Arc<dyn TokenSource> =
            Arc::new(ServiceAccountTokenSource::from_file(credentials)?);

        let mut dialogflow = DialogflowClient::new(tokens.clone())?;
        if let Some(endpoint) = &config.endpoints.dialogflow {
            dialogflow = dialogflow.with_endpoint(endpoint.as_str());
        }
        if let Some(language_code) = &config.agent.language_code {
            dialogflow = dialogflow.with_language_code(language_code.as_str());
        }

        let sheets = GoogleSheetsClient::new(tokens)?
            .with_endpoints(config.endpoints.sheets.as_str(), config.endpoints.drive.as_str());

        Ok(Self::new(Arc::new(dialogflow), sheets).with_pacing(config.pacing.clone()))
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    // ---- tables -------------------------------------------------------

    pub async fn read_table(&self, location: &TableLocation) -> Result<Table> {
        match location {
            TableLocation::Csv(path) => read_csv(path),
            TableLocation::Xlsx { path, tab } => read_xlsx(path, tab.as_deref()),
            TableLocation::GoogleSheet { sheet, tab } => self.sheets.read_sheet(sheet, tab).await,
        }
    }

    pub async fn write_table(&self, location: &TableLocation, table: &Table) -> Result<()> {
        match location {
            TableLocation::Csv(path) => write_csv(path, table),
            TableLocation::Xlsx { path, tab } => write_xlsx(path, tab.as_deref(), table),
            TableLocation::GoogleSheet { sheet, tab } => {
                self.sheets.write_sheet(sheet, tab, table).await
            }
        }
    }

    /// A Google Sheets tab by spreadsheet title (or id) and tab name
    pub async fn read_sheet(&self, sheet: &str, tab: &str) -> Result<Table> {
        self.sheets.read_sheet(sheet, tab).await
    }

    pub async fn write_sheet(&self, sheet: &str, tab: &str, table: &Table) -> Result<()> {
        self.sheets.write_sheet(sheet, tab, table).await
    }

    // ---- single collections --------------------------------------------

    /// Build a new intent from tables holding only its rows
    pub fn create_intent_from_table(
        &self,
        display_name: &str,
        phrases: &Table,
        params: Option<&Table>,
        meta: Option<&IntentMetadata>,
        mode: &str,
    ) -> Result<Intent> {
        let mode: BuildMode = mode.parse()?;
        let source = IntentSource::from_tables(
            phrases,
            params,
            mode,
            NameSource::Fixed(display_name),
            SchemaPolicy::Strict,
        )?;
        source.build_with(display_name, None, meta)
    }

    /// Rebuild an existing intent's training data, keeping everything else
    pub async fn update_intent_from_table(
        &self,
        intent_name: &str,
        phrases: &Table,
        params: Option<&Table>,
        meta: Option<&IntentMetadata>,
        mode: &str,
    ) -> Result<Intent> {
        let mode: BuildMode = mode.parse()?;
        let existing = self.agents.get_intent(intent_name).await?;
        let source = IntentSource::from_tables(
            phrases,
            params,
            mode,
            NameSource::Fixed(&existing.display_name),
            SchemaPolicy::Lenient,
        )?;
        source.build_with(&existing.display_name, Some(&existing), meta)
    }

    pub fn create_entity_type_from_table(
        &self,
        display_name: &str,
        values: &Table,
        meta: Option<&EntityTypeMetadata>,
    ) -> Result<EntityType> {
        let source =
            EntityTypeSource::from_table(values, NameSource::Fixed(display_name), SchemaPolicy::Strict)?;
        source.build_with(display_name, None, meta)
    }

    pub async fn update_entity_type_from_table(
        &self,
        entity_type_name: &str,
        values: &Table,
        meta: Option<&EntityTypeMetadata>,
    ) -> Result<EntityType> {
        let existing = self.agents.get_entity_type(entity_type_name).await?;
        let source = EntityTypeSource::from_table(
            values,
            NameSource::Fixed(&existing.display_name),
            SchemaPolicy::Lenient,
        )?;
        source.build_with(&existing.display_name, Some(&existing), meta)
    }

    // ---- bulk ------------------------------------------------------------

    pub async fn bulk_create_intents(
        &self,
        agent: &str,
        phrases: &Table,
        params: Option<&Table>,
        mode: &str,
        options: BulkOptions<'_>,
    ) -> BatchResult<Intent> {
        self.bulk_intents(Action::Create, agent, phrases, params, mode, options)
            .await
    }

    pub async fn bulk_update_intents(
        &self,
        agent: &str,
        phrases: &Table,
        params: Option<&Table>,
        mode: &str,
        options: BulkOptions<'_>,
    ) -> BatchResult<Intent> {
        self.bulk_intents(Action::Update, agent, phrases, params, mode, options)
            .await
    }

    pub async fn bulk_create_entity_types(
        &self,
        agent: &str,
        values: &Table,
        options: BulkOptions<'_>,
    ) -> BatchResult<EntityType> {
        self.bulk_entity_types(Action::Create, agent, values, options)
            .await
    }

    pub async fn bulk_update_entity_types(
        &self,
        agent: &str,
        values: &Table,
        options: BulkOptions<'_>,
    ) -> BatchResult<EntityType> {
        self.bulk_entity_types(Action::Update, agent, values, options)
            .await
    }

    async fn bulk_intents(
        &self,
        action: Action,
        agent: &str,
        phrases: &Table,
        params: Option<&Table>,
        mode: &str,
        options: BulkOptions<'_>,
    ) -> BatchResult<Intent> {
        let mode: BuildMode = mode.parse()?;
        let agent = AgentPath::parse(agent)?;
        let source = IntentSource::from_tables(
            phrases,
            params,
            mode,
            NameSource::Column,
            options.schema_for(action),
        )?;

        BatchSubmitter::new(self.agents.as_ref(), &agent)
            .commit(options.commit)
            .pacing(self.pacing.policy(ResourceKind::Intent).clone())
            .progress(options.progress)
            .run(action, &source.display_names(), |name, existing| {
                source.build(name, existing)
            })
            .await
    }

    async fn bulk_entity_types(
        &self,
        action: Action,
        agent: &str,
        values: &Table,
        options: BulkOptions<'_>,
    ) -> BatchResult<EntityType> {
        let agent = AgentPath::parse(agent)?;
        let source =
            EntityTypeSource::from_table(values, NameSource::Column, options.schema_for(action))?;

        BatchSubmitter::new(self.agents.as_ref(), &agent)
            .commit(options.commit)
            .pacing(self.pacing.policy(ResourceKind::EntityType).clone())
            .progress(options.progress)
            .run(action, &source.display_names(), |name, existing| {
                source.build(name, existing)
            })
            .await
    }

    // ---- export ------------------------------------------------------------

    /// Every intent of the agent as advanced-mode phrase and parameter tables
    pub async fn export_intents(&self, agent: &str) -> Result<IntentTables> {
        let agent = AgentPath::parse(agent)?;
        let intents = self.agents.list_intents(agent.as_str()).await?;
        log::info!("Exporting {} intent(s) from {}", intents.len(), agent);
        flatten_intents(&intents)
    }

    /// Every entity type of the agent as value rows
    pub async fn export_entity_types(&self, agent: &str) -> Result<Table> {
        let agent = AgentPath::parse(agent)?;
        let entity_types = self.agents.list_entity_types(agent.as_str()).await?;
        log::info!("Exporting {} entity type(s) from {}", entity_types.len(), agent);
        flatten_entity_types(&entity_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticToken;
    use crate::api::fake::FakeAgentService;
    use crate::batch::NoProgress;
    use crate::error::CxSheetError;

    const AGENT: &str = "projects/p/locations/global/agents/a";

    fn facade() -> (Arc<FakeAgentService>, CxSheets) {
        let fake = Arc::new(FakeAgentService::new());
        let sheets = GoogleSheetsClient::new(Arc::new(StaticToken::new("unused"))).unwrap();
        let cx = CxSheets::new(fake.clone(), sheets).with_pacing(PacingConfig::disabled());
        (fake, cx)
    }

    fn quiet(commit: bool) -> BulkOptions<'static> {
        BulkOptions::commit(commit).with_progress(&NoProgress)
    }

    fn basic_phrases() -> Table {
        let mut table = Table::new(["display_name", "text"]);
        table.push_row(["greet", "hi"]);
        table.push_row(["greet", "hello"]);
        table.push_row(["bye", "goodbye"]);
        table
    }

    #[tokio::test]
    async fn test_invalid_mode_fails_before_reading_rows() {
        let (fake, cx) = facade();
        let garbage = Table::new(["nothing", "useful"]);

        let aborted = cx
            .bulk_create_intents(AGENT, &garbage, None, "fast", quiet(true))
            .await
            .unwrap_err();

        assert!(!aborted.has_progress());
        match aborted.error {
            CxSheetError::Configuration(message) => {
                assert_eq!(message, "mode must be basic or advanced, got 'fast'")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fake.calls().is_empty());

        let err = cx
            .create_intent_from_table("x", &garbage, None, None, "Basic")
            .unwrap_err();
        assert!(matches!(err, CxSheetError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_bulk_create_basic_commits_each_intent() {
        let (fake, cx) = facade();

        let report = cx
            .bulk_create_intents(AGENT, &basic_phrases(), None, "basic", quiet(true))
            .await
            .unwrap();

        assert_eq!(report.submitted, 2);
        assert_eq!(report.built["greet"].training_phrases.len(), 2);
        assert!(report.built["greet"].name.is_some());
        assert_eq!(fake.calls(), vec!["create bye", "create greet"]);
    }

    #[tokio::test]
    async fn test_bulk_create_schema_failure_is_fatal() {
        let (fake, cx) = facade();
        let mut table = Table::new(["display_name", "training_phrase", "part", "text"]);
        table.push_row(["greet", "0", "0", "hi"]);

        let aborted = cx
            .bulk_create_intents(AGENT, &table, None, "advanced", quiet(true))
            .await
            .unwrap_err();

        assert!(matches!(aborted.error, CxSheetError::Schema(_)));
        assert!(aborted.error.to_string().contains("parameter_id"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_update_is_lenient_and_skips_unknown_names() {
        let (fake, cx) = facade();
        fake.seed_intent(AGENT, "greet");

        let mut table = Table::new(["display_name", "training_phrase", "part", "text", "parameter_id"]);
        table.push_row(["greet", "0", "0", "hi there", ""]);
        table.push_row(["greet", "one", "0", "dropped", ""]);
        table.push_row(["unknown", "0", "0", "never sent", ""]);

        let report = cx
            .bulk_update_intents(AGENT, &table, None, "advanced", quiet(true))
            .await
            .unwrap();

        let greet = &report.built["greet"];
        assert_eq!(greet.training_phrases.len(), 1);
        assert_eq!(greet.training_phrases[0].text(), "hi there");
        assert_eq!(greet.description, "seeded greet");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].display_name, "unknown");
        assert_eq!(fake.calls(), vec!["update greet"]);
    }

    #[tokio::test]
    async fn test_update_intent_from_table_keeps_identity() {
        let (fake, cx) = facade();
        let seeded = fake.seed_intent(AGENT, "greet");
        let mut phrases = Table::new(["text"]);
        phrases.push_row(["good morning"]);

        let intent = cx
            .update_intent_from_table(seeded.name.as_deref().unwrap(), &phrases, None, None, "basic")
            .await
            .unwrap();

        assert_eq!(intent.name, seeded.name);
        assert_eq!(intent.display_name, "greet");
        assert_eq!(intent.priority, seeded.priority);
        assert_eq!(intent.training_phrases[0].text(), "good morning");
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_create_entity_type_from_table_with_meta() {
        let (_, cx) = facade();
        let mut values = Table::new(["value", "synonyms"]);
        values.push_row(["red", r#"["red", "scarlet"]"#]);
        let meta = EntityTypeMetadata {
            enable_fuzzy_extraction: Some(true),
            ..Default::default()
        };

        let entity_type = cx
            .create_entity_type_from_table("color", &values, Some(&meta))
            .unwrap();

        assert_eq!(entity_type.display_name, "color");
        assert!(entity_type.enable_fuzzy_extraction);
        assert_eq!(entity_type.entities[0].synonyms, vec!["red", "scarlet"]);
    }

    #[tokio::test]
    async fn test_malformed_synonyms_abort_bulk_entity_create() {
        let (fake, cx) = facade();
        let mut values = Table::new(["display_name", "value", "synonyms"]);
        values.push_row(["a_color", "red", r#"["red"]"#]);
        values.push_row(["b_size", "big", "not-json"]);

        let aborted = cx
            .bulk_create_entity_types(AGENT, &values, quiet(true))
            .await
            .unwrap_err();

        assert!(matches!(aborted.error, CxSheetError::Parse { .. }));
        assert_eq!(fake.calls(), vec!["create a_color"]);
        assert_eq!(aborted.report.submitted, 1);
        assert!(aborted.report.built.contains_key("a_color"));
    }

    #[tokio::test]
    async fn test_bulk_update_entity_types() {
        let (fake, cx) = facade();
        fake.seed_entity_type(AGENT, "color");
        let mut values = Table::new(["display_name", "value", "synonyms"]);
        values.push_row(["color", "green", r#"["green"]"#]);

        let report = cx
            .bulk_update_entity_types(AGENT, &values, quiet(false))
            .await
            .unwrap();

        let color = &report.built["color"];
        assert!(color.enable_fuzzy_extraction);
        assert_eq!(color.entities.len(), 1);
        assert_eq!(report.submitted, 0);
    }

    #[tokio::test]
    async fn test_export_then_update_round_trip() {
        let (fake, cx) = facade();
        let created = cx
            .bulk_create_intents(AGENT, &basic_phrases(), None, "basic", quiet(true))
            .await
            .unwrap();

        let tables = cx.export_intents(AGENT).await.unwrap();
        assert_eq!(tables.training_phrases.len(), 3);

        let report = cx
            .bulk_update_intents(
                AGENT,
                &tables.training_phrases,
                Some(&tables.parameters),
                "advanced",
                quiet(false),
            )
            .await
            .unwrap();

        assert!(report.is_clean());
        for (name, intent) in &created.built {
            assert_eq!(&report.built[name].training_phrases, &intent.training_phrases);
        }
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_read_and_write_local_tables() {
        let (_, cx) = facade();
        let dir = tempfile::tempdir().unwrap();

        for file in ["phrases.csv", "phrases.xlsx#train"] {
            let location: TableLocation = dir.path().join(file).to_string_lossy().parse().unwrap();
            cx.write_table(&location, &basic_phrases()).await.unwrap();
            assert_eq!(cx.read_table(&location).await.unwrap(), basic_phrases());
        }
    }
}
