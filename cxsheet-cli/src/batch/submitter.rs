//! Build-and-submit loop over every display name in a table

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::pacing::{Pacer, PacingPolicy, PacingStats};
use super::progress::{LogProgress, ProgressReporter};
use super::suggest::suggest;
use crate::api::{AgentPath, AgentService, Resource};
use crate::error::{CxSheetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
        }
    }
}

/// A display name that was skipped without aborting the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub display_name: String,
    pub error: String,
}

/// Outcome of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<R> {
    /// Built collections by display name; the server's copy when committed
    pub built: BTreeMap<String, R>,
    pub failures: Vec<ItemFailure>,
    pub submitted: usize,
    pub pacing: PacingStats,
}

impl<R> Default for BatchReport<R> {
    fn default() -> Self {
        Self {
            built: BTreeMap::new(),
            failures: Vec::new(),
            submitted: 0,
            pacing: PacingStats::default(),
        }
    }
}

impl<R> BatchReport<R> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A batch stopped by a fatal error. `report` holds everything built and
/// committed before the stop, with the failing item in `failures`; nothing
/// already committed is rolled back.
#[derive(Debug)]
pub struct BatchAborted<R> {
    pub report: BatchReport<R>,
    pub error: CxSheetError,
}

impl<R> BatchAborted<R> {
    /// Whether any item was reached before the stop
    pub fn has_progress(&self) -> bool {
        !self.report.built.is_empty() || !self.report.failures.is_empty()
    }
}

impl<R> From<CxSheetError> for BatchAborted<R> {
    fn from(error: CxSheetError) -> Self {
        Self {
            report: BatchReport::default(),
            error,
        }
    }
}

impl<R> fmt::Display for BatchAborted<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch aborted after {} built, {} submitted",
            self.report.built.len(),
            self.report.submitted
        )
    }
}

impl<R: fmt::Debug> std::error::Error for BatchAborted<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type BatchResult<R> = std::result::Result<BatchReport<R>, BatchAborted<R>>;

/// Drives [`Resource`] builds for many display names against one agent
pub struct BatchSubmitter<'a> {
    service: &'a dyn AgentService,
    agent: &'a AgentPath,
    commit: bool,
    policy: Option<PacingPolicy>,
    progress: &'a dyn ProgressReporter,
}

impl<'a> BatchSubmitter<'a> {
    pub fn new(service: &'a dyn AgentService, agent: &'a AgentPath) -> Self {
        Self {
            service,
            agent,
            commit: false,
            policy: None,
            progress: &LogProgress,
        }
    }

    /// Push each built collection to the agent instead of only returning it
    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    /// Override the legacy pacing for the resource kind
    pub fn pacing(mut self, policy: PacingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Build every name in `names` with `build`, which receives the current
    /// remote copy on updates. Item-level errors are recorded and skipped;
    /// any other error aborts the run and returns the partial report.
    pub async fn run<R, F>(&self, action: Action, names: &[String], build: F) -> BatchResult<R>
    where
        R: Resource,
        F: FnMut(&str, Option<&R>) -> Result<R>,
    {
        let kind = R::KIND;
        let policy = self
            .policy
            .clone()
            .unwrap_or_else(|| PacingPolicy::for_kind(kind));
        let mut pacer = Pacer::new(kind, policy);

        log::info!(
            "{} {} {}(s) in {}{}",
            action,
            names.len(),
            kind,
            self.agent,
            if self.commit { "" } else { " (dry run)" }
        );

        self.progress.start(kind, names.len());
        let result = self.run_items(action, names, build, &mut pacer).await;
        self.progress.finish();

        let stats = pacer.into_stats();
        match result {
            Ok(mut report) => {
                report.pacing = stats;
                Ok(report)
            }
            Err(mut aborted) => {
                aborted.report.pacing = stats;
                Err(aborted)
            }
        }
    }

    async fn run_items<R, F>(
        &self,
        action: Action,
        names: &[String],
        mut build: F,
        pacer: &mut Pacer,
    ) -> BatchResult<R>
    where
        R: Resource,
        F: FnMut(&str, Option<&R>) -> Result<R>,
    {
        let kind = R::KIND;
        let total = names.len();
        let lookup = match action {
            Action::Update => Some(R::names(self.service, self.agent.as_str()).await?),
            Action::Create => None,
        };

        let mut report = BatchReport::default();
        for (index, display_name) in names.iter().enumerate() {
            let outcome = self
                .run_item(action, display_name, lookup.as_ref(), &mut build, pacer)
                .await;
            match outcome {
                Ok(item) => {
                    if self.commit {
                        report.submitted += 1;
                    }
                    report.built.insert(display_name.clone(), item);
                }
                Err(error) => {
                    log::error!("FAIL to {} - {}", action, error);
                    report.failures.push(ItemFailure {
                        display_name: display_name.clone(),
                        error: error.to_string(),
                    });
                    if !error.is_item_level() {
                        log::error!(
                            "Aborting after {} {}(s) submitted; nothing is rolled back",
                            report.submitted,
                            kind
                        );
                        return Err(BatchAborted { report, error });
                    }
                }
            }
            self.progress.advance(kind, index + 1, total, display_name);
        }

        Ok(report)
    }

    async fn run_item<R, F>(
        &self,
        action: Action,
        display_name: &str,
        lookup: Option<&BTreeMap<String, String>>,
        build: &mut F,
        pacer: &mut Pacer,
    ) -> Result<R>
    where
        R: Resource,
        F: FnMut(&str, Option<&R>) -> Result<R>,
    {
        let kind = R::KIND;
        let target = match lookup {
            Some(map) => match map.get(display_name) {
                Some(name) => Some(name.as_str()),
                None => {
                    return Err(CxSheetError::Lookup {
                        kind,
                        display_name: display_name.to_string(),
                        suggestion: suggest(display_name, map.keys().map(String::as_str))
                            .map(|s| s.name),
                    });
                }
            },
            None => None,
        };

        let existing = match target {
            Some(name) => Some(R::fetch(self.service, name).await?),
            None => None,
        };

        log::info!("{} {} {}", action, kind, display_name);
        let built = build(display_name, existing.as_ref())?;
        if !self.commit {
            return Ok(built);
        }

        pacer.before_submit().await;
        let saved = match target {
            Some(name) => R::update(self.service, name, &built).await?,
            None => R::create(self.service, self.agent.as_str(), &built).await?,
        };
        pacer.after_submit().await;
        Ok(saved)
    }
}
