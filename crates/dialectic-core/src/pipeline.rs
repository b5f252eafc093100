use crate::classifier::{Analysis, Classifier};
use crate::config::Config;
use crate::counter::{Counter, CounterSummary};
use crate::error::Result;
use crate::event::Event;
use crate::history::{History, HistoryEntry};
use crate::message::{AgentInfo, DocUpdate, OutboundMessage, ProcessStatus};
use crate::selector::Selector;
use crate::template::Template;
use crate::types::Outcome;
use crate::writer::{DocWriter, FileUpdateRecord};
use serde::Serialize;
use std::path::Path;

/// Everything one pass through the pipeline produced.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub analysis: Analysis,
    pub templates: Vec<String>,
    pub updates: Vec<FileUpdateRecord>,
    pub outcome: Outcome,
    /// False when the counters could not be saved. The in-memory counts are
    /// still current.
    pub persisted: bool,
    /// Messages to fan out once the pass is complete, in emission order.
    pub messages: Vec<OutboundMessage>,
}

impl DispatchReport {
    pub fn pattern(&self) -> &str {
        &self.analysis.pattern
    }

    pub fn files_written(&self) -> usize {
        self.updates.iter().filter(|u| u.succeeded()).count()
    }

    pub fn files_failed(&self) -> usize {
        self.updates.len() - self.files_written()
    }

    pub fn status(&self) -> ProcessStatus {
        match (self.files_written(), self.files_failed()) {
            (_, 0) => ProcessStatus::Success,
            (0, _) => ProcessStatus::Failed,
            _ => ProcessStatus::Partial,
        }
    }
}

/// Classify, select, write, count: the full path an event takes.
///
/// Holds the only `Counter` for its counters file; share it behind a mutex so
/// events are processed one at a time.
#[derive(Debug)]
pub struct Dispatcher {
    classifier: Classifier,
    selector: Selector,
    fallback: Option<Template>,
    writer: DocWriter,
    counter: Counter,
    history: History,
}

impl Dispatcher {
    pub fn new(
        classifier: Classifier,
        selector: Selector,
        fallback: Option<Template>,
        writer: DocWriter,
        counter: Counter,
        history: History,
    ) -> Self {
        Self {
            classifier,
            selector,
            fallback,
            writer,
            counter,
            history,
        }
    }

    /// Validate `config` against `root` and load persisted counters.
    ///
    /// Fails before any event is accepted if a category has no template, the
    /// docs directory is missing, or the counters file is unreadable.
    pub fn from_config(root: &Path, config: &Config) -> Result<Self> {
        config.check(root)?;
        let selector = Selector::new(config.templates.clone())?;
        let counter = Counter::open(config.counters_path(root))?;
        let history = History::open(config.history_path(root));
        tracing::info!(
            docs = %config.docs_dir(root).display(),
            counters = %counter.path().display(),
            events = counter.counters().total_events,
            history = history.len(),
            "dispatcher ready"
        );
        Ok(Self::new(
            Classifier::from_keywords(&config.keywords),
            selector,
            config.fallback.clone(),
            DocWriter::new(config.docs_dir(root)),
            counter,
            history,
        ))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn summary(&self, top: usize) -> CounterSummary {
        self.counter.summary(top)
    }

    /// Run `event` through the pipeline.
    ///
    /// Write failures land in the report rather than aborting; a failure to
    /// save counters is logged and reported as `persisted == false`. History
    /// save failures are only logged.
    pub fn dispatch(&mut self, event: &Event) -> DispatchReport {
        let analysis = self.classifier.analyze(event);
        let flags = analysis.flags;

        let mut templates = self.selector.select(&flags);
        if templates.is_empty() {
            if let Some(fallback) = &self.fallback {
                templates.push(fallback.clone());
            }
        }

        let updates: Vec<FileUpdateRecord> = templates
            .iter()
            .flat_map(|t| self.writer.apply(t, event, &flags))
            .collect();

        let outcome = if updates.iter().all(|u| u.succeeded()) {
            Outcome::Success
        } else {
            Outcome::Failure
        };

        let persisted = match self.counter.record(&flags, &templates, outcome) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(pattern = %analysis.pattern, "failed to persist counters: {e}");
                false
            }
        };

        let mut report = DispatchReport {
            analysis,
            templates: templates.iter().map(|t| t.name.clone()).collect(),
            updates,
            outcome,
            persisted,
            messages: Vec::new(),
        };
        report.messages = self.messages_for(&report, &templates);

        let entry = HistoryEntry {
            timestamp: event.timestamp,
            pattern: report.analysis.pattern.clone(),
            templates: report.templates.clone(),
            outcome,
            updates: report.files_written(),
            files_failed: report.files_failed(),
            message: event.message.clone(),
            files: event.files.clone(),
            error_count: event.error_count(),
        };
        if let Err(e) = self.history.push(entry) {
            tracing::warn!(path = %self.history.path().display(), "failed to save history: {e}");
        }

        tracing::info!(
            pattern = %report.pattern(),
            templates = report.templates.len(),
            written = report.files_written(),
            failed = report.files_failed(),
            "event dispatched"
        );
        report
    }

    fn messages_for(&self, report: &DispatchReport, templates: &[Template]) -> Vec<OutboundMessage> {
        let now = chrono::Utc::now().timestamp();
        let mut messages = Vec::with_capacity(templates.len() + report.updates.len() + 3);

        for template in templates {
            messages.push(OutboundMessage::AgentGenerated {
                agent: AgentInfo {
                    id: format!("{}_{}", template.name, uuid::Uuid::new_v4().simple()),
                    kind: template.name.clone(),
                    name: template.display_name.clone(),
                    description: template.description.clone(),
                    capabilities: template.capabilities.clone(),
                    generated_at: now,
                },
            });
        }

        if !templates.is_empty() {
            messages.push(OutboundMessage::WorkflowExecuted {
                workflow_id: format!("workflow_{}", uuid::Uuid::new_v4().simple()),
                execution_id: uuid::Uuid::new_v4().to_string(),
            });
        }

        for update in &report.updates {
            let content = match &update.error {
                Some(e) => format!("{} failed: {e}", update.template),
                None => format!("{} appended {} bytes", update.template, update.bytes_written),
            };
            messages.push(OutboundMessage::DocumentationUpdated {
                update: DocUpdate {
                    action: update.action().to_string(),
                    file: update.target.clone(),
                    content,
                    kind: update.template.clone(),
                },
            });
        }

        // Successes are only counted globally, so every pattern reports the
        // same ratio.
        messages.push(OutboundMessage::LearningEvent {
            event_type: "pattern_recognized".into(),
            pattern: report.analysis.pattern.clone(),
            confidence: self.counter.success_rate(),
        });

        messages.push(OutboundMessage::EventProcessed {
            pattern: report.analysis.pattern.clone(),
            status: report.status(),
            files_written: report.files_written(),
            files_failed: report.files_failed(),
        });

        messages
    }
}
