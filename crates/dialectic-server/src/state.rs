use dialectic_core::broadcast::{Broadcaster, Listener, ListenerClosed};
use dialectic_core::config::Config;
use dialectic_core::event::Event;
use dialectic_core::pipeline::{DispatchReport, Dispatcher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::error::AppError;

/// Listener backed by an unbounded channel. Delivery fails once the
/// receiving side (a socket or SSE stream task) has gone away.
pub struct ChannelListener(mpsc::UnboundedSender<String>);

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self(tx)
    }
}

impl Listener for ChannelListener {
    fn deliver(&self, payload: &str) -> Result<(), ListenerClosed> {
        self.0.send(payload.to_string()).map_err(|_| ListenerClosed)
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub dispatcher: Arc<Mutex<Dispatcher>>,
    pub broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// Load `.dialectic/config.yaml` (defaults when absent) and build the
    /// dispatcher. Configuration problems surface here, before serving.
    pub fn load(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load_or_default(&root)?;
        Self::with_config(root, config)
    }

    pub fn with_config(root: PathBuf, config: Config) -> anyhow::Result<Self> {
        let dispatcher = Dispatcher::from_config(&root, &config)?;
        Ok(Self {
            root,
            config: Arc::new(config),
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            broadcaster: Arc::new(Broadcaster::new()),
        })
    }

    /// Run one event through the pipeline on the blocking pool, then fan the
    /// resulting messages out to every listener.
    ///
    /// Events are processed one at a time: the dispatcher mutex is held for
    /// the whole pass.
    pub async fn run_event(&self, event: Event) -> Result<DispatchReport, AppError> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let broadcaster = Arc::clone(&self.broadcaster);
        let report = tokio::task::spawn_blocking(move || {
            let report = {
                let mut d = dispatcher.lock().unwrap_or_else(|e| e.into_inner());
                d.dispatch(&event)
            };
            broadcaster.broadcast_all(&report.messages)?;
            Ok::<_, dialectic_core::DialecticError>(report)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs_ready(dir: &TempDir) -> Config {
        let config = Config::new("test-project");
        std::fs::create_dir_all(config.docs_dir(dir.path())).unwrap();
        config
    }

    #[test]
    fn missing_docs_dir_fails_at_load() {
        let dir = TempDir::new().unwrap();
        assert!(AppState::load(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn channel_listener_closes_with_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = ChannelListener::new(tx);
        assert!(listener.deliver("a").is_ok());
        drop(rx);
        assert_eq!(listener.deliver("b"), Err(ListenerClosed));
    }

    #[tokio::test]
    async fn run_event_broadcasts_report_messages() {
        let dir = TempDir::new().unwrap();
        let config = docs_ready(&dir);
        let app = AppState::with_config(dir.path().to_path_buf(), config).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        app.broadcaster.register(Arc::new(ChannelListener::new(tx)));

        let report = app
            .run_event(Event::new("Add JWT authentication", vec!["auth/jwt.py".into()]))
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            received.push(msg);
        }
        assert_eq!(received.len(), report.messages.len());
        assert!(received[0].contains("\"type\":\"agent_generated\""));
    }

    #[tokio::test]
    async fn concurrent_runs_are_serialized() {
        let dir = TempDir::new().unwrap();
        let config = docs_ready(&dir);
        let app = AppState::with_config(dir.path().to_path_buf(), config).unwrap();

        let event = || Event::new("Add JWT authentication", vec!["auth/jwt.py".into()]);
        let (a, b) = tokio::join!(app.run_event(event()), app.run_event(event()));
        a.unwrap();
        b.unwrap();

        let d = app.dispatcher.lock().unwrap();
        assert_eq!(
            d.counter()
                .counters()
                .get("sec:true|mvp:false|perf:false|err:false"),
            2
        );
    }
}
