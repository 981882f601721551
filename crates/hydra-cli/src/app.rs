//! Engine assembly for the binary.

use crate::git::{GitCloner, GitWorktrees};
use crate::local::{FolderEditor, KeepfilesCopier, LogView};
use crate::response::{ErrorPayload, Response};
use hydra_hook::{HandlerError, HookRegistry};
use hydra_runtime::config::HydraConfig;
use hydra_runtime::{wire_modules, Dispatcher, EventHandler};
use hydra_types::{DomainEvent, Intent};
use hydra_workspace::intents::EVENT_TYPES;
use hydra_workspace::{
    default_modules, register_operations, AppState, Services, UiMode, UiState, WorkspaceError,
    WorkspaceSettings,
};
use std::sync::Arc;

/// Forwards every domain event to the log.
struct EventLog;

impl EventHandler for EventLog {
    fn on_event(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        tracing::info!(event = %event.event_type(), payload = %event.payload(), "domain event");
        Ok(())
    }
}

/// A wired dispatcher plus the state its modules share.
pub struct HydraApp {
    dispatcher: Dispatcher,
    app_state: Arc<AppState>,
}

impl HydraApp {
    /// Builds the engine with git-backed collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidMode`] if `workspace.initial_mode`
    /// is not a known mode.
    pub fn new(config: &HydraConfig) -> Result<Self, WorkspaceError> {
        let initial_mode: UiMode = config.workspace.initial_mode.parse()?;
        let services = Services {
            settings: WorkspaceSettings::from_config(&config.workspace),
            app_state: Arc::new(AppState::new()),
            ui_state: Arc::new(UiState::new(initial_mode)),
            worktrees: Arc::new(GitWorktrees),
            cloner: Arc::new(GitCloner),
            editor: Arc::new(FolderEditor),
            copier: Arc::new(KeepfilesCopier),
            view: Arc::new(LogView),
        };
        Ok(Self::with_services(config, &services))
    }

    /// Builds the engine over caller-supplied collaborators.
    pub fn with_services(config: &HydraConfig, services: &Services) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let dispatcher =
            Dispatcher::new(Arc::clone(&hooks)).with_max_depth(config.engine.max_dispatch_depth);

        register_operations(&dispatcher);
        let report = wire_modules(default_modules(services), &hooks, &dispatcher);
        for event_type in EVENT_TYPES {
            dispatcher.subscribe(event_type, Arc::new(EventLog));
        }
        tracing::debug!(
            modules = report.modules.len(),
            hooks = report.hooks,
            max_depth = dispatcher.max_depth(),
            "engine ready"
        );

        Self {
            dispatcher,
            app_state: Arc::clone(&services.app_state),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// Dispatches one intent.
    pub async fn handle(&self, intent: Intent) -> Response {
        Response::from_dispatch(self.dispatcher.dispatch(intent).await)
    }

    /// Parses a `{ "type", "payload" }` line and dispatches it.
    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Intent>(line) {
            Ok(intent) => self.handle(intent).await,
            Err(e) => Response::Error {
                error: ErrorPayload::invalid_request(format!("not an intent: {e}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> HydraApp {
        HydraApp::new(&HydraConfig::default()).expect("default config builds")
    }

    #[test]
    fn every_operation_is_registered() {
        let app = app();
        assert_eq!(
            app.dispatcher().registered_types(),
            vec![
                "project:close",
                "project:open",
                "ui:set-mode",
                "workspace:create",
                "workspace:switch",
            ]
        );
        assert_eq!(app.dispatcher().interceptor_ids().len(), 1);
    }

    #[test]
    fn invalid_initial_mode_is_rejected() {
        let mut config = HydraConfig::default();
        config.workspace.initial_mode = "fullscreen".into();
        let err = HydraApp::new(&config).err().expect("bad mode");
        assert_eq!(err, WorkspaceError::InvalidMode("fullscreen".into()));
    }

    #[tokio::test]
    async fn set_mode_line_round_trips() {
        let app = app();
        let response = app
            .handle_line(r#"{"type":"ui:set-mode","payload":{"mode":"dialog"}}"#)
            .await;
        assert_eq!(
            response,
            Response::Ok {
                result: json!({"mode": "dialog", "previousMode": "workspace"})
            }
        );
    }

    #[tokio::test]
    async fn malformed_line_is_a_request_error() {
        let response = app().handle_line("open please").await;
        match response {
            Response::Error { error } => assert_eq!(error.kind, "request"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_type_is_a_routing_error() {
        let response = app()
            .handle(Intent::new("project:rename", json!({})))
            .await;
        match response {
            Response::Error { error } => {
                assert_eq!(error.kind, "routing");
                assert_eq!(error.code, "DISPATCH_UNKNOWN_INTENT");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn switching_to_unknown_workspace_leaves_state_alone() {
        let app = app();
        let response = app
            .handle_line(r#"{"type":"workspace:switch","payload":{"path":"/nowhere"}}"#)
            .await;
        assert!(response.is_error());
        assert_eq!(app.app_state().active(), None);
    }
}
