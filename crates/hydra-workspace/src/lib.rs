//! Project and workspace management on top of the intent engine.
//!
//! This crate supplies the *what*: five Operations, the plugin modules
//! that contribute their hook handlers, the in-memory state those
//! handlers maintain and the collaborator traits through which they
//! reach git, the editor server and the window layer.
//!
//! ```text
//! ┌──────────────┐  register_operations   ┌────────────────────┐
//! │  operations  │ ─────────────────────► │                    │
//! └──────────────┘                        │  hydra_runtime::   │
//! ┌──────────────┐  default_modules       │    Dispatcher      │
//! │   modules    │ ─────────────────────► │  + HookRegistry    │
//! └──────┬───────┘  (wire_modules)        └────────────────────┘
//!        │ Arc
//!        ▼
//! ┌──────────────┐   ┌──────────────────────────────────────────┐
//! │ AppState     │   │ WorktreeProvider  RepositoryCloner       │
//! │ UiState      │   │ EditorLauncher    FileCopier  ViewManager│
//! └──────────────┘   └──────────────────────────────────────────┘
//! ```
//!
//! # Wiring
//!
//! ```ignore
//! let hooks = Arc::new(HookRegistry::new());
//! let dispatcher = Dispatcher::new(hooks.clone());
//! register_operations(&dispatcher);
//! wire_modules(default_modules(&services), &hooks, &dispatcher);
//! ```

mod collaborators;
mod error;
pub mod intents;
pub mod modules;
pub mod normalize;
pub mod operations;
mod state;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use collaborators::{
    EditorLauncher, FileCopier, RepositoryCloner, ViewManager, WorktreeProvider,
};
pub use error::WorkspaceError;
pub use modules::{default_modules, Services, WorkspaceSettings};
pub use operations::{register_operations, Discovery, Teardown};
pub use state::{AppState, UiState};
pub use types::{DiscoveredWorktree, Project, ProjectSource, UiMode, Workspace};
