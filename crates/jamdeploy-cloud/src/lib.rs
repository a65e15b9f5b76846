//! jamdeploy cloud plumbing
//!
//! Provider-agnostic pieces shared by the edge platform providers and the
//! `jamdeploy` CI driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 jamdeploy (CI)                   │
//! │        env → build → publish → report            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │             jamdeploy-cloud-azion                │
//! │   HTTP adapter · resource client · publisher     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                jamdeploy-cloud                   │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────┐ │
//! │  │ Config store │ │ Process/git  │ │ Rollback │ │
//! │  └──────────────┘ └──────────────┘ └──────────┘ │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod git;
pub mod process;
pub mod reporter;
pub mod rollback;

// Re-exports
pub use config::{
    ApplicationRef, ConfigStore, DEFAULT_CONFIG_PATH, DomainRef, FunctionRef, ResourceConfig,
};
pub use error::{CloudError, Result};
pub use git::GitRepo;
pub use process::ProcessRunner;
pub use reporter::Reporter;
pub use rollback::{RollbackReport, UndoResult, UndoStack};
