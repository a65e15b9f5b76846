//! Azion edge platform provider
//!
//! Talks to the Azion resource API and the Vulcan build toolchain to publish
//! a built JAMStack project as an edge application.
//!
//! - [`http`]: single-request HTTP adapter with envelope decoding
//! - [`api`]: typed resource operations behind the [`EdgeApi`] trait
//! - [`vulcan`]: build and storage sync through the Vulcan CLI
//! - [`publish`]: create-or-update orchestration with rollback

pub mod api;
pub mod error;
pub mod http;
pub mod metadata;
pub mod publish;
pub mod vulcan;

pub use api::{
    ApplicationModules, AzionApi, Domain, EdgeApi, EdgeApplication, EdgeFunction,
    FunctionInstance, FunctionUpdate, InstanceUpdate, NewApplication, NewDomain, NewFunction,
    NewInstance, PurgeKind, RequestRule,
};
pub use error::{AzionError, Result};
pub use http::{AZION_API_BASE, ApiResponse, Auth, HttpClient};
pub use metadata::DeployMetadata;
pub use publish::{EdgeModules, PublishInput, Publisher, unique_name};
pub use vulcan::{DEFAULT_ENTRY, Toolchain, VULCAN_COMMAND, Vulcan};
