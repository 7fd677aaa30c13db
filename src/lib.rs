//! Jamf site provider
//!
//! Manages Jamf Pro *sites* as declared resources: create, read, update,
//! delete and import, plus a read-only data source that looks a site up by
//! name.
//!
//! # Overview
//!
//! - **Model**: [`SiteConfig`] (what the operator declares), [`Site`] (what
//!   the remote returns) and [`ManagedRecord`] (what gets tracked)
//! - **SiteService trait**: the remote collaborator, injected as `Arc<S>`
//! - **SiteResource**: the lifecycle controller
//! - **SiteDataSource**: name lookups that assign the remote identity
//! - **ProviderService trait**: the JSON contract the invoking runtime drives,
//!   implemented by [`SiteProvider`]
//! - **Schema & validation**: attribute schemas and diagnostics
//! - **Logging**: `tracing` setup writing to stderr
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use jamf_site_provider::{
//!     async_trait, init_logging, ServiceError, Site, SiteAddress, SiteConfig, SiteResource,
//!     SiteService,
//! };
//!
//! struct JamfClient { /* HTTP client, credentials */ }
//!
//! #[async_trait]
//! impl SiteService for JamfClient {
//!     async fn create_site(&self, name: &str, address: &SiteAddress)
//!         -> Result<Site, ServiceError> { todo!() }
//!     async fn get_site_by_name(&self, name: &str) -> Result<Site, ServiceError> { todo!() }
//!     async fn get_site(&self, id: &str) -> Result<Site, ServiceError> { todo!() }
//!     async fn update_site(&self, site: &Site) -> Result<Site, ServiceError> { todo!() }
//!     async fn delete_site(&self, name: &str) -> Result<(), ServiceError> { todo!() }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let sites = SiteResource::new(Arc::new(JamfClient {}));
//!     let record = sites.create(&SiteConfig::new("Campus A")).await?;
//!     tracing::info!(site_id = %record.id, "managed");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod data_source;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use data_source::SiteDataSource;
pub use error::{ServiceError, SiteError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use lookup::SiteLookup;
pub use model::{ManagedRecord, ResourceState, Site, SiteAddress, SiteConfig};
pub use provider::{ProviderOptions, ProviderService, SiteProvider};
pub use resource::SiteResource;
pub use schema::ProviderSchema;
pub use service::SiteService;
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ResourceTimeouts,
    SITE_DATA_SOURCE_TYPE, SITE_RESOURCE_TYPE,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
