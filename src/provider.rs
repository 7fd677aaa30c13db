//! The runtime-facing provider interface.
//!
//! The invoking runtime exchanges state as `serde_json::Value` keyed by
//! resource type. [`ProviderService`] is that contract; [`SiteProvider`]
//! implements it by decoding the JSON into typed site state and delegating
//! to [`SiteResource`] and [`SiteDataSource`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jamf_site_provider::{init_logging, ProviderService, SiteProvider};
//! use serde_json::json;
//!
//! init_logging();
//!
//! let provider = SiteProvider::new(Arc::new(MySiteClient::connect()?));
//! let state = provider.create("jamf_site", json!({"name": "Campus A"})).await?;
//! assert_eq!(state["name"], "Campus A");
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::data_source::SiteDataSource;
use crate::error::SiteError;
use crate::model::{ManagedRecord, SiteConfig};
use crate::resource::SiteResource;
use crate::schema::{site_provider_schema, Diagnostic, ProviderSchema};
use crate::service::SiteService;
use crate::types::{
    ImportedResource, PlanResult, ProviderMetadata, ResourceTimeouts, SITE_DATA_SOURCE_TYPE,
    SITE_RESOURCE_TYPE,
};
use crate::validation::validate;

/// Trait the invoking runtime drives.
///
/// Every operation is keyed by resource (or data source) type and carries
/// state as JSON.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata.
    fn metadata(&self) -> ProviderMetadata;

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, SiteError>;

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        config: Value,
    ) -> Result<PlanResult, SiteError>;

    /// Create a new resource.
    ///
    /// When the resource was created but could not be verified, the error
    /// carries the state to persist (see [`SiteError::record`]).
    async fn create(&self, resource_type: &str, planned_state: Value)
        -> Result<Value, SiteError>;

    /// Read the current state of a resource.
    ///
    /// A resource that no longer exists is reported as an error for which
    /// [`SiteError::is_not_found`] holds; the runtime then drops it to
    /// absent, as [`SiteResource::refresh`] does.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, SiteError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, SiteError>;

    /// Delete a resource, returning the state with its identity cleared.
    async fn delete(&self, resource_type: &str, current_state: Value)
        -> Result<Value, SiteError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, SiteError>;

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, SiteError>;

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, SiteError>;
}

/// Options for configuring a [`SiteProvider`].
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Advisory timeouts published through [`ProviderMetadata`].
    /// Default: 1 minute per operation.
    pub timeouts: ResourceTimeouts,
}

impl ProviderOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all operation timeouts.
    pub fn with_timeouts(mut self, timeouts: ResourceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the create timeout.
    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.create = timeout;
        self
    }

    /// Set the delete timeout.
    pub fn with_delete_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.delete = timeout;
        self
    }
}

/// Provider serving the `jamf_site` resource and data source.
pub struct SiteProvider<S: SiteService + ?Sized> {
    resource: SiteResource<S>,
    data_source: SiteDataSource<S>,
    options: ProviderOptions,
}

impl<S: SiteService + ?Sized> SiteProvider<S> {
    /// Create a provider with default options.
    pub fn new(service: Arc<S>) -> Self {
        Self::with_options(service, ProviderOptions::default())
    }

    /// Create a provider with custom options.
    pub fn with_options(service: Arc<S>, options: ProviderOptions) -> Self {
        Self {
            resource: SiteResource::new(Arc::clone(&service)),
            data_source: SiteDataSource::new(service),
            options,
        }
    }

    /// The typed lifecycle operations behind this provider.
    pub fn resource(&self) -> &SiteResource<S> {
        &self.resource
    }

    /// The options this provider was built with.
    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }
}

fn metadata_from_schema(schema: ProviderSchema, timeouts: ResourceTimeouts) -> ProviderMetadata {
    let mut resources: Vec<String> = schema.resources.into_keys().collect();
    let mut data_sources: Vec<String> = schema.data_sources.into_keys().collect();
    resources.sort();
    data_sources.sort();
    ProviderMetadata {
        resources,
        data_sources,
        timeouts,
    }
}

fn check_resource_type(resource_type: &str) -> Result<(), SiteError> {
    if resource_type == SITE_RESOURCE_TYPE {
        Ok(())
    } else {
        Err(SiteError::UnknownResource(resource_type.to_string()))
    }
}

fn check_data_source_type(data_source_type: &str) -> Result<(), SiteError> {
    if data_source_type == SITE_DATA_SOURCE_TYPE {
        Ok(())
    } else {
        Err(SiteError::UnknownResource(data_source_type.to_string()))
    }
}

fn decode_config(value: Value) -> Result<SiteConfig, SiteError> {
    Ok(serde_json::from_value(value)?)
}

fn decode_record(value: Value) -> Result<ManagedRecord, SiteError> {
    Ok(serde_json::from_value(value)?)
}

fn encode(record: &ManagedRecord) -> Result<Value, SiteError> {
    Ok(serde_json::to_value(record)?)
}

#[async_trait::async_trait]
impl<S: SiteService + ?Sized> ProviderService for SiteProvider<S> {
    fn schema(&self) -> ProviderSchema {
        site_provider_schema()
    }

    fn metadata(&self) -> ProviderMetadata {
        metadata_from_schema(self.schema(), self.options.timeouts)
    }

    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, SiteError> {
        let schema = self.schema();
        let schema = schema
            .resources
            .get(resource_type)
            .ok_or_else(|| SiteError::UnknownResource(resource_type.to_string()))?;
        let diagnostics = validate(schema, &config);
        if diagnostics.is_empty() {
            debug!("ValidateResourceConfig completed successfully");
        } else {
            warn!(
                diagnostics = diagnostics.len(),
                "ValidateResourceConfig completed with errors"
            );
        }
        Ok(diagnostics)
    }

    #[instrument(skip(self, prior_state, config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        config: Value,
    ) -> Result<PlanResult, SiteError> {
        check_resource_type(resource_type)?;
        let prior = prior_state.map(decode_record).transpose()?;
        let config = decode_config(config)?;

        let result = self.resource.plan(prior.as_ref(), &config)?;
        info!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, SiteError> {
        check_resource_type(resource_type)?;
        let config = decode_config(planned_state)?;

        let record = self
            .resource
            .create(&config)
            .await
            .inspect_err(|e| match e.record() {
                Some(record) => error!(site_id = %record.id, error = %e, "Create not verified"),
                None => error!(error = %e, "Create failed"),
            })?;
        info!(site_id = %record.id, "Create completed successfully");
        encode(&record)
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, SiteError> {
        check_resource_type(resource_type)?;
        let record = decode_record(current_state)?;

        let record = self
            .resource
            .read(&record.to_config(), &record)
            .await
            .inspect_err(|e| {
                if e.is_not_found() {
                    warn!(error = %e, "Read found no site");
                } else {
                    error!(error = %e, "Read failed");
                }
            })?;
        debug!("Read completed successfully");
        encode(&record)
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, SiteError> {
        check_resource_type(resource_type)?;
        let prior = decode_record(prior_state)?;
        let config = decode_config(planned_state)?;

        let record = self
            .resource
            .update(&config, &prior.id)
            .await
            .inspect_err(|e| error!(site_id = %prior.id, error = %e, "Update failed"))?;
        info!(site_id = %record.id, "Update completed successfully");
        encode(&record)
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<Value, SiteError> {
        check_resource_type(resource_type)?;
        let record = decode_record(current_state)?;

        let record = self
            .resource
            .delete(&record.to_config(), &record)
            .await
            .inspect_err(|e| error!(error = %e, "Delete failed"))?;
        info!("Delete completed successfully");
        encode(&record)
    }

    #[instrument(skip(self), name = "provider.import_resource")]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, SiteError> {
        check_resource_type(resource_type)?;

        let records = self
            .resource
            .import(id)
            .await
            .inspect_err(|e| error!(error = %e, "ImportResourceState failed"))?;
        info!(imported_count = records.len(), "ImportResourceState completed");
        records
            .iter()
            .map(|record| encode(record).map(|state| ImportedResource::new(resource_type, state)))
            .collect()
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, SiteError> {
        let schema = self.schema();
        let schema = schema
            .data_sources
            .get(data_source_type)
            .ok_or_else(|| SiteError::UnknownResource(data_source_type.to_string()))?;
        Ok(validate(schema, &config))
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, SiteError> {
        check_data_source_type(data_source_type)?;
        let config = decode_config(config)?;

        let record = self
            .data_source
            .read(&config.name)
            .await
            .inspect_err(|e| error!(error = %e, "ReadDataSource failed"))?;
        info!(site_id = %record.id, "ReadDataSource completed successfully");
        encode(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySiteService, ServiceOp};
    use serde_json::json;

    fn provider() -> (Arc<InMemorySiteService>, SiteProvider<InMemorySiteService>) {
        let service = Arc::new(InMemorySiteService::new());
        (Arc::clone(&service), SiteProvider::new(service))
    }

    #[test]
    fn test_metadata_lists_site_types() {
        let (_, provider) = provider();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources, vec!["jamf_site".to_string()]);
        assert_eq!(metadata.data_sources, vec!["jamf_site".to_string()]);
        assert_eq!(metadata.timeouts, ResourceTimeouts::default());
    }

    #[test]
    fn test_options_flow_into_metadata() {
        let service = Arc::new(InMemorySiteService::new());
        let options = ProviderOptions::new()
            .with_timeouts(ResourceTimeouts::uniform(Duration::from_secs(30)))
            .with_create_timeout(Duration::from_secs(120))
            .with_delete_timeout(Duration::from_secs(5));
        let provider = SiteProvider::with_options(service, options);

        let timeouts = provider.metadata().timeouts;
        assert_eq!(timeouts.create, Duration::from_secs(120));
        assert_eq!(timeouts.read, Duration::from_secs(30));
        assert_eq!(timeouts.delete, Duration::from_secs(5));
        assert_eq!(provider.options().timeouts, timeouts);
    }

    #[tokio::test]
    async fn test_create_returns_state_json() {
        let (_, provider) = provider();
        let state = provider
            .create("jamf_site", json!({"name": "Campus A", "city": "Oslo"}))
            .await
            .unwrap();

        assert_eq!(state, json!({"id": "1", "name": "Campus A", "city": "Oslo"}));
    }

    #[tokio::test]
    async fn test_create_unverified_hands_back_state() {
        let service = Arc::new(InMemorySiteService::new().with_next_id(42));
        let provider = SiteProvider::new(Arc::clone(&service));
        service.fail_next(ServiceOp::GetSiteByName).await;

        let err = provider
            .create("jamf_site", json!({"name": "Campus A"}))
            .await
            .unwrap_err();
        let state = serde_json::to_value(err.record().unwrap()).unwrap();
        assert_eq!(state, json!({"id": "42", "name": "Campus A"}));

        // The runtime can keep managing the site from that state.
        let state = provider.read("jamf_site", state).await.unwrap();
        let state = provider.delete("jamf_site", state).await.unwrap();
        assert_eq!(state["id"], "");
        assert!(service.site("42").await.is_none());
    }

    #[tokio::test]
    async fn test_read_vanished_site_is_not_found() {
        let (service, provider) = provider();
        let state = provider
            .create("jamf_site", json!({"name": "Warehouse"}))
            .await
            .unwrap();
        let id = state["id"].as_str().unwrap().to_string();
        service.remove(&id).await;

        let err = provider.read("jamf_site", state.clone()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.record().is_none());

        let record: ManagedRecord = serde_json::from_value(state).unwrap();
        let record = provider
            .resource()
            .refresh(&record.to_config(), &record)
            .await
            .unwrap();
        assert!(!record.is_present());
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let (service, provider) = provider();
        let err = provider
            .create("jamf_building", json!({"name": "A"}))
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::UnknownResource(ref t) if t == "jamf_building"));

        let err = provider.read_data_source("jamf_building", json!({})).await.unwrap_err();
        assert!(matches!(err, SiteError::UnknownResource(_)));
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_state_is_serialization_error() {
        let (_, provider) = provider();
        let err = provider
            .read("jamf_site", json!({"id": 5, "name": "HQ"}))
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_absent_state() {
        let (_, provider) = provider();
        let state = provider
            .create("jamf_site", json!({"name": "HQ"}))
            .await
            .unwrap();

        let state = provider.delete("jamf_site", state).await.unwrap();
        assert_eq!(state["id"], "");
        assert_eq!(state["name"], "HQ");
    }

    #[tokio::test]
    async fn test_update_uses_prior_identity() {
        let (service, provider) = provider();
        let prior = provider
            .create("jamf_site", json!({"name": "HQ", "country": "NO"}))
            .await
            .unwrap();

        let state = provider
            .update("jamf_site", prior.clone(), json!({"name": "HQ", "city": "Oslo"}))
            .await
            .unwrap();

        assert_eq!(state, json!({"id": prior["id"], "name": "HQ", "city": "Oslo"}));
        assert_eq!(service.call_count(ServiceOp::UpdateSite).await, 1);
    }

    #[tokio::test]
    async fn test_import_resource() {
        let (service, provider) = provider();
        service
            .insert("site-123", "HQ", Default::default())
            .await;

        let imported = provider.import_resource("jamf_site", "site-123").await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "jamf_site");
        assert_eq!(imported[0].state, json!({"id": "site-123", "name": "HQ"}));
    }

    #[tokio::test]
    async fn test_validate_resource_config() {
        let (_, provider) = provider();
        let diagnostics = provider
            .validate_resource_config("jamf_site", json!({"city": "Oslo"}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));

        let err = provider
            .validate_resource_config("jamf_building", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_read_data_source() {
        let (service, provider) = provider();
        service.insert("11", "Lab", Default::default()).await;

        let state = provider
            .read_data_source("jamf_site", json!({"name": "Lab"}))
            .await
            .unwrap();
        assert_eq!(state, json!({"id": "11", "name": "Lab"}));

        let diagnostics = provider
            .validate_data_source_config("jamf_site", json!({}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
    }
}
