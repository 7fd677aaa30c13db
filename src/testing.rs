//! Testing utilities for site provider code.
//!
//! [`InMemorySiteService`] stands in for the remote service and
//! [`ProviderTester`] drives a [`ProviderService`] the way the runtime would.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jamf_site_provider::testing::{InMemorySiteService, ProviderTester};
//! use jamf_site_provider::SiteProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_site() {
//!     let service = Arc::new(InMemorySiteService::new());
//!     let tester = ProviderTester::new(SiteProvider::new(service));
//!
//!     let state = tester
//!         .lifecycle_create("jamf_site", json!({"name": "Campus A"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["name"], "Campus A");
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{ServiceError, SiteError};
use crate::model::{Site, SiteAddress};
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::SiteService;
use crate::types::{ImportedResource, PlanResult};

// =========================================================================
// In-memory remote service
// =========================================================================

/// The remote operations, for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOp {
    /// `create_site`
    CreateSite,
    /// `get_site_by_name`
    GetSiteByName,
    /// `get_site`
    GetSite,
    /// `update_site`
    UpdateSite,
    /// `delete_site`
    DeleteSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Fail without touching any site.
    Before,
    /// Apply the mutation, then report failure.
    AfterApply,
}

type Normalizer = Box<dyn Fn(&mut Site) + Send + Sync>;

struct Inner {
    sites: BTreeMap<String, Site>,
    next_id: u64,
    calls: Vec<ServiceOp>,
    failures: HashMap<ServiceOp, Failure>,
    normalize: Option<Normalizer>,
}

impl Inner {
    fn begin(&mut self, op: ServiceOp) -> Result<Option<Failure>, ServiceError> {
        self.calls.push(op);
        match self.failures.remove(&op) {
            Some(Failure::Before) => Err(injected(op)),
            other => Ok(other),
        }
    }

    fn id_of(&self, name: &str) -> Option<String> {
        self.sites
            .values()
            .find(|site| site.name == name)
            .map(|site| site.id.clone())
    }

    fn store(&mut self, mut site: Site) -> Site {
        if let Some(normalize) = &self.normalize {
            normalize(&mut site);
        }
        self.sites.insert(site.id.clone(), site.clone());
        site
    }
}

fn injected(op: ServiceOp) -> ServiceError {
    ServiceError::failed(format!("injected failure in {:?}", op))
}

/// A remote site service held in memory.
///
/// Identities are assigned from a counter starting at 1, names are unique,
/// and every call is recorded. Failures can be injected per operation.
pub struct InMemorySiteService {
    inner: Mutex<Inner>,
}

impl Default for InMemorySiteService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySiteService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                sites: BTreeMap::new(),
                next_id: 1,
                calls: Vec::new(),
                failures: HashMap::new(),
                normalize: None,
            }),
        }
    }

    /// Start assigning identities from `next_id`.
    pub fn with_next_id(mut self, next_id: u64) -> Self {
        self.inner.get_mut().next_id = next_id;
        self
    }

    /// Store a site directly, bypassing call recording.
    pub async fn insert(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        address: SiteAddress,
    ) -> Site {
        let site = Site {
            id: id.into(),
            name: name.into(),
            address,
        };
        let mut inner = self.inner.lock().await;
        inner.sites.insert(site.id.clone(), site.clone());
        site
    }

    /// Remove a site directly, as if deleted outside the provider.
    pub async fn remove(&self, id: &str) -> Option<Site> {
        self.inner.lock().await.sites.remove(id)
    }

    /// The stored site with the given identity.
    pub async fn site(&self, id: &str) -> Option<Site> {
        self.inner.lock().await.sites.get(id).cloned()
    }

    /// The stored site with the given name.
    pub async fn site_by_name(&self, name: &str) -> Option<Site> {
        let inner = self.inner.lock().await;
        inner
            .id_of(name)
            .and_then(|id| inner.sites.get(&id).cloned())
    }

    /// Every recorded call, in order.
    pub async fn calls(&self) -> Vec<ServiceOp> {
        self.inner.lock().await.calls.clone()
    }

    /// How many times `op` was called.
    pub async fn call_count(&self, op: ServiceOp) -> usize {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| **call == op)
            .count()
    }

    /// Make the next call to `op` fail without changing anything.
    pub async fn fail_next(&self, op: ServiceOp) {
        self.inner.lock().await.failures.insert(op, Failure::Before);
    }

    /// Make the next call to `op` apply its change and then fail.
    pub async fn fail_after_apply(&self, op: ServiceOp) {
        self.inner
            .lock()
            .await
            .failures
            .insert(op, Failure::AfterApply);
    }

    /// Rewrite every created or updated site before storing it, the way a
    /// real service might canonicalize values.
    pub async fn normalize_with<F>(&self, normalize: F)
    where
        F: Fn(&mut Site) + Send + Sync + 'static,
    {
        self.inner.lock().await.normalize = Some(Box::new(normalize));
    }
}

#[async_trait::async_trait]
impl SiteService for InMemorySiteService {
    async fn create_site(&self, name: &str, address: &SiteAddress) -> Result<Site, ServiceError> {
        let mut inner = self.inner.lock().await;
        let failure = inner.begin(ServiceOp::CreateSite)?;

        if inner.id_of(name).is_some() {
            return Err(ServiceError::failed(format!(
                "a site named {} already exists",
                name
            )));
        }

        let id = inner.next_id.to_string();
        inner.next_id += 1;
        let site = inner.store(Site {
            id,
            name: name.to_string(),
            address: address.clone(),
        });

        match failure {
            Some(_) => Err(injected(ServiceOp::CreateSite)),
            None => Ok(site),
        }
    }

    async fn get_site_by_name(&self, name: &str) -> Result<Site, ServiceError> {
        let mut inner = self.inner.lock().await;
        if inner.begin(ServiceOp::GetSiteByName)?.is_some() {
            return Err(injected(ServiceOp::GetSiteByName));
        }

        inner
            .id_of(name)
            .and_then(|id| inner.sites.get(&id).cloned())
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }

    async fn get_site(&self, id: &str) -> Result<Site, ServiceError> {
        let mut inner = self.inner.lock().await;
        if inner.begin(ServiceOp::GetSite)?.is_some() {
            return Err(injected(ServiceOp::GetSite));
        }

        inner
            .sites
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn update_site(&self, site: &Site) -> Result<Site, ServiceError> {
        let mut inner = self.inner.lock().await;
        let failure = inner.begin(ServiceOp::UpdateSite)?;

        if !inner.sites.contains_key(&site.id) {
            return Err(ServiceError::failed(format!("no site with id {}", site.id)));
        }
        if matches!(inner.id_of(&site.name), Some(other) if other != site.id) {
            return Err(ServiceError::failed(format!(
                "a site named {} already exists",
                site.name
            )));
        }

        let updated = inner.store(site.clone());
        match failure {
            Some(_) => Err(injected(ServiceOp::UpdateSite)),
            None => Ok(updated),
        }
    }

    async fn delete_site(&self, name: &str) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let failure = inner.begin(ServiceOp::DeleteSite)?;

        let id = inner
            .id_of(name)
            .ok_or_else(|| ServiceError::failed(format!("no site named {}", name)))?;
        inner.sites.remove(&id);

        match failure {
            Some(_) => Err(injected(ServiceOp::DeleteSite)),
            None => Ok(()),
        }
    }
}

// =========================================================================
// Provider harness
// =========================================================================

/// A test harness for [`ProviderService`] implementations.
///
/// Wraps a provider and exposes the runtime's call sequences without any
/// runtime in between.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate a resource configuration.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, SiteError> {
        self.provider.plan(resource_type, None, config).await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, SiteError> {
        self.provider
            .plan(resource_type, Some(prior_state), config)
            .await
    }

    /// Create a new resource.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, SiteError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, SiteError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, SiteError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<Value, SiteError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, SiteError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, SiteError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: validate → plan → create → read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        Ok(self.read(resource_type, created).await?)
    }

    /// Run a full update lifecycle: validate → plan → update → read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        Ok(self.read(resource_type, updated).await?)
    }

    /// Run a full CRUD lifecycle: create → update → delete.
    ///
    /// Returns the state after the update and the state after the delete.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<(Value, Value), TestError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        let deleted = self.delete(resource_type, updated.clone()).await?;
        Ok((updated, deleted))
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(SiteError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<SiteError> for TestError {
    fn from(e: SiteError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a state value tracks an existing site.
///
/// # Panics
///
/// Panics if the state has no `id` or an empty one.
pub fn assert_present(state: &Value) {
    let id = state.get("id").and_then(Value::as_str).unwrap_or_default();
    assert!(
        !id.is_empty(),
        "Expected state to track a site, but it has no id: {}",
        state
    );
}

/// Assert that a state value tracks no site.
///
/// # Panics
///
/// Panics if the state has a non-empty `id`.
pub fn assert_absent(state: &Value) {
    let id = state.get("id").and_then(Value::as_str).unwrap_or_default();
    assert!(id.is_empty(), "Expected state to be absent, but id is '{}'", id);
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
