//! The site resource lifecycle.
//!
//! [`SiteResource`] maps declared configuration onto the remote service:
//!
//! ```text
//! Absent --create--> Present --update--> Present --delete--> Absent
//! Absent --import--> Present
//! Present --refresh (site gone)--> Absent
//! ```
//!
//! Read, update-verification and delete resolve the site by **name**, not by
//! the tracked identity. Renaming a site outside this provider therefore
//! breaks tracking; that is the established contract and is kept as-is.
//!
//! # Partial update failures
//!
//! When `update_site` fails, the error is returned and the caller keeps its
//! pre-update record. If the service had already applied part of the update,
//! the record and the remote site disagree until the next successful read.
//! No rollback or retry is attempted.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::SiteError;
use crate::lookup::SiteLookup;
use crate::model::{ManagedRecord, Site, SiteConfig};
use crate::service::SiteService;
use crate::types::{AttributeChange, PlanResult};

/// Lifecycle operations for one kind of managed site.
///
/// Holds no per-resource state: every operation takes the declared config
/// (and the tracked record where relevant) and returns the updated record.
pub struct SiteResource<S: SiteService + ?Sized> {
    service: Arc<S>,
}

impl<S: SiteService + ?Sized> Clone for SiteResource<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: SiteService + ?Sized> SiteResource<S> {
    /// Create a resource bound to the given remote service.
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// The remote service this resource talks to.
    pub fn service(&self) -> &S {
        &self.service
    }

    fn lookup(&self) -> SiteLookup<'_, S> {
        SiteLookup::new(&*self.service)
    }

    /// Create the site and return its normalized record.
    ///
    /// The identity comes from the service. After creation the site is read
    /// back by name so every field reflects the remote values.
    ///
    /// If that read-back fails the site still exists remotely, so the error
    /// is [`SiteError::Unverified`] carrying the record with its new identity.
    #[instrument(skip(self, config), fields(site_name = %config.name), name = "site.create")]
    pub async fn create(&self, config: &SiteConfig) -> Result<ManagedRecord, SiteError> {
        require_name(config)?;

        let created = self
            .service
            .create_site(&config.name, &config.address)
            .await?;
        info!(site_id = %created.id, "Site created");

        let record = ManagedRecord {
            id: created.id,
            ..ManagedRecord::from_config(config)
        };
        match self.read(config, &record).await {
            Ok(refreshed) => Ok(refreshed),
            Err(source) => {
                warn!(site_id = %record.id, error = %source, "Created site could not be read back");
                Err(SiteError::Unverified {
                    record,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Refresh the record from the remote site with the declared name.
    ///
    /// Returns [`SiteError::NotFound`] when no such site exists. The
    /// identity in `record` is carried over unchanged.
    #[instrument(skip(self, config, record), fields(site_name = %config.name), name = "site.read")]
    pub async fn read(
        &self,
        config: &SiteConfig,
        record: &ManagedRecord,
    ) -> Result<ManagedRecord, SiteError> {
        let site = self.lookup().by_name(&config.name).await?;

        let mut refreshed = record.clone();
        refreshed.observe(site);
        Ok(refreshed)
    }

    /// Like [`read`](Self::read), but a missing site yields the record with
    /// its identity cleared instead of an error.
    #[instrument(skip(self, config, record), fields(site_name = %config.name), name = "site.refresh")]
    pub async fn refresh(
        &self,
        config: &SiteConfig,
        record: &ManagedRecord,
    ) -> Result<ManagedRecord, SiteError> {
        match self.read(config, record).await {
            Err(SiteError::NotFound(name)) => {
                warn!(site_name = %name, site_id = %record.id, "Site no longer exists");
                Ok(record.clone().into_absent())
            }
            other => other,
        }
    }

    /// Replace every attribute of the tracked site with the declared config.
    ///
    /// Unset address fields are sent as unset; nothing is merged from prior
    /// state.
    #[instrument(skip(self, config), fields(site_name = %config.name), name = "site.update")]
    pub async fn update(
        &self,
        config: &SiteConfig,
        tracked_id: &str,
    ) -> Result<ManagedRecord, SiteError> {
        require_name(config)?;

        let payload = Site::from_config(tracked_id, config);
        self.service.update_site(&payload).await?;
        info!("Site updated");

        let record = ManagedRecord {
            id: tracked_id.to_string(),
            ..ManagedRecord::from_config(config)
        };
        self.read(config, &record).await
    }

    /// Delete the site with the declared name.
    ///
    /// On success the returned record has an empty identity. On failure the
    /// caller's record stays as it was.
    #[instrument(skip(self, config, record), fields(site_name = %config.name, site_id = %record.id), name = "site.delete")]
    pub async fn delete(
        &self,
        config: &SiteConfig,
        record: &ManagedRecord,
    ) -> Result<ManagedRecord, SiteError> {
        self.service.delete_site(&config.name).await?;
        info!("Site deleted");
        Ok(record.clone().into_absent())
    }

    /// Attach an existing site by identity.
    ///
    /// The identifier is used verbatim as the record identity. A missing site
    /// is an import failure, never "not created yet".
    #[instrument(skip(self), name = "site.import")]
    pub async fn import(&self, external_id: &str) -> Result<Vec<ManagedRecord>, SiteError> {
        let site = self.lookup().by_id(external_id).await?;

        let mut record = ManagedRecord {
            id: external_id.to_string(),
            ..Default::default()
        };
        record.observe(site);
        info!(site_name = %record.name, "Site imported");
        Ok(vec![record])
    }

    /// Compute the changes applying `config` would make.
    ///
    /// An absent prior record plans a create. Otherwise every field is
    /// compared as a full replace: a field unset in `config` but set in the
    /// prior record is planned as removed. Sites are always updated in place.
    pub fn plan(
        &self,
        prior: Option<&ManagedRecord>,
        config: &SiteConfig,
    ) -> Result<PlanResult, SiteError> {
        let prior = prior.filter(|record| record.is_present());

        let planned = ManagedRecord {
            id: prior.map(|record| record.id.clone()).unwrap_or_default(),
            ..ManagedRecord::from_config(config)
        };
        let planned_state = serde_json::to_value(&planned)?;

        let (before_name, before_fields) = match prior {
            Some(record) => (Some(record.name.as_str()), record.address.fields()),
            None => (None, Default::default()),
        };

        let mut changes: Vec<AttributeChange> =
            AttributeChange::between("name", before_name, Some(config.name.as_str()))
                .into_iter()
                .collect();
        changes.extend(
            before_fields
                .into_iter()
                .zip(config.address.fields())
                .filter_map(|((_, before), (path, after))| {
                    AttributeChange::between(path, before, after)
                }),
        );

        Ok(PlanResult::with_changes(planned_state, changes, false))
    }
}

fn require_name(config: &SiteConfig) -> Result<(), SiteError> {
    if config.name.is_empty() {
        return Err(SiteError::Validation(
            "site name is required and must not be empty".to_string(),
        ));
    }
    Ok(())
}
