//! Resolving sites by name or by identity.
//!
//! The two lookup paths fail differently: a missing name means the managed
//! site is gone, a missing identity means an import cannot attach.

use tracing::debug;

use crate::error::{ServiceError, SiteError};
use crate::model::Site;
use crate::service::SiteService;

/// Single-round-trip lookups against a [`SiteService`].
pub struct SiteLookup<'a, S: SiteService + ?Sized> {
    service: &'a S,
}

impl<'a, S: SiteService + ?Sized> SiteLookup<'a, S> {
    /// Create a lookup over the given service.
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Resolve a site by name.
    ///
    /// A missing site is reported as [`SiteError::NotFound`].
    pub async fn by_name(&self, name: &str) -> Result<Site, SiteError> {
        debug!(site_name = name, "Resolving site by name");
        match self.service.get_site_by_name(name).await {
            Ok(site) => Ok(site),
            Err(ServiceError::NotFound(_)) => Err(SiteError::NotFound(name.to_string())),
            Err(e) => Err(SiteError::Remote(e)),
        }
    }

    /// Resolve a site by identity.
    ///
    /// A missing site is reported as [`SiteError::ImportNotFound`].
    pub async fn by_id(&self, id: &str) -> Result<Site, SiteError> {
        debug!(site_id = id, "Resolving site by id");
        match self.service.get_site(id).await {
            Ok(site) => Ok(site),
            Err(ServiceError::NotFound(_)) => Err(SiteError::ImportNotFound(id.to_string())),
            Err(e) => Err(SiteError::Remote(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SiteAddress;
    use crate::testing::{InMemorySiteService, ServiceOp};

    #[tokio::test]
    async fn test_by_name_resolves_existing_site() {
        let service = InMemorySiteService::new();
        service.insert("7", "HQ", SiteAddress::default()).await;

        let site = SiteLookup::new(&service).by_name("HQ").await.unwrap();
        assert_eq!(site.id, "7");
        assert_eq!(service.calls().await, vec![ServiceOp::GetSiteByName]);
    }

    #[tokio::test]
    async fn test_missing_name_is_not_found() {
        let service = InMemorySiteService::new();
        let err = SiteLookup::new(&service).by_name("HQ").await.unwrap_err();
        assert!(matches!(err, SiteError::NotFound(ref name) if name == "HQ"));
    }

    #[tokio::test]
    async fn test_missing_id_is_import_failure() {
        let service = InMemorySiteService::new();
        let err = SiteLookup::new(&service).by_id("site-1").await.unwrap_err();
        assert!(matches!(err, SiteError::ImportNotFound(ref id) if id == "site-1"));
        assert_eq!(service.calls().await, vec![ServiceOp::GetSite]);
    }

    #[tokio::test]
    async fn test_service_failure_passes_through() {
        let service = InMemorySiteService::new();
        service.insert("7", "HQ", SiteAddress::default()).await;
        service.fail_next(ServiceOp::GetSiteByName).await;

        let err = SiteLookup::new(&service).by_name("HQ").await.unwrap_err();
        assert!(matches!(err, SiteError::Remote(ServiceError::Failed(_))));
    }
}
