//! The read-only site data source.
//!
//! Unlike the resource read, the data source takes its identity from the
//! remote site it finds.

use std::sync::Arc;

use tracing::instrument;

use crate::error::SiteError;
use crate::lookup::SiteLookup;
use crate::model::ManagedRecord;
use crate::service::SiteService;

/// Looks up an existing site by name.
pub struct SiteDataSource<S: SiteService + ?Sized> {
    service: Arc<S>,
}

impl<S: SiteService + ?Sized> SiteDataSource<S> {
    /// Create a data source bound to the given remote service.
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Find the site named `name`.
    #[instrument(skip(self), name = "site.data_source.read")]
    pub async fn read(&self, name: &str) -> Result<ManagedRecord, SiteError> {
        let site = SiteLookup::new(&*self.service).by_name(name).await?;
        Ok(ManagedRecord {
            id: site.id,
            name: site.name,
            address: site.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SiteAddress;
    use crate::testing::InMemorySiteService;

    #[tokio::test]
    async fn test_read_assigns_remote_identity() {
        let service = Arc::new(InMemorySiteService::new());
        service
            .insert("11", "Lab", SiteAddress::default().with_city("Austin"))
            .await;

        let record = SiteDataSource::new(service).read("Lab").await.unwrap();
        assert_eq!(record.id, "11");
        assert_eq!(record.name, "Lab");
        assert_eq!(record.address.city.as_deref(), Some("Austin"));
    }

    #[tokio::test]
    async fn test_read_missing_site() {
        let service = Arc::new(InMemorySiteService::new());
        let err = SiteDataSource::new(service).read("Lab").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
