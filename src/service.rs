//! The remote site service the lifecycle operations talk to.
//!
//! Transport and authentication live behind this trait. The lifecycle code
//! receives an implementation explicitly and never looks one up at runtime.

use crate::error::ServiceError;
use crate::model::{Site, SiteAddress};

/// The five remote operations a site provider needs.
///
/// Each call is one round trip. Implementations own their own timeouts and
/// retries; callers issue them one at a time and never cancel them.
#[async_trait::async_trait]
pub trait SiteService: Send + Sync + 'static {
    /// Create a site. The service assigns the identity.
    async fn create_site(&self, name: &str, address: &SiteAddress) -> Result<Site, ServiceError>;

    /// Find a site by its unique name.
    ///
    /// Returns [`ServiceError::NotFound`] when no site has that name.
    async fn get_site_by_name(&self, name: &str) -> Result<Site, ServiceError>;

    /// Find a site by identity.
    ///
    /// Returns [`ServiceError::NotFound`] when no site has that identity.
    async fn get_site(&self, id: &str) -> Result<Site, ServiceError>;

    /// Replace every attribute of the site identified by `site.id`.
    async fn update_site(&self, site: &Site) -> Result<Site, ServiceError>;

    /// Delete the site with the given name.
    async fn delete_site(&self, name: &str) -> Result<(), ServiceError>;
}

