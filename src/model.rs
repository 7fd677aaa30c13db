//! Site data model.
//!
//! [`Site`] is the remote entity, [`SiteConfig`] is what the operator declared,
//! and [`ManagedRecord`] is the state the runtime persists between invocations.
//! Address fields are explicit options: `None` means "unset", which is
//! distinct from `Some("")`.

use serde::{Deserialize, Serialize};

/// The optional postal address carried by a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAddress {
    /// First street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address1: Option<String>,
    /// Second street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address2: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_postal_code: Option<String>,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl SiteAddress {
    /// Attribute names of the address fields, in declaration order.
    pub const FIELD_NAMES: [&'static str; 6] = [
        "street_address1",
        "street_address2",
        "city",
        "state_province",
        "zip_postal_code",
        "country",
    ];

    /// Iterate over `(attribute name, value)` pairs.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("street_address1", self.street_address1.as_deref()),
            ("street_address2", self.street_address2.as_deref()),
            ("city", self.city.as_deref()),
            ("state_province", self.state_province.as_deref()),
            ("zip_postal_code", self.zip_postal_code.as_deref()),
            ("country", self.country.as_deref()),
        ]
    }

    /// Whether no address field is set.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    /// Set the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set the first street line.
    pub fn with_street_address1(mut self, street: impl Into<String>) -> Self {
        self.street_address1 = Some(street.into());
        self
    }

    /// Set the second street line.
    pub fn with_street_address2(mut self, street: impl Into<String>) -> Self {
        self.street_address2 = Some(street.into());
        self
    }

    /// Set the state or province.
    pub fn with_state_province(mut self, state: impl Into<String>) -> Self {
        self.state_province = Some(state.into());
        self
    }

    /// Set the postal code.
    pub fn with_zip_postal_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_postal_code = Some(zip.into());
        self
    }
}

/// A site as held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Opaque identity assigned by the remote service.
    pub id: String,
    /// Unique site name.
    pub name: String,
    /// Address fields.
    #[serde(flatten)]
    pub address: SiteAddress,
}

impl Site {
    /// Build a full replacement payload for `id` from the declared config.
    pub fn from_config(id: impl Into<String>, config: &SiteConfig) -> Self {
        Self {
            id: id.into(),
            name: config.name.clone(),
            address: config.address.clone(),
        }
    }
}

/// The operator's declared configuration for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Required site name.
    #[serde(default)]
    pub name: String,
    /// Optional address fields.
    #[serde(flatten)]
    pub address: SiteAddress,
}

impl SiteConfig {
    /// Create a config with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: SiteAddress::default(),
        }
    }

    /// Replace the address fields.
    pub fn with_address(mut self, address: SiteAddress) -> Self {
        self.address = address;
        self
    }
}

/// Whether the managed site currently exists as far as local state knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Never created, deleted, or found missing on refresh.
    Absent,
    /// Created or imported and not since removed.
    Present,
}

/// Locally tracked state for one managed site.
///
/// An empty `id` means the site has not been created yet or has been deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedRecord {
    /// Remote identity, empty while absent.
    #[serde(default)]
    pub id: String,
    /// Last observed name.
    #[serde(default)]
    pub name: String,
    /// Last observed address fields.
    #[serde(flatten)]
    pub address: SiteAddress,
}

impl ManagedRecord {
    /// A fresh record for a new declaration: no identity yet.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            id: String::new(),
            name: config.name.clone(),
            address: config.address.clone(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResourceState {
        if self.id.is_empty() {
            ResourceState::Absent
        } else {
            ResourceState::Present
        }
    }

    /// Whether the record tracks an existing site.
    pub fn is_present(&self) -> bool {
        self.state() == ResourceState::Present
    }

    /// The declared configuration this record represents.
    pub fn to_config(&self) -> SiteConfig {
        SiteConfig {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }

    /// Copy name and address from the remote site, leaving identity alone.
    pub(crate) fn observe(&mut self, site: Site) {
        self.name = site.name;
        self.address = site.address;
    }

    /// The same record with identity cleared.
    pub fn into_absent(mut self) -> Self {
        self.id.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_state() {
        let record = ManagedRecord::from_config(&SiteConfig::new("HQ"));
        assert_eq!(record.state(), ResourceState::Absent);

        let record = ManagedRecord {
            id: "42".to_string(),
            ..record
        };
        assert!(record.is_present());
        assert_eq!(record.into_absent().state(), ResourceState::Absent);
    }

    #[test]
    fn test_unset_and_empty_are_distinct() {
        let unset = SiteConfig::new("HQ");
        let empty = SiteConfig::new("HQ").with_address(SiteAddress {
            city: Some(String::new()),
            ..Default::default()
        });
        assert_ne!(unset, empty);

        assert_eq!(serde_json::to_value(&unset).unwrap(), json!({"name": "HQ"}));
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!({"name": "HQ", "city": ""})
        );
    }

    #[test]
    fn test_record_json_shape() {
        let record: ManagedRecord = serde_json::from_value(json!({
            "id": "site-9",
            "name": "Warehouse",
            "city": "Oslo",
            "country": null
        }))
        .unwrap();

        assert_eq!(record.id, "site-9");
        assert_eq!(record.address.city.as_deref(), Some("Oslo"));
        assert_eq!(record.address.country, None);
    }

    #[test]
    fn test_missing_id_deserializes_as_absent() {
        let record: ManagedRecord = serde_json::from_value(json!({"name": "HQ"})).unwrap();
        assert_eq!(record.state(), ResourceState::Absent);
    }

    #[test]
    fn test_site_from_config_carries_every_field() {
        let config = SiteConfig::new("Campus A").with_address(
            SiteAddress::default()
                .with_street_address1("1 Main St")
                .with_city("Springfield")
                .with_country("US"),
        );
        let site = Site::from_config("42", &config);
        assert_eq!(site.id, "42");
        assert_eq!(site.name, "Campus A");
        assert_eq!(site.address, config.address);
        assert!(!site.address.is_empty());
        assert!(SiteAddress::default().is_empty());
    }
}
