//! DNS zone record model
//!
//! A record is identified by its (zone, sub-domain, target) triple. The
//! provider-assigned identifier is attached once known; a record without
//! one is "expected but not currently visible on the provider".
//!
//! The serialized form is shared by the record stores and the OVH API:
//!
//! ```json
//! {
//!   "zone": "example.com",
//!   "subDomain": "www",
//!   "target": "1.2.3.4",
//!   "id": 5138273,
//!   "ttl": 3600,
//!   "fieldType": "A"
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Record type managed by ons
pub const FIELD_TYPE_A: &str = "A";

/// Provider-assigned opaque record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (zone, sub-domain, target) triple used for diffing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub zone: String,
    pub sub_domain: String,
    pub target: String,
}

/// A DNS zone record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub zone: String,

    pub sub_domain: String,

    pub target: String,

    /// `None` is the "identifier unknown" sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    /// The provider reports 0 for "zone default", kept as `None`
    #[serde(
        default,
        deserialize_with = "zero_ttl_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

fn zero_ttl_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.filter(|ttl| *ttl != 0))
}

impl Record {
    /// Create a record without a provider identifier
    pub fn new(
        zone: impl Into<String>,
        sub_domain: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            sub_domain: sub_domain.into(),
            target: target.into(),
            id: None,
            ttl: None,
            field_type: None,
        }
    }

    /// Attach a provider identifier
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// The same record with its identifier reset to the unknown sentinel
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            zone: self.zone.clone(),
            sub_domain: self.sub_domain.clone(),
            target: self.target.clone(),
        }
    }

    /// Full triple match
    pub fn same_triple(&self, other: &Record) -> bool {
        self.zone == other.zone
            && self.sub_domain == other.sub_domain
            && self.target == other.target
    }

    /// Coarse (zone, sub-domain) match, used for membership checks only
    pub fn same_sub_domain(&self, zone: &str, sub_domain: &str) -> bool {
        self.zone == zone && self.sub_domain == sub_domain
    }

    pub fn has_live_id(&self) -> bool {
        self.id.is_some()
    }

    /// Fully-qualified name, e.g. `www.example.com`
    pub fn fqdn(&self) -> String {
        if self.sub_domain.is_empty() {
            self.zone.clone()
        } else {
            format!("{}.{}", self.sub_domain, self.zone)
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.fqdn(), self.target)?;
        if let Some(id) = self.id {
            write!(f, " (id {})", id)?;
        }
        Ok(())
    }
}

/// A live record annotated with whether the desired set declares it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedRecord {
    #[serde(flatten)]
    pub record: Record,

    #[serde(skip)]
    pub managed: bool,
}
