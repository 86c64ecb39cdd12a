use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::PVError;

/// One raw product as delivered by the backend. No schema is enforced, the
/// column model decides which fields are looked at.
pub type Record = Value;

/// A deserialized product listing payload, `{ "products": [...], ... }`.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<Record>,
    /// Listing counters of the backend. They are informational only, a
    /// malformed counter is dropped instead of failing the whole payload.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub skip: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let count = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(count)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snapshot {
    pub fn from_records(products: Vec<Record>) -> Self {
        Snapshot {
            products,
            ..Default::default()
        }
    }

    pub fn parse(payload: &str) -> Result<Self, PVError> {
        let snapshot: Snapshot = serde_json::from_str(payload)?;
        debug!(
            "Parsed snapshot with {} products (total {:?})",
            snapshot.products.len(),
            snapshot.total
        );
        Ok(snapshot)
    }

    /// Reads a snapshot from a file, or from stdin when `path` is `-`.
    pub fn load(path: &Path) -> Result<Self, PVError> {
        let payload = if path.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            let metadata = fs::metadata(path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => PVError::FileNotFound,
                ErrorKind::PermissionDenied => PVError::PermissionDenied,
                _ => PVError::IoError(e),
            })?;
            if !metadata.is_file() {
                return Err(PVError::LoadingFailed("Not a file!".into()));
            }
            fs::read_to_string(path)?
        };
        info!("Read {} bytes from {}", payload.len(), path.display());
        Snapshot::parse(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_products_field_is_an_empty_collection() {
        let snapshot = Snapshot::parse(r#"{"total": 0}"#).unwrap();
        assert!(snapshot.products.is_empty());
        assert_eq!(snapshot.total, Some(0));
    }

    #[test]
    fn null_products_field_is_an_empty_collection() {
        let snapshot = Snapshot::parse(r#"{"products": null}"#).unwrap();
        assert!(snapshot.products.is_empty());
    }

    #[test]
    fn keeps_heterogeneous_records_in_order() {
        let payload = r#"{"products": [{"id": 1, "title": "a"}, {"id": 2, "dimensions": {"width": 1}}], "total": 2, "skip": 0}"#;
        let snapshot = Snapshot::parse(payload).unwrap();
        assert_eq!(snapshot.products.len(), 2);
        assert_eq!(snapshot.products[0]["title"], "a");
        assert_eq!(snapshot.products[1]["dimensions"]["width"], 1);
    }

    #[test]
    fn malformed_counters_do_not_drop_the_products() {
        let snapshot = Snapshot::parse(r#"{"products": [{"id": 1}], "total": 1.5}"#).unwrap();
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.total, None);

        let snapshot =
            Snapshot::parse(r#"{"products": [{"id": 1}], "total": "1", "skip": [], "limit": -2}"#)
                .unwrap();
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.total, Some(1));
        assert_eq!(snapshot.skip, None);
        assert_eq!(snapshot.limit, None);
    }

    #[test]
    fn listing_counters_are_kept() {
        let snapshot =
            Snapshot::parse(r#"{"products": [], "total": 194, "skip": 30, "limit": 30}"#).unwrap();
        assert_eq!(snapshot.total, Some(194));
        assert_eq!(snapshot.skip, Some(30));
        assert_eq!(snapshot.limit, Some(30));
    }

    #[test]
    fn invalid_json_is_reported() {
        let result = Snapshot::parse("{ products: ");
        assert!(matches!(result, Err(PVError::InvalidSnapshot(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = Snapshot::load(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(PVError::FileNotFound)));
    }
}
