//! Represents a storage change notification (object-created event).

use serde::Deserialize;

/// One storage-change trigger, carrying the objects that were created.
///
/// Accepts the storage service's wire shape (`Records[].s3.bucket.name`) as
/// well as the PascalCase variant (`Records[].S3.Bucket.Name`).
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ChangeEvent {
    /// Ordered records. `null` and a missing field both mean "no records".
    #[serde(rename = "Records", alias = "records", default)]
    records: Option<Vec<ChangeRecord>>,
}

impl ChangeEvent {
    /// Build an event from explicit `(bucket, key)` pairs, in order.
    #[cfg(test)]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let records = pairs
            .into_iter()
            .map(|(bucket, key)| ChangeRecord {
                s3: StorageEntity {
                    bucket: BucketRef {
                        name: bucket.to_string(),
                    },
                    object: ObjectRef {
                        key: key.to_string(),
                    },
                },
            })
            .collect();
        Self {
            records: Some(records),
        }
    }

    /// Records in the order the trigger delivered them.
    pub fn records(&self) -> &[ChangeRecord] {
        self.records.as_deref().unwrap_or(&[])
    }
}

/// A single created object.
#[derive(Deserialize, Clone, Debug)]
pub struct ChangeRecord {
    #[serde(alias = "S3")]
    pub s3: StorageEntity,
}

impl ChangeRecord {
    pub fn bucket_name(&self) -> &str {
        &self.s3.bucket.name
    }

    pub fn object_key(&self) -> &str {
        &self.s3.object.key
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageEntity {
    #[serde(alias = "Bucket")]
    pub bucket: BucketRef,

    #[serde(alias = "Object")]
    pub object: ObjectRef,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BucketRef {
    #[serde(alias = "Name")]
    pub name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObjectRef {
    #[serde(alias = "Key")]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_storage_wire_shape() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "intake", "arn": "arn:aws:s3:::intake" },
                        "object": { "key": "incoming/a.json", "size": 12 }
                    }
                },
                { "s3": { "bucket": { "name": "intake" }, "object": { "key": "incoming/b.json" } } }
            ]
        }))
        .unwrap();

        let keys: Vec<_> = event.records().iter().map(|r| r.object_key()).collect();
        assert_eq!(keys, ["incoming/a.json", "incoming/b.json"]);
        assert_eq!(event.records()[0].bucket_name(), "intake");
    }

    #[test]
    fn parses_pascal_case_shape() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "Records": [ { "S3": { "Bucket": { "Name": "b" }, "Object": { "Key": "k1" } } } ]
        }))
        .unwrap();

        assert_eq!(event.records().len(), 1);
        assert_eq!(event.records()[0].bucket_name(), "b");
        assert_eq!(event.records()[0].object_key(), "k1");
    }

    #[test]
    fn missing_or_null_records_are_empty() {
        let missing: ChangeEvent = serde_json::from_value(json!({})).unwrap();
        let null: ChangeEvent = serde_json::from_value(json!({ "Records": null })).unwrap();
        let empty: ChangeEvent = serde_json::from_value(json!({ "Records": [] })).unwrap();

        assert!(missing.records().is_empty());
        assert!(null.records().is_empty());
        assert!(empty.records().is_empty());
    }
}
