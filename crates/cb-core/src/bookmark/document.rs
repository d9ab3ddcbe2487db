//! Persisted form of the [`BookmarkSet`].
//!
//! The stored value is a versioned object so that future format changes can
//! migrate old data instead of discarding it:
//!
//! ```json
//! { "schema_version": 1, "ids": ["c1", "c2"] }
//! ```
//!
//! A bare JSON array of strings is the legacy schema-less layout. It is read
//! as version 0 and migrated forward.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::BookmarkSet;
use crate::ids::ClipperId;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const LEGACY_SCHEMA_VERSION: u32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("malformed bookmark document: {0}")]
    Malformed(String),

    #[error("unsupported bookmark schema version {found} (current is {current})")]
    UnsupportedVersion { found: u32, current: u32 },

    #[error("no bookmark migration registered from version {0}")]
    NoMigration(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDocument {
    pub schema_version: u32,
    pub ids: BookmarkSet,
}

impl BookmarkDocument {
    pub fn new(ids: BookmarkSet) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            ids,
        }
    }

    pub fn empty() -> Self {
        Self::new(BookmarkSet::new())
    }

    pub fn encode(&self) -> String {
        // A struct of a u32 and a set of strings always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"schema_version":{},"ids":[]}}"#, self.schema_version)
        })
    }

    /// Parse a raw stored value and bring it to the current schema.
    pub fn decode(raw: &str) -> Result<DecodedDocument, DocumentError> {
        Self::decode_with(raw, &BookmarkMigrator::new())
    }

    pub fn decode_with(
        raw: &str,
        migrator: &BookmarkMigrator,
    ) -> Result<DecodedDocument, DocumentError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| DocumentError::Malformed(format!("not json: {e}")))?;

        let document = match value {
            Value::Array(items) => BookmarkDocument {
                schema_version: LEGACY_SCHEMA_VERSION,
                ids: parse_ids(items)?,
            },
            Value::Object(mut map) => {
                let version = map
                    .get("schema_version")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| DocumentError::Malformed("missing schema_version".into()))?;
                let version = u32::try_from(version)
                    .map_err(|_| DocumentError::Malformed("schema_version out of range".into()))?;
                let ids = match map.remove("ids") {
                    Some(Value::Array(items)) => parse_ids(items)?,
                    _ => return Err(DocumentError::Malformed("ids is not an array".into())),
                };
                BookmarkDocument {
                    schema_version: version,
                    ids,
                }
            }
            other => {
                return Err(DocumentError::Malformed(format!(
                    "unexpected json type: {}",
                    json_type_name(&other)
                )))
            }
        };

        let original_version = document.schema_version;
        let document = migrator.migrate_to_latest(document)?;

        Ok(DecodedDocument {
            migrated: original_version != document.schema_version,
            document,
        })
    }
}

impl Default for BookmarkDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of decoding: the current-version document and whether a migration
/// ran (in which case the caller should write it back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub document: BookmarkDocument,
    pub migrated: bool,
}

fn parse_ids(items: Vec<Value>) -> Result<BookmarkSet, DocumentError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(ClipperId::from(s)),
            other => Err(DocumentError::Malformed(format!(
                "id is {}, expected string",
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One step in the schema migration chain.
pub trait BookmarkMigration: Send + Sync {
    fn from_version(&self) -> u32;
    fn to_version(&self) -> u32;
    fn migrate(&self, document: BookmarkDocument) -> BookmarkDocument;
}

/// The schema-less bare array becomes a versioned document. The id list is
/// carried over unchanged.
struct MigrationV0ToV1;

impl BookmarkMigration for MigrationV0ToV1 {
    fn from_version(&self) -> u32 {
        LEGACY_SCHEMA_VERSION
    }

    fn to_version(&self) -> u32 {
        1
    }

    fn migrate(&self, document: BookmarkDocument) -> BookmarkDocument {
        BookmarkDocument {
            schema_version: self.to_version(),
            ids: document.ids,
        }
    }
}

pub struct BookmarkMigrator {
    migrations: Vec<Box<dyn BookmarkMigration>>,
}

impl BookmarkMigrator {
    pub fn new() -> Self {
        Self {
            migrations: vec![Box::new(MigrationV0ToV1)],
        }
    }

    pub fn with_migrations(migrations: Vec<Box<dyn BookmarkMigration>>) -> Self {
        Self { migrations }
    }

    pub fn migrate_to_latest(
        &self,
        mut document: BookmarkDocument,
    ) -> Result<BookmarkDocument, DocumentError> {
        if document.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.schema_version,
                current: CURRENT_SCHEMA_VERSION,
            });
        }

        while document.schema_version < CURRENT_SCHEMA_VERSION {
            let current = document.schema_version;
            let migration = self
                .migrations
                .iter()
                .find(|m| m.from_version() == current)
                .ok_or(DocumentError::NoMigration(current))?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = migration.from_version(),
                to = migration.to_version(),
                "migrating bookmark document"
            );

            document = migration.migrate(document);
            if document.schema_version <= current {
                // A step that does not advance would loop forever.
                return Err(DocumentError::NoMigration(current));
            }
        }

        Ok(document)
    }
}

impl Default for BookmarkMigrator {
    fn default() -> Self {
        Self::new()
    }
}
