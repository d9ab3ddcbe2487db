use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifier of a clipper (supply side of the marketplace).
///
/// Always a string. Numeric ids coming from upstream records are converted
/// with `From<u64>` when the record is built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipperId(String);

impl_id!(ClipperId);
