use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifier of a booker (the brand whose bookmarks are being kept).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookerId(String);

impl_id!(BookerId);
