//! Reconciliation between the local bookmark set and the remote table.
//!
//! This module only decides; the application layer performs the writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bookmark::BookmarkSet;

/// How a disagreement between local and remote state is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Remote overwrites local. Last writer wins, no merge step.
    #[default]
    RemoteWins,
    /// Local is pushed to the remote; local is never overwritten.
    LocalWins,
    /// Both sides become the union of the two sets. Removals made on only
    /// one side are undone.
    Union,
}

impl ReconcilePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReconcilePolicy::RemoteWins => "remote_wins",
            ReconcilePolicy::LocalWins => "local_wins",
            ReconcilePolicy::Union => "union",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote_wins" => Ok(ReconcilePolicy::RemoteWins),
            "local_wins" => Ok(ReconcilePolicy::LocalWins),
            "union" => Ok(ReconcilePolicy::Union),
            other => Err(format!("unknown reconcile policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilePlan {
    /// Sorted id lists are equal.
    InSync,
    /// Replace the local set wholesale.
    OverwriteLocal { with: BookmarkSet },
    /// Bring the remote in line with local.
    UpdateRemote {
        insert: BookmarkSet,
        delete: BookmarkSet,
    },
    /// Local becomes `merged`; ids in `insert_remote` are added remotely.
    Merge {
        merged: BookmarkSet,
        insert_remote: BookmarkSet,
    },
}

impl ReconcilePlan {
    pub fn decide(policy: ReconcilePolicy, local: &BookmarkSet, remote: &BookmarkSet) -> Self {
        if local.to_sorted_vec() == remote.to_sorted_vec() {
            return ReconcilePlan::InSync;
        }

        match policy {
            ReconcilePolicy::RemoteWins => ReconcilePlan::OverwriteLocal {
                with: remote.clone(),
            },
            ReconcilePolicy::LocalWins => ReconcilePlan::UpdateRemote {
                insert: local.difference(remote),
                delete: remote.difference(local),
            },
            ReconcilePolicy::Union => ReconcilePlan::Merge {
                merged: local.union(remote),
                insert_remote: local.difference(remote),
            },
        }
    }
}
