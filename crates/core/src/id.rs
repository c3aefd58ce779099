//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are millisecond unix timestamps: the server mints one at
//! creation time, and a client that creates an entity while offline mints
//! its own from the local clock. The two are never reconciled after a sync;
//! a full refresh replaces any stale client-side identifier.

use core::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a maintenance record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

/// Identifier of a warranty record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarrantyId(i64);

macro_rules! impl_millis_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Mint a fresh identifier from the current wall clock.
            ///
            /// Prefer `from_millis` in tests for determinism.
            pub fn generate() -> Self {
                Self(Utc::now().timestamp_millis())
            }

            pub const fn from_millis(millis: i64) -> Self {
                Self(millis)
            }

            pub const fn as_millis(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let millis = s
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(millis))
            }
        }
    };
}

impl_millis_newtype!(RecordId, "RecordId");
impl_millis_newtype!(WarrantyId, "WarrantyId");
