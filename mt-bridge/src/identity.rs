// Location: mt-bridge/src/identity.rs
// Purpose: Stable EA identifier derived from account number and magic number
// Why: Registration, heartbeat and account status must all land on the same registry key

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Registry key for one EA instance, formatted as `"{account}_{magic_number}"`.
///
/// Integers never contain `_`, so distinct `(account, magic_number)` pairs
/// always produce distinct identifiers. The magic number is unsigned, covering
/// the full MQL5 `ulong` range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EaIdentifier(String);

impl EaIdentifier {
    pub fn new(account: i64, magic_number: u64) -> Self {
        Self(format!("{}_{}", account, magic_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EaIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EaIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}
