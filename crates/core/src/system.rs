//! System instance identifiers (sys1..sys4).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of independent systems a project can configure.
pub const MAX_SYSTEMS: u8 = 4;

/// One of the up-to-four equipment systems of a project.
///
/// Each system owns one chain of every [`ChainKind`](crate::chain::ChainKind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemNumber(u8);

impl SystemNumber {
    /// Build a system number, rejecting anything outside `1..=4`.
    pub fn new(number: u8) -> Result<Self, CoreError> {
        if (1..=MAX_SYSTEMS).contains(&number) {
            Ok(Self(number))
        } else {
            Err(CoreError::Validation(format!(
                "System number {number} out of range (1-{MAX_SYSTEMS})"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Field-name prefix without a trailing underscore, e.g. `sys1`.
    pub fn prefix(self) -> String {
        format!("sys{}", self.0)
    }

    /// All four systems in order.
    pub fn all() -> impl Iterator<Item = SystemNumber> {
        (1..=MAX_SYSTEMS).map(SystemNumber)
    }
}

impl fmt::Display for SystemNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sys{}", self.0)
    }
}

/// Accepts `sys1`, `sys1_` (the form prefix used by the equipment screens) or `1`.
impl FromStr for SystemNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('_');
        let digits = trimmed.strip_prefix("sys").unwrap_or(trimmed);
        let number: u8 = digits
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid system identifier '{s}'")))?;
        Self::new(number)
    }
}

impl TryFrom<String> for SystemNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SystemNumber> for String {
    fn from(value: SystemNumber) -> Self {
        value.to_string()
    }
}
