use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Query granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scope {
    /// A single book and its scenes.
    Book,
    /// Every book, without scenes.
    Saga,
}
impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Book => "book",
            Scope::Saga => "saga",
        }
    }
}
impl FromStr for Scope {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "book" => Self::Book,
            "saga" => Self::Saga,
            _ => exn::bail!(ErrorKind::UnknownScope(s.to_string())),
        })
    }
}
impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
