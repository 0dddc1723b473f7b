use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Correlates the log lines and error reports of one request.
///
/// Ids are ULIDs: 26 Crockford base32 characters whose prefix is the
/// millisecond they were minted at.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub Ulid);

impl RequestId {
    /// Mint a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Reuse the id a caller sent in `x-request-id`.
    ///
    /// Surrounding whitespace is ignored. A missing, blank or non-ULID value
    /// gets a freshly minted id instead, so a client can never inject an
    /// arbitrary string into the logs.
    #[must_use]
    pub fn adopt_or_mint(sent: Option<&str>) -> Self {
        match sent.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => text.parse().unwrap_or_else(|_| Self::new()),
            None => Self::new(),
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(text)?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|e| serde::de::Error::custom(format!("request id {text:?}: {e}")))
    }
}
