//! The `settings` blob.

use serde::{Deserialize, Serialize};

/// Persisted user settings. Currently only the active extraction provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Provider the lookup collaborator should use.
    #[serde(default)]
    pub active_provider: String,
}

impl Settings {
    /// Settings with the given provider.
    #[must_use]
    pub fn new(active_provider: impl Into<String>) -> Self {
        Self {
            active_provider: active_provider.into(),
        }
    }

    /// Parses a stored settings blob. `Ok(None)` means no provider was saved.
    ///
    /// # Errors
    /// Returns the parser error if the blob is not a settings record.
    pub fn parse(blob: &str) -> Result<Option<Self>, serde_json::Error> {
        let settings = serde_json::from_str::<Self>(blob)?;
        Ok(Some(settings).filter(|s| !s.active_provider.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_shape() {
        let json = serde_json::to_string(&Settings::new("openai")).unwrap();
        assert_eq!(json, r#"{"activeProvider":"openai"}"#);
        assert_eq!(Settings::parse(&json).unwrap(), Some(Settings::new("openai")));
    }

    #[test]
    fn empty_or_blank_blob_has_no_provider() {
        assert_eq!(Settings::parse("{}").unwrap(), None);
        assert_eq!(Settings::parse(r#"{"activeProvider":"  "}"#).unwrap(), None);
    }

    #[test]
    fn malformed_blob_is_an_error() {
        assert!(Settings::parse("not json").is_err());
        assert!(Settings::parse(r#"{"activeProvider":7}"#).is_err());
    }
}
