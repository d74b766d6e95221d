use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A model identifier of the form `provider/model-name`, e.g.
/// `anthropic/claude-3-5-sonnet`. Parsed from the free string the caller
/// supplies per spec §6; an unrecognized provider prefix is `Error::BadModel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelId {
    pub provider: String,
    pub id: String,
}

impl ModelId {
    pub fn parse(raw: &str) -> Result<Self> {
        let (provider, id) = raw
            .split_once('/')
            .ok_or_else(|| Error::BadModel(raw.to_string()))?;
        if !matches!(provider, "anthropic" | "echo" | "null") {
            return Err(Error::BadModel(raw.to_string()));
        }
        if id.is_empty() {
            return Err(Error::BadModel(raw.to_string()));
        }
        Ok(Self {
            provider: provider.to_string(),
            id: id.to_string(),
        })
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_provider() {
        let model = ModelId::parse("anthropic/claude-3-5-sonnet").unwrap();
        assert_eq!(model.provider, "anthropic");
        assert_eq!(model.id, "claude-3-5-sonnet");
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(ModelId::parse("openai/gpt-4").is_err());
        assert!(ModelId::parse("no-slash").is_err());
    }
}
