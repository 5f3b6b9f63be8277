use crate::algorithm::AlgorithmId;
use crate::error::{Error, Result};

use miniserde::json::{self, Object, Value};
use miniserde::Deserialize;

/// Token type written into every header
pub(crate) const TOKEN_TYPE: &str = "JWT";

/// JWT header structure
///
/// Unknown header members are ignored on decode.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    /// Algorithm used for signing
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Token type (typically "JWT")
    #[serde(rename = "typ")]
    pub token_type: Option<String>,
}

impl TokenHeader {
    /// Header for a token signed with `algorithm`
    pub fn new(algorithm: AlgorithmId) -> Self {
        Self {
            algorithm: algorithm.as_str().to_string(),
            token_type: Some(TOKEN_TYPE.to_string()),
        }
    }

    /// Parse algorithm from header
    pub fn parse_algorithm(&self) -> Result<AlgorithmId> {
        self.algorithm.parse()
    }

    /// Get algorithm as string
    pub fn algorithm_str(&self) -> &str {
        &self.algorithm
    }

    /// Parse decoded header bytes
    pub(crate) fn from_json(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::FormatInvalidJson("Header is not valid UTF-8".to_string()))?;
        json::from_str(text)
            .map_err(|e| Error::FormatInvalidJson(format!("Failed to parse header: {e}")))
    }

    /// Serialize as `{"alg":..,"typ":..}`
    pub(crate) fn to_json(&self) -> String {
        let mut object = Object::new();
        object.insert("alg".to_string(), Value::String(self.algorithm.clone()));
        if let Some(typ) = &self.token_type {
            object.insert("typ".to_string(), Value::String(typ.clone()));
        }
        json::to_string(&object)
    }
}
