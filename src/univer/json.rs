//! Response body classification and JSON parsing for the portal client.

use anyhow::Result;
use serde_json::Value;

/// A classified response body.
///
/// The portal only ever serves data as `application/json`; anything else is
/// the challenge interstitial (or Cloudflare omitting the content-type header
/// entirely) and is only ever seen by the refresh-and-retry loop.
#[derive(Debug)]
pub enum Body {
    Json(Value),
    Challenge(String),
}

/// Classify a response body by its `content-type` header.
///
/// A JSON content-type with an unparseable body is an error: the upstream
/// claimed a contract and broke it, which is not a challenge signal.
pub fn classify(content_type: Option<&str>, text: &str) -> Result<Body, serde_json::Error> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .unwrap_or_default();
    if mime == "application/json" {
        Ok(Body::Json(serde_json::from_str(text)?))
    } else {
        Ok(Body::Challenge(text.to_owned()))
    }
}

/// Deserialize a JSON value into `T`, reporting the field path on failure.
///
/// The upstream's field-level integrity cannot be assumed, so mismatches are
/// common enough that "at path 'subjects[3].building'" beats a bare serde
/// message.
pub fn parse_value_with_path<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    match serde_path_to_error::deserialize(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let inner = err.into_inner();
            if path.is_empty() || path == "." {
                Err(anyhow::anyhow!(inner))
            } else {
                Err(anyhow::anyhow!("at path '{path}': {inner}"))
            }
        }
    }
}
