use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use picrate_application::{ApplicationError, TokenCodec};

/// URL-safe base64 over the path's UTF-8 bytes. Purely an opaque transport
/// identifier; authorization happens against the task's image set after
/// decoding.
#[derive(Debug, Default)]
pub struct Base64PathCodec;

impl TokenCodec for Base64PathCodec {
    fn encode(&self, path: &str) -> String {
        URL_SAFE.encode(path.as_bytes())
    }

    fn decode(&self, token: &str) -> Result<String, ApplicationError> {
        let bytes = URL_SAFE
            .decode(token.as_bytes())
            .map_err(|_| ApplicationError::InvalidInput("invalid image token".to_string()))?;
        String::from_utf8(bytes)
            .map_err(|_| ApplicationError::InvalidInput("invalid image token".to_string()))
    }
}
