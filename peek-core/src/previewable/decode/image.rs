use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::task;

use crate::previewable::DecodeError;

/// Returns the bytes as a `data:` URL tagged with the declared type.
pub async fn data_url(name: &str, bytes: Vec<u8>, declared_type: &str) -> Result<String, DecodeError> {
    let prefix = format!("data:{};base64,", declared_type);

    task::spawn_blocking(move || {
        let mut url = String::with_capacity(prefix.len() + bytes.len().div_ceil(3) * 4);
        url.push_str(&prefix);
        STANDARD.encode_string(&bytes, &mut url);
        url
    }).await
    .map_err(|e| DecodeError::Task { name: name.to_string(), source: e })
}
