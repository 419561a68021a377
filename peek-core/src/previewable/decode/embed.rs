use crate::previewable::{object_url::ObjectUrls, DecodeError};

pub async fn object_url(
    name: &str,
    bytes: Vec<u8>,
    media_type: &str,
    urls: &dyn ObjectUrls,
) -> Result<String, DecodeError> {
    urls.create(bytes, media_type).await
        .map_err(|e| DecodeError::ObjectUrl { name: name.to_string(), source: e })
}
