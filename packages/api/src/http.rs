//! Single-attempt JSON request helper.
//!
//! Every provider call goes through [`send_json`] so that status handling,
//! body decoding, and failure logging are uniform. Requests are sent once;
//! a failure is returned to the caller as-is.

use serde::de::DeserializeOwned;

use crate::ApiError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends `request` and decodes the response body as `T`.
///
/// # Errors
///
/// * [`ApiError::Http`] if the request could not be sent or the body could
///   not be read.
/// * [`ApiError::Status`] if the provider answered with a non-2xx status.
/// * [`ApiError::Json`] if the body is not valid JSON of shape `T`.
pub async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();

    if !status.is_success() {
        log::debug!("HTTP {status} from {url}");
        return Err(ApiError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let text = response.text().await?;
    decode(&url, &text)
}

/// Decodes a response body, logging a preview when it does not parse.
fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        log::warn!(
            "JSON parse failed\n  \
             url: {url}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {}",
            text.len(),
            preview(text),
        );
        ApiError::Json(e)
    })
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] bytes on a char boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
