//! HTTP helpers for talking to the admin server from inside the modal.
//!
//! All chooser endpoints answer with HTML fragments or modal step JSON, so the
//! helpers here hand back the raw response text and leave parsing to callers.

use gloo_net::http::{Request, Response};
use serde::Serialize;
use thiserror::Error;
use web_sys::{AbortSignal, FormData, UrlSearchParams};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request was cancelled through its abort signal.
    #[error("request aborted")]
    Aborted,
    /// The server answered with a non-2xx status.
    #[error("{status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to encode query: {0}")]
    Query(String),
}

impl RequestError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RequestError::Aborted)
    }
}

impl From<gloo_net::Error> for RequestError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::JsError(js) if js.name == "AbortError" => RequestError::Aborted,
            other => RequestError::Network(other.to_string()),
        }
    }
}

/// Append serialized query parameters to `url`, respecting an existing query string.
///
/// # Example
/// ```rust,ignore
/// let url = with_query("/admin/streams/chooser/", &[("p", "2")])?;
/// ```
pub fn with_query<T: Serialize>(url: &str, params: &T) -> Result<String, RequestError> {
    let qs = serde_qs::to_string(params).map_err(|e| RequestError::Query(e.to_string()))?;
    if qs.is_empty() {
        return Ok(url.to_string());
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", url, separator, qs))
}

async fn into_text(response: Response) -> Result<String, RequestError> {
    if !response.ok() {
        return Err(RequestError::Status {
            status: response.status(),
            status_text: response.status_text(),
        });
    }
    Ok(response.text().await?)
}

/// GET `url` and return the body text.
pub async fn get_text(url: &str, signal: Option<&AbortSignal>) -> Result<String, RequestError> {
    let response = Request::get(url)
        .header("X-Requested-With", "XMLHttpRequest")
        .abort_signal(signal)
        .send()
        .await?;
    into_text(response).await
}

/// POST a form as `multipart/form-data` and return the body text.
pub async fn post_form(url: &str, form_data: FormData) -> Result<String, RequestError> {
    let response = Request::post(url)
        .header("X-Requested-With", "XMLHttpRequest")
        .body(form_data)?
        .send()
        .await?;
    into_text(response).await
}

/// POST a form as `application/x-www-form-urlencoded` and return the body text.
pub async fn post_urlencoded(url: &str, form_data: &FormData) -> Result<String, RequestError> {
    let params = UrlSearchParams::new_with_str_sequence_sequence(form_data)
        .map_err(|e| RequestError::Query(format!("{:?}", e)))?;
    let response = Request::post(url)
        .header("X-Requested-With", "XMLHttpRequest")
        .body(params)?
        .send()
        .await?;
    into_text(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u001_stream_chooser::request::{Ordering, SearchQuery};

    #[test]
    fn test_with_query_appends_search_params() {
        let query = SearchQuery::text("clip", "").with_ordering(Some(Ordering::Title));
        assert_eq!(
            with_query("/admin/streams/chooser/", &query).unwrap(),
            "/admin/streams/chooser/?q=clip&collection_id=&ordering=title"
        );
    }

    #[test]
    fn test_with_query_keeps_existing_query_string() {
        let query = SearchQuery::text("", "4").with_page(Some(3));
        assert_eq!(
            with_query("/chooser/?embed=1", &query).unwrap(),
            "/chooser/?embed=1&collection_id=4&p=3"
        );
    }

    #[test]
    fn test_status_error_message() {
        let err = RequestError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "500 Internal Server Error");
        assert!(!err.is_aborted());
        assert!(RequestError::Aborted.is_aborted());
    }
}
