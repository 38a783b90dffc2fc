//! Stream chooser modal - Model (API functions)

use crate::shared::api_utils::{self, RequestError};
use contracts::usecases::u001_stream_chooser::request::SearchQuery;
use web_sys::{AbortSignal, FormData};

/// Search results: the HTML fragment for `#stream-results`.
pub async fn fetch_results(
    search_url: &str,
    query: &SearchQuery,
    signal: Option<&AbortSignal>,
) -> Result<String, RequestError> {
    let url = api_utils::with_query(search_url, query)?;
    log::debug!("stream search: {}", url);
    api_utils::get_text(&url, signal).await
}

/// Upload a new stream; the response is the next modal step.
pub async fn upload_stream(action: &str, form_data: FormData) -> Result<String, RequestError> {
    api_utils::post_form(action, form_data).await
}

/// Submit the format form; the response is the next modal step.
pub async fn submit_format(action: &str, form_data: &FormData) -> Result<String, RequestError> {
    api_utils::post_urlencoded(action, form_data).await
}
