//! Dataset retrieval.

use log::info;

use crate::config::FETCH_TIMEOUT;
use crate::error_handling::UpdateError;

/// Downloads the dataset from `url` and returns its body as text.
///
/// The request carries a 300 second overall timeout. A non-success HTTP
/// status fails the fetch; no parsing happens here.
pub async fn fetch_dataset(url: &str) -> Result<String, UpdateError> {
    info!("Downloading dataset from {}", url);

    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;

    info!("Downloaded dataset ({} bytes)", body.len());
    Ok(body)
}
