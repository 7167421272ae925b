use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;

// YouTube Data API v3 search endpoint
const API_BASE: &str = "https://www.googleapis.com/youtube/v3/search";
const SERVICE: &str = "YouTube";

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<ItemId>,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// Look up `"<title> trailer"`, one video result. Returns the embed URL of
/// the first hit, or `None` when nothing usable comes back.
pub async fn find_trailer(
    client: &Client,
    api_key: &str,
    title: &str,
) -> Result<Option<String>, SourceError> {
    let query = format!("{title} trailer");
    debug!(%query, "YouTube trailer search");
    let body = client
        .get(API_BASE)
        .query(&[
            ("part", "snippet"),
            ("q", query.as_str()),
            ("type", "video"),
            ("maxResults", "1"),
            ("key", api_key),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_search_body(&body)
}

pub fn embed_url(video_id: &str) -> String {
    format!("{EMBED_BASE}{video_id}")
}

fn parse_search_body(body: &str) -> Result<Option<String>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| SourceError::Shape {
        service: SERVICE,
        detail: e.to_string(),
    })?;

    let video_id = response
        .items
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|item| item.id)
        .and_then(|id| id.video_id);

    Ok(video_id.map(|id| embed_url(&id)))
}
