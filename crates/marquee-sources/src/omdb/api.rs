use marquee_models::{MovieDetails, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::traits::SearchPage;

// OMDb API base URL
const API_BASE: &str = "https://www.omdbapi.com/";
const SERVICE: &str = "OMDb";

// Upstream `Error` strings that get special-cased handling. OMDb reports
// "Incorrect IMDb ID." for empty/degenerate terms and "Too many results."
// when the term matches more than it will page back.
const ERR_INCORRECT_IMDB_ID: &str = "Incorrect IMDb ID.";
const ERR_TOO_MANY_RESULTS: &str = "Too many results.";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search")]
    search: Option<Vec<SearchHit>>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Released")]
    released: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

pub async fn search(client: &Client, api_key: &str, query: &str) -> Result<SearchPage, SourceError> {
    debug!(%query, "OMDb search");
    let body = client
        .get(API_BASE)
        .query(&[("apikey", api_key), ("s", query)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_search_body(&body)
}

pub async fn details(
    client: &Client,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetails, SourceError> {
    debug!(%imdb_id, "OMDb detail lookup");
    let body = client
        .get(API_BASE)
        .query(&[("apikey", api_key), ("i", imdb_id)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_detail_body(&body, imdb_id)
}

/// Validate and convert a search response body.
///
/// "Too many results." alongside a usable list is the truncated-success case;
/// without a list it is a hard logical failure asking the user to keep typing.
fn parse_search_body(body: &str) -> Result<SearchPage, SourceError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| SourceError::Shape {
        service: SERVICE,
        detail: e.to_string(),
    })?;

    match response.error.as_deref() {
        Some(ERR_INCORRECT_IMDB_ID) => return Err(SourceError::NoMatch),
        Some(ERR_TOO_MANY_RESULTS) => {
            return match response.search {
                Some(hits) if !hits.is_empty() => Ok(SearchPage {
                    movies: convert_hits(hits),
                    truncated: true,
                }),
                _ => Err(SourceError::TooManyResults),
            };
        }
        _ => {}
    }

    if response.response.as_deref() == Some("False") {
        let reason = response
            .error
            .unwrap_or_else(|| "Movie not found!".to_string());
        return Err(SourceError::Upstream(reason));
    }

    let hits = response.search.ok_or_else(|| SourceError::Shape {
        service: SERVICE,
        detail: "success response without a Search list".to_string(),
    })?;

    Ok(SearchPage {
        movies: convert_hits(hits),
        truncated: false,
    })
}

fn parse_detail_body(body: &str, requested_id: &str) -> Result<MovieDetails, SourceError> {
    let response: DetailResponse = serde_json::from_str(body).map_err(|e| SourceError::Shape {
        service: SERVICE,
        detail: e.to_string(),
    })?;

    if response.response.as_deref() == Some("False") {
        let reason = response
            .error
            .unwrap_or_else(|| "Movie not found!".to_string());
        return Err(SourceError::Upstream(reason));
    }

    let title = normalize(response.title).ok_or_else(|| SourceError::Shape {
        service: SERVICE,
        detail: "detail response without a Title".to_string(),
    })?;

    Ok(MovieDetails {
        imdb_id: normalize(response.imdb_id).unwrap_or_else(|| requested_id.to_string()),
        title,
        poster_url: normalize(response.poster),
        language: normalize(response.language),
        genre: normalize(response.genre),
        actors: normalize(response.actors),
        released: normalize(response.released),
        imdb_rating: normalize(response.imdb_rating),
        director: normalize(response.director),
        runtime: normalize(response.runtime),
        plot: normalize(response.plot),
    })
}

fn convert_hits(hits: Vec<SearchHit>) -> Vec<MovieSummary> {
    hits.into_iter()
        .filter_map(|hit| {
            let (Some(imdb_id), Some(title)) = (hit.imdb_id, hit.title) else {
                // A hit without an id or title cannot be selected; skip it
                // instead of failing the whole page.
                warn!("skipping OMDb search hit without imdbID/Title");
                return None;
            };
            Some(MovieSummary {
                imdb_id,
                title,
                poster_url: normalize(hit.poster),
            })
        })
        .collect()
}

/// OMDb reports absent data as the literal string "N/A".
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_match() {
        let body = r#"{
            "Search": [
                {"Title": "Inception", "Poster": "https://m.media-amazon.com/poster.jpg", "imdbID": "tt1375666", "Year": "2010", "Type": "movie"}
            ],
            "totalResults": "1",
            "Response": "True"
        }"#;

        let page = parse_search_body(body).unwrap();
        assert!(!page.truncated);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].imdb_id, "tt1375666");
        assert_eq!(page.movies[0].title, "Inception");
        assert_eq!(
            page.movies[0].poster_url.as_deref(),
            Some("https://m.media-amazon.com/poster.jpg")
        );
    }

    #[test]
    fn incorrect_imdb_id_maps_to_no_match() {
        let body = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        assert!(matches!(parse_search_body(body), Err(SourceError::NoMatch)));
    }

    #[test]
    fn too_many_results_without_list_is_a_hard_failure() {
        let body = r#"{"Response": "False", "Error": "Too many results."}"#;
        assert!(matches!(
            parse_search_body(body),
            Err(SourceError::TooManyResults)
        ));
    }

    #[test]
    fn too_many_results_with_list_is_truncated_success() {
        let body = r#"{
            "Search": [{"Title": "Up", "Poster": "N/A", "imdbID": "tt1049413"}],
            "Response": "True",
            "Error": "Too many results."
        }"#;

        let page = parse_search_body(body).unwrap();
        assert!(page.truncated);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].poster_url, None);
    }

    #[test]
    fn other_upstream_reason_passes_through() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        match parse_search_body(body) {
            Err(SourceError::Upstream(reason)) => assert_eq!(reason, "Movie not found!"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_shape_error() {
        assert!(matches!(
            parse_search_body("<html>not json</html>"),
            Err(SourceError::Shape { .. })
        ));
    }

    #[test]
    fn hit_without_id_is_skipped() {
        let body = r#"{
            "Search": [
                {"Title": "No Id Here", "Poster": "N/A"},
                {"Title": "Inception", "Poster": "N/A", "imdbID": "tt1375666"}
            ],
            "Response": "True"
        }"#;

        let page = parse_search_body(body).unwrap();
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].imdb_id, "tt1375666");
    }

    #[test]
    fn parses_detail_record() {
        let body = r#"{
            "Title": "Inception",
            "Language": "English, Japanese, French",
            "Genre": "Action, Adventure, Sci-Fi",
            "Poster": "https://m.media-amazon.com/poster.jpg",
            "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page",
            "Released": "16 Jul 2010",
            "imdbRating": "8.8",
            "Director": "Christopher Nolan",
            "Runtime": "148 min",
            "Plot": "A thief who steals corporate secrets.",
            "imdbID": "tt1375666",
            "Response": "True"
        }"#;

        let details = parse_detail_body(body, "tt1375666").unwrap();
        assert_eq!(details.title, "Inception");
        assert_eq!(details.runtime.as_deref(), Some("148 min"));
        assert_eq!(details.director.as_deref(), Some("Christopher Nolan"));
        assert_eq!(details.imdb_id, "tt1375666");
    }

    #[test]
    fn detail_normalizes_na_fields() {
        let body = r#"{
            "Title": "Obscure Short",
            "Poster": "N/A",
            "Runtime": "N/A",
            "Director": "N/A",
            "imdbID": "tt0000001",
            "Response": "True"
        }"#;

        let details = parse_detail_body(body, "tt0000001").unwrap();
        assert_eq!(details.poster_url, None);
        assert_eq!(details.runtime, None);
        assert_eq!(details.director, None);
    }

    #[test]
    fn detail_failure_maps_to_upstream() {
        let body = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        assert!(matches!(
            parse_detail_body(body, "bogus"),
            Err(SourceError::Upstream(_))
        ));
    }

    #[test]
    fn detail_without_title_is_a_shape_error() {
        let body = r#"{"Response": "True", "imdbID": "tt1375666"}"#;
        assert!(matches!(
            parse_detail_body(body, "tt1375666"),
            Err(SourceError::Shape { .. })
        ));
    }
}
