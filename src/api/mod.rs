/*!
 * Client for the Bilibili international API.
 *
 * Each API response shape is described by an [`Endpoint`] implementation so a
 * single generic fetch decodes every shape through its own typed contract:
 * - `SeasonInfo`: season title
 * - `EpisodeList`: sections and episodes of a season
 * - `EpisodeSubtitles`: subtitle tracks of one episode
 * - `Timeline`: weekly release timeline
 * - `Search`: anime search results
 */

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;

pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{Episode, Section, SubtitleTrack};

/// A typed API endpoint
pub trait Endpoint {
    /// Shape of the `data` field in the response envelope
    type Data: DeserializeOwned + Send;

    /// Path relative to the gateway base URL
    const PATH: &'static str;
}

pub struct SeasonInfo;

impl Endpoint for SeasonInfo {
    type Data = models::SeasonInfoData;
    const PATH: &'static str = "/web/v2/ogv/play/season_info";
}

pub struct EpisodeList;

impl Endpoint for EpisodeList {
    type Data = models::EpisodeListData;
    const PATH: &'static str = "/web/v2/ogv/play/episodes";
}

pub struct EpisodeSubtitles;

impl Endpoint for EpisodeSubtitles {
    type Data = models::EpisodeSubtitlesData;
    const PATH: &'static str = "/m/subtitle";
}

pub struct Timeline;

impl Endpoint for Timeline {
    type Data = models::TimelineData;
    const PATH: &'static str = "/web/v2/home/timeline";
}

pub struct Search;

impl Endpoint for Search {
    type Data = models::SearchData;
    const PATH: &'static str = "/web/v2/search_v2/anime";
}

/// Source of subtitle metadata and payloads for the download engine
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory source.
#[async_trait]
pub trait SubtitleSource: Send + Sync {
    /// List the subtitle tracks available for an episode
    async fn episode_subtitles(&self, episode_id: &str) -> Result<Vec<SubtitleTrack>, ApiError>;

    /// Download the raw payload of a subtitle track
    async fn fetch_payload(&self, url: &str) -> Result<Bytes, ApiError>;
}

/// Source of season catalogs, on top of subtitle lookups
///
/// Drives the season download loop and `list`.
#[async_trait]
pub trait CatalogSource: SubtitleSource {
    /// Season title and metadata
    async fn season_info(&self, season_id: &str) -> Result<models::SeasonInfoData, ApiError>;

    /// Sections of a season with their episodes in catalog order
    async fn episode_list(&self, season_id: &str) -> Result<models::EpisodeListData, ApiError>;
}
