use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// @module: Response shapes of the Bilibili API

/// Common response envelope wrapping every JSON payload
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Zero on success
    pub code: i64,

    /// Error message when `code` is non-zero
    #[serde(default)]
    pub message: String,

    /// Payload, absent on some error responses
    pub data: Option<T>,
}

/// `season_info` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonInfoData {
    pub season: Season,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub title: String,
}

/// `episodes` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeListData {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// One section of a season, owning its episodes in catalog order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,

    /// Index display title, e.g. "E1-E12"
    #[serde(default)]
    pub ep_list_title: String,

    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Episode {
    /// Episode identifier; the API sends it as a number or a string
    #[serde(deserialize_with = "deserialize_id")]
    pub episode_id: String,

    #[serde(default)]
    pub title_display: String,

    #[serde(default)]
    pub short_title_display: String,

    #[serde(default)]
    pub long_title_display: String,

    /// Publish time, applied as the written file's mtime
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,
}

/// `subtitle` payload listing one track per language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeSubtitlesData {
    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub id: u64,

    /// Language key, e.g. "en" or "th"
    pub key: String,

    /// Human readable language name
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub is_machine: bool,

    pub url: String,
}

/// Timeline payload, one item per weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub items: Vec<TimelineDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDay {
    pub day_of_week: String,

    #[serde(default)]
    pub is_today: bool,

    #[serde(default)]
    pub full_date_text: String,

    #[serde(default)]
    pub cards: Vec<TimelineCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineCard {
    pub title: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub season_id: String,
    #[serde(default)]
    pub index_show: String,
}

/// Anime search payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub season_id: String,
    #[serde(default)]
    pub index_show: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

// @returns: Identifier as its decimal string form
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
