use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::errors::SubtitleError;

// @module: Conversion of Bilibili cue-list JSON into SRT

/// Extension of files produced from cue-list JSON
pub const SRT_EXTENSION: &str = ".srt";

/// Extensions probed by fast-check
pub const KNOWN_EXTENSIONS: [&str; 2] = [".srt", ".ass"];

/// Location code rendered without an alignment override (bottom center)
const DEFAULT_LOCATION: i64 = 2;

// @struct: Single timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    // @field: Start in seconds
    pub from: f64,

    // @field: End in seconds
    pub to: f64,

    // @field: Screen location code (numpad layout)
    #[serde(default = "default_location")]
    pub location: i64,

    // @field: Caption text
    pub content: String,
}

fn default_location() -> i64 {
    DEFAULT_LOCATION
}

impl Cue {
    pub fn new(from: f64, to: f64, location: i64, content: impl Into<String>) -> Self {
        Self { from, to, location, content: content.into() }
    }

    // @returns: Content with an `{\anN}` tag when not at the default location
    fn display_text(&self) -> String {
        if self.location != DEFAULT_LOCATION {
            format!("{{\\an{}}}{}", self.location, self.content)
        } else {
            self.content.clone()
        }
    }
}

/// Decoded cue-list payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueDocument {
    #[serde(default)]
    pub body: Vec<Cue>,
}

impl CueDocument {
    /// Decode the JSON payload served for `.json` subtitle URLs
    pub fn from_json(bytes: &[u8]) -> Result<Self, SubtitleError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_srt(&self) -> String {
        cues_to_srt(&self.body)
    }
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
///
/// Seconds are truncated and the millisecond part is `floor(seconds * 1000) % 1000`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_secs = seconds.floor() as i64;
    let millis = ((seconds * 1000.0).floor() as i64) % 1000;

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render cues as numbered SRT blocks separated by blank lines
pub fn cues_to_srt(cues: &[Cue]) -> String {
    let blocks: Vec<String> = cues
        .iter()
        .enumerate()
        .map(|(i, cue)| {
            format!(
                "{}\n{} --> {}\n{}",
                i + 1,
                format_timestamp(cue.from),
                format_timestamp(cue.to),
                cue.display_text()
            )
        })
        .collect();

    blocks.join("\n\n") + "\n"
}

/// Format of a subtitle payload, resolved from its source URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// Bilibili cue-list JSON, converted to SRT
    CueJson,
    /// Any other format, written unchanged with its own extension (may be empty)
    Native(String),
}

impl SubtitleFormat {
    /// Resolve the format from the extension of the URL path, ignoring the query
    pub fn from_url(url: &str) -> Self {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split('?').next().unwrap_or_default().to_string(),
        };

        let extension = path_extension(&path);
        if extension.eq_ignore_ascii_case(".json") {
            SubtitleFormat::CueJson
        } else {
            SubtitleFormat::Native(extension)
        }
    }

    /// Extension of the file written for this format
    pub fn output_extension(&self) -> &str {
        match self {
            SubtitleFormat::CueJson => SRT_EXTENSION,
            SubtitleFormat::Native(ext) => ext,
        }
    }

    /// Convert a downloaded payload into the bytes written to disk
    pub fn convert(&self, payload: &[u8]) -> Result<Vec<u8>, SubtitleError> {
        match self {
            SubtitleFormat::CueJson => Ok(CueDocument::from_json(payload)?.to_srt().into_bytes()),
            SubtitleFormat::Native(_) => Ok(payload.to_vec()),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubtitleFormat::CueJson => write!(f, "json"),
            SubtitleFormat::Native(ext) => write!(f, "{}", ext.trim_start_matches('.')),
        }
    }
}

// @returns: Extension of the last path segment including the dot, or ""
fn path_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or_default();
    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}
