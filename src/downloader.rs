/*!
 * Per-track download decisions.
 *
 * For every requested episode the engine decides whether the subtitle for the
 * configured language is skipped (fast-check hit, already archived, already on
 * disk, machine translated) or fetched, converted and written. Successful
 * writes and reconciled on-disk files are recorded in the download archive.
 */

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fmt;
use std::path::PathBuf;

use crate::api::SubtitleSource;
use crate::app_config::DownloadOptions;
use crate::archive::DownloadArchive;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleFormat, KNOWN_EXTENSIONS};

/// One episode to fetch a subtitle for
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub episode_id: String,
    /// Output path relative to the output directory, without extension
    pub name: PathBuf,
    /// Applied as the written file's access and modification time
    pub publish_time: DateTime<Utc>,
}

impl DownloadRequest {
    pub fn new(episode_id: impl Into<String>, name: impl Into<PathBuf>, publish_time: DateTime<Utc>) -> Self {
        Self {
            episode_id: episode_id.into(),
            name: name.into(),
            publish_time,
        }
    }
}

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Payload fetched and written
    Downloaded,
    /// A `.srt`/`.ass` file was found before asking the API
    SkippedFastCheck,
    /// Track ID already present in the archive
    SkippedArchived,
    /// Target file already on disk; `archived` when its ID was just recorded
    SkippedExists { archived: bool },
    /// Track is machine translated and the skip policy is on
    SkippedMachineTranslation,
    /// Episode has no track for the requested language
    NoTrack,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            OutcomeKind::Downloaded => "downloaded",
            OutcomeKind::SkippedFastCheck => "fast-check",
            OutcomeKind::SkippedArchived => "archive",
            OutcomeKind::SkippedExists { archived: true } => "exist, add to archive",
            OutcomeKind::SkippedExists { archived: false } => "exist",
            OutcomeKind::SkippedMachineTranslation => "machine translation",
            OutcomeKind::NoTrack => "no subtitle",
        };
        write!(f, "{}", label)
    }
}

/// Result of one download decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub kind: OutcomeKind,
    /// Display name, relative to the output directory
    pub file_name: String,
}

impl DownloadOutcome {
    fn new(kind: OutcomeKind, file_name: String) -> Self {
        Self { kind, file_name }
    }
}

/// Download decision engine for one language and output directory
pub struct SubtitleDownloader<S: SubtitleSource> {
    source: S,
    options: DownloadOptions,
    archive: Option<DownloadArchive>,
    language: String,
    output_dir: PathBuf,
}

impl<S: SubtitleSource> SubtitleDownloader<S> {
    pub fn new(source: S, options: DownloadOptions, language: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        let archive = options.archive_path.clone().map(DownloadArchive::new);
        Self {
            source,
            options,
            archive,
            language: language.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Decide and, if needed, perform the download for one episode
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome, AppError> {
        let target = self.output_dir.join(&request.name);
        let display_name = |ext: &str| format!("{}{}", request.name.display(), ext);

        if self.options.fast_check && !self.options.overwrite {
            for ext in KNOWN_EXTENSIONS {
                if FileManager::file_exists(FileManager::with_extension_appended(&target, ext)) {
                    return Ok(DownloadOutcome::new(OutcomeKind::SkippedFastCheck, display_name(ext)));
                }
            }
        }

        let tracks = self.source.episode_subtitles(&request.episode_id).await?;
        let Some(track) = tracks.iter().find(|t| t.key == self.language) else {
            debug!(
                "Episode {} has no '{}' subtitle (available: {})",
                request.episode_id,
                self.language,
                tracks.iter().map(|t| t.key.as_str()).collect::<Vec<_>>().join(", ")
            );
            return Ok(DownloadOutcome::new(OutcomeKind::NoTrack, display_name("")));
        };

        if track.is_machine {
            if self.options.skip_machine_translation {
                return Ok(DownloadOutcome::new(OutcomeKind::SkippedMachineTranslation, display_name("")));
            }
            warn!("The downloaded subtitle has been machine translated and may contain errors or inaccuracies");
        }

        let format = SubtitleFormat::from_url(&track.url);
        let ext = format.output_extension();
        let path = FileManager::with_extension_appended(&target, ext);
        let track_id = track.id.to_string();

        if !self.options.overwrite {
            match &self.archive {
                Some(archive) => {
                    if archive.contains(&track_id).map_err(file_error)? {
                        return Ok(DownloadOutcome::new(OutcomeKind::SkippedArchived, display_name(ext)));
                    }
                    if FileManager::file_exists(&path) {
                        archive.add(&track_id).map_err(file_error)?;
                        return Ok(DownloadOutcome::new(OutcomeKind::SkippedExists { archived: true }, display_name(ext)));
                    }
                }
                None => {
                    if FileManager::file_exists(&path) {
                        return Ok(DownloadOutcome::new(OutcomeKind::SkippedExists { archived: false }, display_name(ext)));
                    }
                }
            }
        }

        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent).map_err(file_error)?;
        }

        debug!("Fetching track {} ({}) for episode {}", track_id, format, request.episode_id);
        let payload = self.source.fetch_payload(&track.url).await?;
        let content = format.convert(&payload)?;

        FileManager::write_with_mtime(&path, &content, request.publish_time).map_err(file_error)?;

        if let Some(archive) = &self.archive {
            archive.record(&track_id).map_err(file_error)?;
        }

        Ok(DownloadOutcome::new(OutcomeKind::Downloaded, display_name(ext)))
    }
}

fn file_error(error: anyhow::Error) -> AppError {
    AppError::File(format!("{:#}", error))
}
