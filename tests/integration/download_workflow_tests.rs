/*!
 * End-to-end tests for download decisions against a mock subtitle source
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use bilisubdl::app_config::DownloadOptions;
use bilisubdl::downloader::{DownloadRequest, OutcomeKind, SubtitleDownloader};
use bilisubdl::errors::AppError;
use crate::common::{self, mock_source::{track, MockSource}};

const EPISODE: &str = "368729";
const JSON_URL: &str = "https://s.bstarstatic.com/ogv/subtitle/abc.json?auth_key=1";
const ASS_URL: &str = "https://s.bstarstatic.com/ogv/subtitle/abc.ass";

fn json_source() -> MockSource {
    MockSource::new()
        .with_track(EPISODE, track(555, "th", "https://example.com/th.json", false), b"{}")
        .with_track(EPISODE, track(101, "en", JSON_URL, false), common::CUE_JSON.as_bytes())
}

fn request() -> DownloadRequest {
    DownloadRequest::new(EPISODE, Path::new("Show").join("E1.en"), common::publish_time())
}

fn archive_options(dir: &Path) -> DownloadOptions {
    DownloadOptions {
        archive_path: Some(dir.join("archive.txt")),
        ..Default::default()
    }
}

/// Test that a fresh download converts, timestamps and records the track
#[tokio::test]
async fn test_download_withArchive_shouldWriteSrtAndRecordId() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = json_source();
    let tracker = source.tracker();
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::Downloaded);
    assert_eq!(outcome.file_name, format!("{}.srt", Path::new("Show").join("E1.en").display()));

    let written = temp_dir.path().join("Show").join("E1.en.srt");
    assert_eq!(fs::read_to_string(&written)?, common::CUE_SRT);
    assert_eq!(fs::metadata(&written)?.modified()?, SystemTime::from(common::publish_time()));
    assert_eq!(fs::read_to_string(temp_dir.path().join("archive.txt"))?, "101\n");
    assert_eq!(tracker.lock().unwrap().payload_calls, 1);
    Ok(())
}

/// Test that a second run with the archive skips without fetching
#[tokio::test]
async fn test_download_twice_withArchive_shouldSkipSecondTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = json_source();
    let tracker = source.tracker();
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let first = downloader.download(&request()).await?;
    let second = downloader.download(&request()).await?;

    assert_eq!(first.kind, OutcomeKind::Downloaded);
    assert_eq!(second.kind, OutcomeKind::SkippedArchived);
    assert_eq!(fs::read_to_string(temp_dir.path().join("archive.txt"))?, "101\n");
    assert_eq!(tracker.lock().unwrap().payload_calls, 1);
    Ok(())
}

/// Test that a file on disk missing from the archive gets recorded, not rewritten
#[tokio::test]
async fn test_download_withExistingFileNotArchived_shouldReconcileArchive() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let existing = common::create_test_file(temp_dir.path(), "Show/E1.en.srt", "hand made")?;
    let source = json_source();
    let tracker = source.tracker();
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::SkippedExists { archived: true });
    assert_eq!(fs::read_to_string(&existing)?, "hand made");
    assert_eq!(fs::read_to_string(temp_dir.path().join("archive.txt"))?, "101\n");
    assert_eq!(tracker.lock().unwrap().payload_calls, 0);

    let again = downloader.download(&request()).await?;
    assert_eq!(again.kind, OutcomeKind::SkippedArchived);
    Ok(())
}

/// Test the plain existence check when no archive is configured
#[tokio::test]
async fn test_download_withoutArchive_shouldSkipExistingFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "Show/E1.en.srt", "old")?;
    let downloader = SubtitleDownloader::new(json_source(), DownloadOptions::default(), "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::SkippedExists { archived: false });
    assert!(!temp_dir.path().join("archive.txt").exists());
    Ok(())
}

/// Test that overwrite replaces files and does not duplicate archive entries
#[tokio::test]
async fn test_download_withOverwrite_shouldReplaceFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let existing = common::create_test_file(temp_dir.path(), "Show/E1.en.srt", "old")?;
    common::create_test_file(temp_dir.path(), "archive.txt", "101\n")?;
    let options = DownloadOptions { overwrite: true, ..archive_options(temp_dir.path()) };
    let downloader = SubtitleDownloader::new(json_source(), options, "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::Downloaded);
    assert_eq!(fs::read_to_string(&existing)?, common::CUE_SRT);
    assert_eq!(fs::read_to_string(temp_dir.path().join("archive.txt"))?, "101\n");
    Ok(())
}

/// Test that fast-check skips before any API call
#[tokio::test]
async fn test_download_withFastCheck_shouldSkipWithoutNetwork() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "Show/E1.en.ass", "[Script Info]")?;
    let source = json_source();
    let tracker = source.tracker();
    let options = DownloadOptions { fast_check: true, ..archive_options(temp_dir.path()) };
    let downloader = SubtitleDownloader::new(source, options, "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::SkippedFastCheck);
    assert!(outcome.file_name.ends_with("E1.en.ass"));
    assert_eq!(tracker.lock().unwrap().metadata_calls, 0);
    assert!(!temp_dir.path().join("archive.txt").exists());
    Ok(())
}

/// Test that quiet mode does not change the fast-check decision
#[tokio::test]
async fn test_download_withFastCheckAndQuiet_shouldStillSkip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "Show/E1.en.srt", "x")?;
    let options = DownloadOptions { fast_check: true, quiet: true, ..Default::default() };
    let downloader = SubtitleDownloader::new(json_source(), options, "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::SkippedFastCheck);
    Ok(())
}

/// Test the machine translation skip policy
#[tokio::test]
async fn test_download_withMachineTranslation_shouldFollowPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = MockSource::new()
        .with_track(EPISODE, track(202, "en", JSON_URL, true), common::CUE_JSON.as_bytes());
    let tracker = source.tracker();

    let skipping = SubtitleDownloader::new(
        source.clone(),
        DownloadOptions { skip_machine_translation: true, ..archive_options(temp_dir.path()) },
        "en",
        temp_dir.path(),
    );
    let skipped = skipping.download(&request()).await?;
    assert_eq!(skipped.kind, OutcomeKind::SkippedMachineTranslation);
    assert_eq!(tracker.lock().unwrap().payload_calls, 0);
    assert!(!temp_dir.path().join("archive.txt").exists());

    let accepting = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());
    let downloaded = accepting.download(&request()).await?;
    assert_eq!(downloaded.kind, OutcomeKind::Downloaded);
    Ok(())
}

/// Test that a missing language is an outcome, not an error
#[tokio::test]
async fn test_download_withUnknownLanguage_shouldReportNoTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let downloader = SubtitleDownloader::new(json_source(), archive_options(temp_dir.path()), "vi", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::NoTrack);
    assert!(!temp_dir.path().join("Show").exists());
    Ok(())
}

/// Test that native formats pass through with their own extension
#[tokio::test]
async fn test_download_withAssTrack_shouldKeepBytesAndExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let payload = b"[Script Info]\nTitle: test\n";
    let source = MockSource::new().with_track(EPISODE, track(303, "en", ASS_URL, false), payload);
    let downloader = SubtitleDownloader::new(source, DownloadOptions::default(), "en", temp_dir.path());

    let outcome = downloader.download(&request()).await?;

    assert_eq!(outcome.kind, OutcomeKind::Downloaded);
    let written = temp_dir.path().join("Show").join("E1.en.ass");
    assert_eq!(fs::read(&written)?, payload.to_vec());
    Ok(())
}

/// Test that a malformed cue payload writes nothing and records nothing
#[tokio::test]
async fn test_download_withMalformedPayload_shouldFailWithoutSideEffects() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = MockSource::new().with_track(EPISODE, track(404, "en", JSON_URL, false), b"not json");
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let result = downloader.download(&request()).await;

    assert!(matches!(result, Err(AppError::Subtitle(_))));
    assert!(!temp_dir.path().join("Show").join("E1.en.srt").exists());
    assert!(!temp_dir.path().join("archive.txt").exists());
    Ok(())
}

/// Test that metadata failures propagate as API errors
#[tokio::test]
async fn test_download_withMetadataFailure_shouldReturnApiError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = json_source().with_failing_episode(EPISODE);
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let result = downloader.download(&request()).await;

    assert!(matches!(result, Err(AppError::Api(_))));
    Ok(())
}

/// Test that a failed write leaves the archive untouched
#[tokio::test]
async fn test_download_withUnwritableTarget_shouldNotRecordId() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    fs::create_dir_all(temp_dir.path().join("Show").join("E1.en.srt"))?;
    let source = json_source();
    let tracker = source.tracker();
    let downloader = SubtitleDownloader::new(source, archive_options(temp_dir.path()), "en", temp_dir.path());

    let result = downloader.download(&request()).await;

    assert!(matches!(result, Err(AppError::File(_))));
    assert_eq!(tracker.lock().unwrap().payload_calls, 1);
    assert!(!temp_dir.path().join("archive.txt").exists());
    Ok(())
}
