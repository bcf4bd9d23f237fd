/*!
 * Tests for the multi-ID download loops of the controller
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use bilisubdl::app_config::DownloadOptions;
use bilisubdl::app_controller::{Controller, DownloadJob};
use bilisubdl::range_select::RangeFilter;
use crate::common::{self, mock_source::{section, track, MockSource}};

fn job(output_dir: &Path) -> DownloadJob {
    DownloadJob {
        language: "en".to_string(),
        output_dir: output_dir.to_path_buf(),
        options: DownloadOptions { quiet: true, ..Default::default() },
        section_filter: RangeFilter::all(),
        episode_filter: RangeFilter::all(),
    }
}

fn catalog_source() -> MockSource {
    MockSource::new()
        .with_season("37738", "My Show", vec![section("Main", &[("1", "E1"), ("2", "E2")])])
        .with_track("1", track(11, "en", "https://example.com/1.json", false), common::CUE_JSON.as_bytes())
        .with_track("2", track(12, "en", "https://example.com/2.json", false), common::CUE_JSON.as_bytes())
}

/// Test that a failing season does not stop the next one
#[tokio::test]
async fn test_download_seasons_withOneFailingId_shouldContinueAndFail() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_source(catalog_source());
    let ids = vec!["999".to_string(), "37738".to_string()];

    let result = controller.download_seasons(&ids, &job(temp_dir.path())).await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "1 of 2 ID(s) failed");
    let season_dir = temp_dir.path().join("My Show");
    assert_eq!(fs::read_to_string(season_dir.join("E1.en.srt"))?, common::CUE_SRT);
    assert_eq!(fs::read_to_string(season_dir.join("E2.en.srt"))?, common::CUE_SRT);
    Ok(())
}

/// Test that selection filters reach the season loop
#[tokio::test]
async fn test_download_seasons_withEpisodeFilter_shouldOnlyWriteSelected() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_source(catalog_source());
    let ids = vec!["37738".to_string()];
    let job = DownloadJob { episode_filter: RangeFilter::new(["2"]), ..job(temp_dir.path()) };

    controller.download_seasons(&ids, &job).await?;

    let season_dir = temp_dir.path().join("My Show");
    assert!(!season_dir.join("E1.en.srt").exists());
    assert!(season_dir.join("E2.en.srt").exists());
    Ok(())
}

/// Test that a failing episode does not stop the next one
#[tokio::test]
async fn test_download_episodes_withOneFailingId_shouldContinueAndFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = catalog_source().with_failing_episode("7");
    let tracker = source.tracker();
    let controller = Controller::with_source(source);
    let ids = vec!["7".to_string(), "1".to_string()];

    let result = controller.download_episodes(&ids, None, &job(temp_dir.path())).await;

    assert_eq!(result.unwrap_err().to_string(), "1 of 2 ID(s) failed");
    assert_eq!(fs::read_to_string(temp_dir.path().join("1.srt"))?, common::CUE_SRT);
    assert_eq!(tracker.lock().unwrap().metadata_calls, 2);
    assert_eq!(tracker.lock().unwrap().catalog_calls, 0);
    Ok(())
}

/// Test that a run without failures succeeds and honours the name template
#[tokio::test]
async fn test_download_episodes_withTemplate_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_source(catalog_source());
    let ids = vec!["1".to_string(), "2".to_string()];

    controller.download_episodes(&ids, Some("Show %02d"), &job(temp_dir.path())).await?;

    assert!(temp_dir.path().join("Show 01.srt").exists());
    assert!(temp_dir.path().join("Show 02.srt").exists());
    Ok(())
}
