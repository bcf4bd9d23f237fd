use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::api::models::{TimelineData, TimelineDay};
use crate::api::{ApiClient, CatalogSource};
use crate::app_config::{Config, DownloadOptions};
use crate::catalog::{self, SelectedEpisode};
use crate::downloader::{DownloadOutcome, DownloadRequest, OutcomeKind, SubtitleDownloader};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::range_select::RangeFilter;

// @module: Application controller for the command line workflows

const GREEN: &str = "\x1B[32m";
const YELLOW: &str = "\x1B[33m";
const GREY: &str = "\x1B[90m";
const RESET: &str = "\x1B[0m";

/// Everything a `dl` run needs besides the identifiers
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Subtitle language key, e.g. "en"
    pub language: String,
    pub output_dir: PathBuf,
    pub options: DownloadOptions,
    pub section_filter: RangeFilter,
    pub episode_filter: RangeFilter,
}

/// What `list` should print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Subtitle languages of the first episode
    Languages,
    /// Sections of the season
    Sections,
    /// Selected episodes
    #[default]
    Episodes,
}

/// Main application controller, generic over its catalog source
pub struct Controller<S = ApiClient> {
    // @field: Catalog and subtitle source
    source: S,
}

impl Controller<ApiClient> {
    // @method: Create a new controller talking to the API described by the configuration
    pub fn with_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.api)?;
        Ok(Self::with_source(client))
    }

    /// Search anime by keyword
    pub async fn search(&self, keyword: &str, json: bool) -> Result<()> {
        let results = self.source.search(keyword).await?;

        if json {
            println!("{}", serde_json::to_string(&results)?);
            return Ok(());
        }

        if results.items.is_empty() {
            println!("No results found for your search query. Please try a different keyword or check your spelling.");
            return Ok(());
        }

        let rows = results.items.iter()
            .map(|item| vec![item.season_id.clone(), item.title.clone(), item.index_show.clone()])
            .collect::<Vec<_>>();
        print!("{}", render_table(&["ID", "Title", "Status"], &rows));
        Ok(())
    }

    /// Print the release timeline for a weekday ("mon".."sun"), today when `None`
    pub async fn timeline(&self, day: Option<&str>, json: bool) -> Result<()> {
        let timeline = self.source.timeline().await?;

        if json {
            println!("{}", serde_json::to_string(&timeline)?);
            return Ok(());
        }

        let Some(entry) = timeline_day(&timeline, day) else {
            debug!("No timeline entry for {}", day.unwrap_or("today"));
            return Ok(());
        };

        if entry.cards.is_empty() {
            println!("No updates");
            return Ok(());
        }

        let title_header = format!("Title ({} {})", entry.day_of_week, entry.full_date_text);
        let rows = entry.cards.iter()
            .map(|c| vec![c.season_id.clone(), c.title.clone(), c.index_show.clone()])
            .collect::<Vec<_>>();
        print!("{}", render_table(&["ID", title_header.as_str(), "Status"], &rows));
        Ok(())
    }
}

impl<S: CatalogSource + Clone> Controller<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Download subtitles for every episode of the given seasons.
    ///
    /// A failing season is reported and the remaining seasons are still processed.
    pub async fn download_seasons(&self, season_ids: &[String], job: &DownloadJob) -> Result<()> {
        Self::check_language(&job.language);
        let downloader = self.downloader(job);

        let mut failed = 0;
        for season_id in season_ids {
            if let Err(e) = self.download_season(&downloader, season_id, job).await {
                error!("[ID: {}] {:#}", season_id, e);
                failed += 1;
            }
        }

        Self::summarize(failed, season_ids.len())
    }

    /// Download subtitles for individual episode IDs into a flat output directory
    pub async fn download_episodes(&self, episode_ids: &[String], filename_template: Option<&str>, job: &DownloadJob) -> Result<()> {
        Self::check_language(&job.language);
        FileManager::ensure_dir(&job.output_dir)?;
        let downloader = self.downloader(job);

        let mut failed = 0;
        for request in episode_requests(episode_ids, filename_template) {
            match downloader.download(&request).await {
                Ok(outcome) => report(&outcome, &job.language, job.options.quiet, None),
                Err(e) => {
                    error!("[ID: {}] {:#}", request.episode_id, e);
                    failed += 1;
                }
            }
        }

        Self::summarize(failed, episode_ids.len())
    }

    async fn download_season(&self, downloader: &SubtitleDownloader<S>, season_id: &str, job: &DownloadJob) -> Result<()> {
        let info = self.source.season_info(season_id).await?;
        let episodes = self.source.episode_list(season_id).await?;

        let title = FileManager::clean_file_name(&info.season.title);
        let selected = catalog::enumerate(&episodes.sections, &job.section_filter, &job.episode_filter);
        info!("{}: {} episode(s) selected", info.season.title, selected.len());

        let progress = Self::progress_bar(selected.len() as u64, job.options.quiet);
        for request in season_requests(&title, &selected, &job.language) {
            let outcome = downloader.download(&request).await
                .with_context(|| format!("episode {}", request.episode_id))?;
            report(&outcome, &job.language, job.options.quiet, Some(&progress));
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(())
    }

    /// Print languages, sections or episodes of a season
    pub async fn list(&self, season_id: &str, mode: ListMode, section_filter: &RangeFilter, episode_filter: &RangeFilter) -> Result<()> {
        let info = self.source.season_info(season_id).await?;
        let episodes = self.source.episode_list(season_id).await?;

        let Some(first) = episodes.sections.iter().flat_map(|s| s.episodes.iter()).next() else {
            return Err(anyhow!("The list is currently empty. Please check back later."));
        };

        println!("Title: {}", info.season.title);

        let table = match mode {
            ListMode::Languages => {
                let tracks = self.source.episode_subtitles(&first.episode_id).await?;
                let rows = tracks.iter()
                    .map(|t| vec![t.key.clone(), t.title.clone()])
                    .collect::<Vec<_>>();
                render_table(&["Key", "Lang"], &rows)
            }
            ListMode::Sections => {
                let rows = episodes.sections.iter().enumerate()
                    .map(|(i, s)| vec![(i + 1).to_string(), s.ep_list_title.clone(), s.title.clone()])
                    .collect::<Vec<_>>();
                render_table(&["#", "episode", "title"], &rows)
            }
            ListMode::Episodes => {
                let rows = catalog::enumerate(&episodes.sections, section_filter, episode_filter)
                    .iter()
                    .map(|s| vec![s.episode.short_title_display.clone(), s.episode.long_title_display.clone()])
                    .collect::<Vec<_>>();
                render_table(&["#", "title"], &rows)
            }
        };

        print!("{}", table);
        Ok(())
    }

    fn downloader(&self, job: &DownloadJob) -> SubtitleDownloader<S> {
        SubtitleDownloader::new(self.source.clone(), job.options.clone(), job.language.clone(), job.output_dir.clone())
    }

    fn check_language(language: &str) {
        match language_utils::get_language_name(language) {
            Ok(name) => debug!("Downloading {} ({}) subtitles", name, language),
            Err(e) => warn!("{}; the API may not offer subtitles for it", e),
        }
    }

    fn summarize(failed: usize, total: usize) -> Result<()> {
        if failed > 0 {
            return Err(anyhow!("{} of {} ID(s) failed", failed, total));
        }
        debug!("Processed {} ID(s)", total);
        Ok(())
    }

    fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
        if quiet {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("#>-"));
        progress
    }
}

/// Build download requests for the selected episodes of a season.
///
/// Files land in `<season title>/<episode title>.<language>`.
pub fn season_requests(season_title: &str, selected: &[SelectedEpisode], language: &str) -> Vec<DownloadRequest> {
    selected
        .iter()
        .map(|s| {
            let name = Path::new(season_title)
                .join(format!("{}.{}", FileManager::clean_file_name(&s.episode.title_display), language));
            let publish_time = s.episode.publish_time.unwrap_or_else(Utc::now);
            DownloadRequest::new(s.episode.episode_id.clone(), name, publish_time)
        })
        .collect()
}

/// Build download requests for episode IDs given directly.
///
/// The file name is the ID itself, or the template with its `%d` replaced by
/// the 1-based argument index.
pub fn episode_requests(episode_ids: &[String], filename_template: Option<&str>) -> Vec<DownloadRequest> {
    let now = Utc::now();
    episode_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let name = match filename_template {
                Some(template) => FileManager::format_numbered_name(template, i + 1),
                None => id.clone(),
            };
            DownloadRequest::new(id.clone(), name, now)
        })
        .collect()
}

/// Timeline entry for a weekday ("mon".."sun", any case), or today's entry when `None`
pub fn timeline_day<'a>(timeline: &'a TimelineData, day: Option<&str>) -> Option<&'a TimelineDay> {
    match day {
        Some(day) => timeline.items.iter().find(|d| d.day_of_week.eq_ignore_ascii_case(day)),
        None => timeline.items.iter().find(|d| d.is_today),
    }
}

/// One coloured status line for an outcome, `None` when nothing is printed
pub fn outcome_line(outcome: &DownloadOutcome) -> Option<String> {
    let name = &outcome.file_name;
    match outcome.kind {
        OutcomeKind::Downloaded => Some(format!("{}* {}{}", GREEN, name, RESET)),
        OutcomeKind::SkippedMachineTranslation => Some(format!("{}- {}{}", YELLOW, name, RESET)),
        OutcomeKind::NoTrack => None,
        kind => Some(format!("{}# {}{} {}{}{}", GREY, name, RESET, YELLOW, kind, RESET)),
    }
}

fn report(outcome: &DownloadOutcome, language: &str, quiet: bool, progress: Option<&ProgressBar>) {
    if outcome.kind == OutcomeKind::NoTrack {
        warn!("No '{}' subtitle for {}", language, outcome.file_name);
        return;
    }

    if quiet {
        return;
    }

    if let Some(line) = outcome_line(outcome) {
        match progress {
            Some(progress) => progress.println(line),
            None => println!("{}", line),
        }
    }
}

/// Render a borderless, left-aligned table
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let upper: Vec<String> = header.iter().map(|h| h.to_uppercase()).collect();
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = table_row(&upper, &widths);
    out.push_str(&table_row(&rules, &widths));
    for row in rows {
        let mut cells: Vec<String> = row.iter().take(columns).cloned().collect();
        cells.resize(columns, String::new());
        out.push_str(&table_row(&cells, &widths));
    }
    out
}

fn table_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
