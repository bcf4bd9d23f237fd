/*!
 * Section/episode selection over a season catalog.
 *
 * Episodes are numbered globally across the whole season: an episode's
 * position is the number of episodes in all earlier sections plus its 1-based
 * position inside its own section. Section filters use 1-based section
 * indices, episode filters use global positions.
 */

use crate::api::models::{Episode, Section};
use crate::range_select::{is_selected, RangeFilter};

/// One episode picked by [`enumerate`]
#[derive(Debug, Clone, Copy)]
pub struct SelectedEpisode<'a> {
    /// 1-based index of the owning section
    pub section_index: usize,
    pub section: &'a Section,
    pub episode: &'a Episode,
    /// 1-based position across the whole catalog
    pub global_position: usize,
}

/// Running state threaded through the walk
struct Walk<'a> {
    offset: usize,
    selected: Vec<SelectedEpisode<'a>>,
}

/// Walk the catalog in order and keep the episodes passing both filters.
///
/// The running offset advances past every section, selected or not, so
/// global positions do not depend on the section filter.
pub fn enumerate<'a>(
    sections: &'a [Section],
    section_filter: &RangeFilter,
    episode_filter: &RangeFilter,
) -> Vec<SelectedEpisode<'a>> {
    let section_selection = section_filter.resolve(sections.len() as i64);

    let walk = sections.iter().enumerate().fold(
        Walk { offset: 0, selected: Vec::new() },
        |mut walk, (i, section)| {
            let section_index = i + 1;
            let episode_count = section.episodes.len();

            if is_selected(section_selection.as_ref(), section_index as i64) {
                let max = (walk.offset + episode_count) as i64;
                let episode_selection = episode_filter.resolve(max);

                for (j, episode) in section.episodes.iter().enumerate() {
                    let global_position = walk.offset + j + 1;
                    if is_selected(episode_selection.as_ref(), global_position as i64) {
                        walk.selected.push(SelectedEpisode {
                            section_index,
                            section,
                            episode,
                            global_position,
                        });
                    }
                }
            }

            walk.offset += episode_count;
            walk
        },
    );

    walk.selected
}
