//! Guide generation stage
//!
//! Produces the final document: channels ascending by id, then programmes
//! ascending by start. Both sorts are stable, so entries with equal keys
//! keep the order the merge produced them in. Start timestamps share one
//! fixed-width format after normalization, which makes the lexical order
//! chronological.

use tracing::debug;

use crate::models::{Channel, GuideSnapshot, Programme};
use crate::pipeline::stages::merging::MergedGuide;

/// Assemble the ordered output snapshot
pub fn assemble_guide(
    root_attributes: Vec<(String, String)>,
    mut channels: Vec<Channel>,
    mut programmes: Vec<Programme>,
) -> GuideSnapshot {
    channels.sort_by(|a, b| a.id().cmp(b.id()));
    programmes.sort_by(|a, b| a.start().unwrap_or("").cmp(b.start().unwrap_or("")));

    debug!(
        "Assembled guide: channels={} programmes={}",
        channels.len(),
        programmes.len()
    );

    GuideSnapshot::new(root_attributes, channels, programmes)
}

impl From<MergedGuide> for GuideSnapshot {
    fn from(merged: MergedGuide) -> Self {
        assemble_guide(merged.root_attributes, merged.channels, merged.programmes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_channels_sorted_by_id() {
        let guide = assemble_guide(
            Vec::new(),
            vec![
                Channel::with_display_name("tnt.1", "TNT Sports 1"),
                Channel::with_display_name("fox.503", "Fox Sports 503"),
                Channel::with_display_name("kayo.1", "Kayo Sports"),
            ],
            Vec::new(),
        );

        let ids: Vec<&str> = guide.channels.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["fox.503", "kayo.1", "tnt.1"]);
    }

    #[test]
    fn test_programme_ties_keep_encounter_order() {
        let guide = assemble_guide(
            Vec::new(),
            Vec::new(),
            vec![
                Programme::with_title("tnt.1", "20260110200000 +0530", "", "Later"),
                Programme::with_title("kayo.1", "20260110180000 +0530", "", "Kayo first"),
                Programme::with_title("fox.503", "20260110180000 +0530", "", "Fox second"),
            ],
        );

        let titles: Vec<String> = guide
            .programmes
            .iter()
            .filter_map(|p| p.title())
            .collect();
        assert_eq!(titles, vec!["Kayo first", "Fox second", "Later"]);
    }

    proptest! {
        #[test]
        fn prop_programmes_are_non_decreasing_by_start(
            starts in prop::collection::vec("[0-9]{14} \\+0530", 0..40)
        ) {
            let programmes = starts
                .iter()
                .map(|start| Programme::with_title("kayo.1", start, "", "Show"))
                .collect();

            let guide = assemble_guide(Vec::new(), Vec::new(), programmes);

            for pair in guide.programmes.windows(2) {
                prop_assert!(pair[0].start() <= pair[1].start());
            }
            prop_assert_eq!(guide.programmes.len(), starts.len());
        }
    }
}
