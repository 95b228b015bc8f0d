//! Merge stage
//!
//! Reconciles the persisted guide with the freshly fetched one. Channels
//! are keyed by id and programmes by (channel, start); on conflict the
//! fresh entity replaces the old one. Old-only programmes are kept, which
//! is how the guide builds up history while the provider only ever
//! publishes a forward-looking window.
//!
//! Classification is re-applied on every run to the winning version of
//! each channel, so a channel renamed upstream out of the curated set
//! disappears together with its historical programmes.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::models::{Channel, GuideSnapshot, Programme, ProgrammeKey};
use crate::pipeline::stages::filtering::ChannelClassifier;

/// Counters describing one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub channels_kept: usize,
    pub channels_dropped: usize,
    /// Old programmes replaced by a fresh programme with the same key
    pub programmes_superseded: usize,
    /// Old-only programmes carried over
    pub programmes_from_history: usize,
    /// Programmes whose channel was dropped or never declared
    pub programmes_orphaned: usize,
}

/// Result of merging, before retention and ordering
#[derive(Debug, Clone, Default)]
pub struct MergedGuide {
    /// Root attributes of the fresh snapshot
    pub root_attributes: Vec<(String, String)>,
    pub channels: Vec<Channel>,
    pub programmes: Vec<Programme>,
    pub stats: MergeStats,
}

/// Insertion-ordered map: replacing a value keeps its original position
struct OrderedMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<V>,
}

impl<K: std::hash::Hash + Eq, V> OrderedMap<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Insert or replace, returning the replaced value
    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position], value)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(value);
                None
            }
        }
    }

    fn into_values(self) -> Vec<V> {
        self.entries
    }
}

/// Where a merged programme came from
#[derive(Clone, Copy, PartialEq, Eq)]
enum Origin {
    History,
    Fresh,
}

/// Merge an optional persisted snapshot with a fresh one
///
/// `previous` is `None` on the first run or when the persisted snapshot
/// could not be read; the result is then built from `fresh` alone.
pub fn merge_snapshots(
    previous: Option<GuideSnapshot>,
    fresh: GuideSnapshot,
    classifier: &ChannelClassifier,
) -> MergedGuide {
    let mut stats = MergeStats::default();
    let GuideSnapshot {
        root_attributes,
        channels: fresh_channels,
        programmes: fresh_programmes,
    } = fresh;
    let (old_channels, old_programmes) = match previous {
        Some(snapshot) => (snapshot.channels, snapshot.programmes),
        None => (Vec::new(), Vec::new()),
    };

    // Channel identity: fresh replaces old with the same id
    let mut channels: OrderedMap<String, Channel> = OrderedMap::new();
    for channel in old_channels.into_iter().chain(fresh_channels) {
        channels.upsert(channel.id().to_string(), channel);
    }

    let mut kept_channels = Vec::new();
    let mut kept_ids = HashSet::new();
    for channel in channels.into_values() {
        let display_name = channel.display_name().unwrap_or_default();
        if classifier.keep_channel(&display_name) {
            kept_ids.insert(channel.id().to_string());
            kept_channels.push(channel);
        } else {
            debug!(
                "Dropping channel '{}' ({}): no channel rule matched",
                channel.id(),
                display_name
            );
            stats.channels_dropped += 1;
        }
    }
    stats.channels_kept = kept_channels.len();

    // Programme identity: fresh replaces old with the same (channel, start)
    let mut programmes: OrderedMap<ProgrammeKey, (Origin, Programme)> = OrderedMap::new();
    for programme in old_programmes {
        programmes.upsert(programme.key(), (Origin::History, programme));
    }
    for programme in fresh_programmes {
        let replaced = programmes.upsert(programme.key(), (Origin::Fresh, programme));
        if matches!(replaced, Some((Origin::History, _))) {
            stats.programmes_superseded += 1;
        }
    }

    let mut kept_programmes = Vec::new();
    for (origin, programme) in programmes.into_values() {
        if !kept_ids.contains(programme.channel_id()) {
            stats.programmes_orphaned += 1;
            continue;
        }
        if origin == Origin::History {
            stats.programmes_from_history += 1;
        }
        kept_programmes.push(programme);
    }

    info!(
        "Merged guide: channels_kept={} channels_dropped={} programmes={} superseded={} from_history={} orphaned={}",
        stats.channels_kept,
        stats.channels_dropped,
        kept_programmes.len(),
        stats.programmes_superseded,
        stats.programmes_from_history,
        stats.programmes_orphaned
    );

    MergedGuide {
        root_attributes,
        channels: kept_channels,
        programmes: kept_programmes,
        stats,
    }
}
