//! Pipeline orchestrator
//!
//! Runs one update end to end: fetch, decode and parse the feed, normalize
//! its timestamps, merge with the persisted snapshot, apply retention,
//! assemble the ordered guide and persist it. Every fatal error happens
//! before the final write, so a failed run leaves the previous snapshot in
//! place.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{Config, Credentials};
use crate::errors::AppResult;
use crate::models::GuideSnapshot;
use crate::pipeline::stages::{
    assemble_guide, merge_snapshots, ChannelClassifier, MergeStats, RetentionPolicy,
    TimeNormalizer,
};
use crate::sources::{decode_feed, FeedFetcher};
use crate::storage::SnapshotStore;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched_bytes: usize,
    pub fetched_channels: usize,
    pub fetched_programmes: usize,
    /// Fresh timestamps that could not be parsed and were kept verbatim
    pub timestamps_passed_through: usize,
    /// Whether a previous snapshot was available for merging
    pub history_loaded: bool,
    pub merge: MergeStats,
    pub retention_dropped: usize,
    pub output_channels: usize,
    pub output_programmes: usize,
    /// Compressed size of the written snapshot; `None` on a dry run
    pub bytes_written: Option<u64>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched {} channels / {} programmes, kept {} channels, dropped {} channels, \
             {} programmes from history, {} superseded, {} orphaned, {} pruned by retention; \
             output {} channels / {} programmes",
            self.fetched_channels,
            self.fetched_programmes,
            self.merge.channels_kept,
            self.merge.channels_dropped,
            self.merge.programmes_from_history,
            self.merge.programmes_superseded,
            self.merge.programmes_orphaned,
            self.retention_dropped,
            self.output_channels,
            self.output_programmes
        )?;
        match self.bytes_written {
            Some(bytes) => write!(f, ", wrote {bytes} bytes"),
            None => write!(f, ", nothing written (dry run)"),
        }
    }
}

/// One-shot EPG update
pub struct EpgUpdatePipeline {
    fetcher: Box<dyn FeedFetcher>,
    feed_url: String,
    store: SnapshotStore,
    normalizer: TimeNormalizer,
    classifier: ChannelClassifier,
    retention: RetentionPolicy,
    target_offset: FixedOffset,
}

impl EpgUpdatePipeline {
    /// Assemble a pipeline from explicit parts
    pub fn new(
        fetcher: Box<dyn FeedFetcher>,
        feed_url: String,
        store: SnapshotStore,
        classifier: ChannelClassifier,
        retention: RetentionPolicy,
        target_offset: FixedOffset,
    ) -> Self {
        Self {
            fetcher,
            feed_url,
            store,
            normalizer: TimeNormalizer::new(target_offset),
            classifier,
            retention,
            target_offset,
        }
    }

    /// Build a pipeline from loaded configuration and resolved credentials
    pub fn from_config(
        config: &Config,
        credentials: &Credentials,
        fetcher: Box<dyn FeedFetcher>,
    ) -> AppResult<Self> {
        Ok(Self::new(
            fetcher,
            config.provider.resolve_url(credentials),
            SnapshotStore::new(config.storage.snapshot_path.clone()),
            config.channels.classifier()?,
            config.retention.clone(),
            config.timezone.fixed_offset()?,
        ))
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Wall-clock time in the target offset, the clock normalized
    /// timestamps are written in
    fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.target_offset).naive_local()
    }

    /// Execute one update
    ///
    /// With `dry_run` set everything runs except the final write.
    pub async fn run(&self, now: DateTime<Utc>, dry_run: bool) -> AppResult<RunSummary> {
        let run_started = Instant::now();
        let mut summary = RunSummary::default();

        let stage = Instant::now();
        let body = self.fetcher.fetch_bytes(&self.feed_url).await?;
        summary.fetched_bytes = body.len();
        debug!("Fetch stage completed in {:?}", stage.elapsed());

        let stage = Instant::now();
        let mut fresh = decode_feed(&body)?;
        drop(body);
        summary.fetched_channels = fresh.channels.len();
        summary.fetched_programmes = fresh.programmes.len();
        info!(
            "Parsed feed: channels={} programmes={} in {:?}",
            summary.fetched_channels,
            summary.fetched_programmes,
            stage.elapsed()
        );

        let stage = Instant::now();
        summary.timestamps_passed_through = self.normalizer.normalize_snapshot(&mut fresh);
        debug!("Normalization stage completed in {:?}", stage.elapsed());

        let stage = Instant::now();
        let previous = self.store.load();
        summary.history_loaded = previous.is_some();
        let merged = merge_snapshots(previous, fresh, &self.classifier);
        summary.merge = merged.stats.clone();
        debug!("Merge stage completed in {:?}", stage.elapsed());

        let stage = Instant::now();
        let (programmes, dropped) = self.retention.apply(merged.programmes, self.local_now(now));
        summary.retention_dropped = dropped;
        debug!("Retention stage completed in {:?}", stage.elapsed());

        let guide: GuideSnapshot = assemble_guide(merged.root_attributes, merged.channels, programmes);
        summary.output_channels = guide.channels.len();
        summary.output_programmes = guide.programmes.len();

        if dry_run {
            info!(
                "Dry run: skipping write to {}",
                self.store.path().display()
            );
        } else {
            let stage = Instant::now();
            summary.bytes_written = Some(self.store.save(&guide)?);
            debug!("Write stage completed in {:?}", stage.elapsed());
        }

        info!("EPG update finished in {:?}: {}", run_started.elapsed(), summary);
        Ok(summary)
    }
}
