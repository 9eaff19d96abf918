use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::client::AlteregoClient;
use crate::types::Snapshot;

/// Cadence at which callers should drive [`StationCoordinator::refresh`].
/// Short enough for the zones feed's 60 s freshness target; the gated
/// feeds self-throttle to their own intervals regardless of tick rate.
pub const RECOMMENDED_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Minimum age before each gated feed is refetched.
#[derive(Debug, Clone, Copy)]
pub struct FeedIntervals {
    pub global: Duration,
    pub deums: Duration,
    pub timers: Duration,
}

impl Default for FeedIntervals {
    fn default() -> Self {
        Self {
            global: Duration::from_secs(300),
            deums: Duration::from_secs(60),
            timers: Duration::from_secs(300),
        }
    }
}

/// Polls one station and maintains its merged [`Snapshot`].
///
/// Zones are refetched on every tick; global, deums and timers each carry
/// an independent staleness stamp and are refetched only once their
/// interval has elapsed. A gated feed that fails keeps its previous value
/// and its stamp untouched, so the next tick retries promptly.
///
/// Known trade-off: a gated feed that keeps failing serves its last good
/// value indefinitely. There is no staleness ceiling and no degraded flag.
pub struct StationCoordinator {
    api: AlteregoClient,
    station_id: String,
    intervals: FeedIntervals,
    data: Snapshot,
    last_global: Option<Instant>,
    last_deums: Option<Instant>,
    last_timers: Option<Instant>,
}

impl StationCoordinator {
    pub fn new(api: AlteregoClient, station_id: impl Into<String>) -> Self {
        Self {
            api,
            station_id: station_id.into(),
            intervals: FeedIntervals::default(),
            data: Snapshot::default(),
            last_global: None,
            last_deums: None,
            last_timers: None,
        }
    }

    pub fn with_intervals(mut self, intervals: FeedIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// The last merged snapshot. Empty until the first [`refresh`] call
    /// completes; callers must run one refresh before handing this out.
    ///
    /// [`refresh`]: StationCoordinator::refresh
    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    /// Direct access to the underlying client, for typed update calls.
    pub fn client(&mut self) -> &mut AlteregoClient {
        &mut self.api
    }

    /// One poll tick: four sequential sub-fetches merged into a fresh
    /// snapshot, which replaces the previous one only when the whole
    /// cycle has run. API-level failures are tolerated per feed (zones
    /// come up empty for the tick, gated feeds fall back to their
    /// previous value); anything else aborts the cycle.
    pub async fn refresh(&mut self) -> Result<&Snapshot> {
        let mut data = Snapshot::default();

        match self.api.get_zones(&self.station_id).await {
            Ok(zones) => data.zones = zones,
            Err(err) if err.is_api() => {
                warn!(station = %self.station_id, error = %err, "failed to update zones");
            }
            Err(err) => return Err(err),
        }

        let now = Instant::now();

        if stale(self.last_global, self.intervals.global, now) {
            match self.api.get_global_status(&self.station_id).await {
                Ok(envelope) => {
                    data.global = envelope.into_state();
                    self.last_global = Some(now);
                }
                Err(err) if err.is_api() => {
                    warn!(station = %self.station_id, error = %err, "failed to update global status");
                    data.global = self.data.global.clone();
                }
                Err(err) => return Err(err),
            }
        } else {
            data.global = self.data.global.clone();
        }

        if stale(self.last_deums, self.intervals.deums, now) {
            match self.api.get_deums(&self.station_id).await {
                Ok(deums) => {
                    data.deums = deums;
                    self.last_deums = Some(now);
                }
                Err(err) if err.is_api() => {
                    warn!(station = %self.station_id, error = %err, "failed to update deums");
                    data.deums = self.data.deums.clone();
                }
                Err(err) => return Err(err),
            }
        } else {
            data.deums = self.data.deums.clone();
        }

        if stale(self.last_timers, self.intervals.timers, now) {
            match self.api.get_timers(&self.station_id).await {
                Ok(timers) => {
                    data.timers = timers;
                    self.last_timers = Some(now);
                }
                Err(err) if err.is_api() => {
                    warn!(station = %self.station_id, error = %err, "failed to update timers");
                    data.timers = self.data.timers.clone();
                }
                Err(err) => return Err(err),
            }
        } else {
            data.timers = self.data.timers.clone();
        }

        debug!(
            station = %self.station_id,
            zones = data.zones.len(),
            deums = data.deums.len(),
            timers = data.timers.len(),
            "poll cycle merged"
        );
        self.data = data;
        Ok(&self.data)
    }

    /// Forget the per-feed stamps so the next tick refetches every feed.
    /// Call after pushing an update, then drive a tick.
    pub fn request_refresh(&mut self) {
        self.last_global = None;
        self.last_deums = None;
        self.last_timers = None;
    }

    // -- Update pass-throughs --

    pub async fn update_zone(&mut self, zone_id: &str, data: &Value) -> Result<Value> {
        self.api.update_zone(&self.station_id, zone_id, data).await
    }

    pub async fn update_timer(&mut self, timer_id: &str, data: &Value) -> Result<Value> {
        self.api.update_timer(&self.station_id, timer_id, data).await
    }

    pub async fn update_deum(&mut self, deum_id: &str, data: &Value) -> Result<Value> {
        self.api.update_deum(&self.station_id, deum_id, data).await
    }

    pub async fn update_global(&mut self, data: &Value) -> Result<Value> {
        self.api.update_global(&self.station_id, data).await
    }
}

fn stale(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    match last {
        Some(t) => now.duration_since(t) > interval,
        None => true,
    }
}
