//! Analytics query layer
//!
//! Loads the three dashboard reads (KPIs, trend, summary) concurrently and
//! hands them to presentation as one consistent snapshot. Overlapping loads
//! are resolved by generation: a newer call supersedes an in-flight one, and
//! only the newest call may commit to the shared presentation state, so
//! payloads from different fetch cycles are never mixed.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::{StreamExt, stream};
use futures::stream::BoxStream;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, instrument};

use carbontrace_core::{
    result::{ResultState, ResultStream},
    types::{AnalyticsSnapshot, DateRange, KpisResponse, SummaryResponse, TrendPoint},
};

use crate::{
    Result,
    client::{ServiceConfig, create_client, decode_response},
    endpoints,
};

/// The dashboard always charts per-day.
const TREND_GRANULARITY: &str = "day";

/// Concurrent loader for the analytics dashboard
pub struct AnalyticsClient {
    config: ServiceConfig,
    client: Client,
    generation: AtomicU64,
    committed: watch::Sender<Option<AnalyticsSnapshot>>,
}

impl AnalyticsClient {
    /// Create a new analytics client
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        let (committed, _) = watch::channel(None);
        Ok(Self {
            config,
            client,
            generation: AtomicU64::new(0),
            committed,
        })
    }

    /// Load the dashboard data for `range` (the trailing 30 days when
    /// `None`).
    ///
    /// The three reads run concurrently; the first failure fails the whole
    /// load and nothing partial is committed or surfaced. On success the
    /// snapshot is committed to the shared presentation state unless a newer
    /// `load` call has started in the meantime.
    pub fn load(&self, range: Option<DateRange>) -> ResultStream<'_, AnalyticsSnapshot> {
        // Captured at call start so a later call supersedes this one even
        // before this stream is first polled.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        Box::pin(
            stream::iter([ResultState::Loading]).chain(stream::once(async move {
                let range = range.unwrap_or_else(DateRange::trailing_30_days);

                match self.fetch_all(&range).await {
                    Ok(snapshot) => {
                        if self.generation.load(Ordering::SeqCst) == generation {
                            self.committed.send_replace(Some(snapshot.clone()));
                        } else {
                            debug!(generation, "analytics load superseded, not committed");
                        }
                        ResultState::Success(snapshot)
                    }
                    Err(e) => ResultState::Error(e.message()),
                }
            })),
        )
    }

    /// Latest committed snapshot, if any load has completed.
    pub fn snapshot(&self) -> Option<AnalyticsSnapshot> {
        self.committed.borrow().clone()
    }

    /// Committed-snapshot stream: the current value immediately, then every
    /// subsequent commit.
    pub fn watch_snapshots(&self) -> BoxStream<'static, Option<AnalyticsSnapshot>> {
        let rx = self.committed.subscribe();
        Box::pin(stream::unfold((rx, true), |(mut rx, first)| async move {
            if first {
                let value = rx.borrow_and_update().clone();
                return Some((value, (rx, false)));
            }
            match rx.changed().await {
                Ok(()) => {
                    let value = rx.borrow_and_update().clone();
                    Some((value, (rx, false)))
                }
                Err(_) => None,
            }
        }))
    }

    #[instrument(skip(self))]
    async fn fetch_all(&self, range: &DateRange) -> Result<AnalyticsSnapshot> {
        let (kpis, trend, summary) = tokio::try_join!(
            self.fetch_kpis(range),
            self.fetch_trend(range),
            self.fetch_summary(),
        )?;

        Ok(AnalyticsSnapshot::assemble(kpis, trend, summary))
    }

    async fn fetch_kpis(&self, range: &DateRange) -> Result<KpisResponse> {
        self.fetch_json(
            endpoints::ANALYTICS_KPIS,
            &[
                ("from", range.from.to_string()),
                ("to", range.to.to_string()),
            ],
        )
        .await
    }

    async fn fetch_trend(&self, range: &DateRange) -> Result<Vec<TrendPoint>> {
        self.fetch_json(
            endpoints::ANALYTICS_TREND,
            &[
                ("from", range.from.to_string()),
                ("to", range.to.to_string()),
                ("granularity", TREND_GRANULARITY.to_string()),
            ],
        )
        .await
    }

    async fn fetch_summary(&self) -> Result<SummaryResponse> {
        self.fetch_json(endpoints::ANALYTICS_SUMMARY, &[]).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let result = async {
            let response = self
                .client
                .get(format!("{}{}", self.config.base_url, endpoint))
                .query(query)
                .send()
                .await?;
            decode_response(response).await
        }
        .await;

        if let Err(e) = &result {
            error!(endpoint, error = %e, "analytics read failed");
        }
        result
    }
}
