//! Activities repository over the emissions service

use futures::{StreamExt, stream};
use reqwest::Client;
use tracing::{error, instrument};

use carbontrace_core::{
    repository::ActivitiesRepository,
    result::{ResultState, ResultStream},
    types::{Activity, ActivityQuery, NewActivity},
};

use crate::{
    Result,
    client::{ServiceConfig, create_client, decode_response},
    endpoints,
};

/// HTTP-backed activities repository
///
/// Neither operation touches the session store; auth for these routes is a
/// transport-layer concern.
pub struct HttpActivitiesRepository {
    config: ServiceConfig,
    client: Client,
}

impl HttpActivitiesRepository {
    /// Create a new activities repository
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self { config, client })
    }

    #[instrument(skip(self))]
    async fn fetch_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>> {
        let response = self
            .client
            .get(format!("{}{}", self.config.base_url, endpoints::ACTIVITIES))
            .query(query)
            .send()
            .await?;

        decode_response(response).await
    }

    #[instrument(skip(self, request))]
    async fn post_activity(&self, request: &NewActivity) -> Result<Activity> {
        let response = self
            .client
            .post(format!("{}{}", self.config.base_url, endpoints::ACTIVITIES))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        decode_response(response).await
    }
}

impl ActivitiesRepository for HttpActivitiesRepository {
    fn list(&self, query: ActivityQuery) -> ResultStream<'_, Vec<Activity>> {
        Box::pin(
            stream::iter([ResultState::Loading]).chain(stream::once(async move {
                match self.fetch_activities(&query).await {
                    Ok(activities) => ResultState::Success(activities),
                    Err(e) => {
                        error!(endpoint = endpoints::ACTIVITIES, error = %e, "activity list failed");
                        ResultState::Error(e.message())
                    }
                }
            })),
        )
    }

    fn create(&self, request: NewActivity) -> ResultStream<'_, Activity> {
        Box::pin(
            stream::iter([ResultState::Loading]).chain(stream::once(async move {
                match self.post_activity(&request).await {
                    Ok(activity) => ResultState::Success(activity),
                    Err(e) => {
                        error!(endpoint = endpoints::ACTIVITIES, error = %e, "activity create failed");
                        ResultState::Error(e.message())
                    }
                }
            })),
        )
    }
}
