//! User repository over the emissions service

use std::sync::Arc;

use futures::{StreamExt, stream};
use reqwest::Client;
use tracing::{error, instrument, warn};

use carbontrace_core::{
    repository::UserRepository,
    result::{ResultState, ResultStream},
    session_store::SessionStore,
    types::{UserId, UserProfile},
};

use crate::{
    ApiError, Result,
    client::{ServiceConfig, create_client, decode_response},
    endpoints,
};

/// HTTP-backed user repository
pub struct HttpUserRepository {
    config: ServiceConfig,
    client: Client,
    store: Arc<dyn SessionStore>,
}

impl HttpUserRepository {
    /// Create a new user repository
    pub fn new(config: ServiceConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            store,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self, user_id: UserId) -> Result<UserProfile> {
        let response = self
            .client
            .get(format!("{}{}", self.config.base_url, endpoints::GET_ME))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        decode_response(response).await
    }
}

impl UserRepository for HttpUserRepository {
    fn get_me(&self) -> ResultStream<'_, UserProfile> {
        Box::pin(
            stream::iter([ResultState::Loading]).chain(stream::once(async move {
                // Precondition, not a network failure: with no stored
                // identity there is nothing to fetch.
                let Some(user_id) = self.store.user_id().await else {
                    let e = ApiError::NotLoggedIn;
                    warn!(endpoint = endpoints::GET_ME, "{}", e);
                    return ResultState::Error(e.message());
                };

                match self.fetch_profile(user_id).await {
                    Ok(profile) => ResultState::Success(profile),
                    Err(e) => {
                        error!(endpoint = endpoints::GET_ME, error = %e, "current-user request failed");
                        ResultState::Error(e.message())
                    }
                }
            })),
        )
    }
}
