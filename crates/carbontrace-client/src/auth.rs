//! Auth repository over the emissions service
//!
//! Sign-up and sign-in POST the credentials as JSON. On success the returned
//! identity is persisted to the session store before the terminal emission,
//! so a caller reacting to `Success` can already rely on
//! `is_authenticated()`. On any failure the store is left untouched.

use std::sync::Arc;

use futures::{StreamExt, stream};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, instrument};

use carbontrace_core::{
    repository::AuthRepository,
    result::{ResultState, ResultStream},
    session_store::SessionStore,
    types::{AuthResponse, SignInRequest, SignUpRequest},
};

use crate::{
    Result,
    client::{ServiceConfig, create_client, decode_response},
    endpoints,
};

/// HTTP-backed auth repository
pub struct HttpAuthRepository {
    config: ServiceConfig,
    client: Client,
    store: Arc<dyn SessionStore>,
}

impl HttpAuthRepository {
    /// Create a new auth repository
    pub fn new(config: ServiceConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Drop the persisted session. Purely local; no request is issued.
    pub async fn sign_out(&self) -> Result<()> {
        self.store.clear().await?;
        Ok(())
    }

    #[instrument(skip(self, credentials))]
    async fn authenticate<B>(&self, endpoint: &'static str, credentials: &B) -> Result<AuthResponse>
    where
        B: Serialize + Sync,
    {
        let response = self
            .client
            .post(format!("{}{}", self.config.base_url, endpoint))
            .header("Content-Type", "application/json")
            .json(credentials)
            .send()
            .await?;

        let auth: AuthResponse = decode_response(response).await?;

        // The identity must be durable before the caller can observe Success.
        self.store.set_user_id(auth.user_id).await?;

        Ok(auth)
    }

    fn auth_stream<B>(&self, endpoint: &'static str, credentials: B) -> ResultStream<'_, AuthResponse>
    where
        B: Serialize + Send + Sync + 'static,
    {
        Box::pin(
            stream::iter([ResultState::Loading]).chain(stream::once(async move {
                match self.authenticate(endpoint, &credentials).await {
                    Ok(auth) => ResultState::Success(auth),
                    Err(e) => {
                        error!(endpoint, error = %e, "authentication request failed");
                        ResultState::Error(e.message())
                    }
                }
            })),
        )
    }
}

impl AuthRepository for HttpAuthRepository {
    fn sign_up(&self, request: SignUpRequest) -> ResultStream<'_, AuthResponse> {
        self.auth_stream(endpoints::SIGN_UP, request)
    }

    fn sign_in(&self, request: SignInRequest) -> ResultStream<'_, AuthResponse> {
        self.auth_stream(endpoints::SIGN_IN, request)
    }
}
