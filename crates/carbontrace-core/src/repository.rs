//! Repository trait seams between UI callers and the remote service
//!
//! Every operation returns a cold [`ResultStream`]: each call emits
//! `Loading`, performs the work, then emits exactly one terminal state.
//! Re-invoking the method is the only way to retry.

use crate::result::ResultStream;
use crate::types::{
    Activity, ActivityQuery, AuthResponse, NewActivity, SignInRequest, SignUpRequest, UserProfile,
};

/// Sign-up and sign-in against the emissions service.
///
/// On success the server-assigned identity has already been persisted to the
/// session store by the time `Success` is observable; on any failure the
/// store is left untouched.
pub trait AuthRepository: Send + Sync {
    /// Register a new account and establish a session for it.
    fn sign_up(&self, request: SignUpRequest) -> ResultStream<'_, AuthResponse>;

    /// Authenticate an existing account and establish a session for it.
    fn sign_in(&self, request: SignInRequest) -> ResultStream<'_, AuthResponse>;
}

/// Reads about the currently authenticated user.
pub trait UserRepository: Send + Sync {
    /// Fetch the current user's profile.
    ///
    /// Requires a stored identity; with none present the stream terminates
    /// with a precondition error and no request is issued.
    fn get_me(&self) -> ResultStream<'_, UserProfile>;
}

/// Emission activity reads and writes.
pub trait ActivitiesRepository: Send + Sync {
    /// List recorded activities, optionally filtered and paginated.
    fn list(&self, query: ActivityQuery) -> ResultStream<'_, Vec<Activity>>;

    /// Record a new activity.
    fn create(&self, request: NewActivity) -> ResultStream<'_, Activity>;
}
