//! Session store trait
//!
//! The `SessionStore` trait abstracts the persisted, observable holder of the
//! authenticated user's identity. Implementations must expose snapshot reads
//! and change observation as separate accessors: answering "is someone signed
//! in right now" by subscribing and waiting for a notification can block
//! forever on an empty store and races with concurrent writes.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{Result, types::UserId};

/// Type alias for identity observation streams
pub type IdentityStream<'a> = BoxStream<'a, Option<UserId>>;

/// Persisted, observable holder of one optional user identity.
///
/// Implementations:
/// - `FileSessionStore`: JSON document on disk (carbontrace-session)
///
/// At most one identity is stored at a time (last write wins); absence means
/// "not authenticated". No other credential material is ever persisted.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of the currently persisted identity.
    ///
    /// Reflects the latest committed write. An unreadable store reads as
    /// absent (treat as unauthenticated).
    async fn user_id(&self) -> Option<UserId>;

    /// Live stream of the identity: the current value immediately, then a
    /// re-emission on every change. Never terminates on its own; the
    /// subscriber drops the stream to cancel.
    fn observe(&self) -> IdentityStream<'_>;

    /// Persist `id`, replacing any prior value, and notify observers once.
    ///
    /// # Errors
    /// - `Error::Io` / `Error::SessionStore` if the write cannot be made
    ///   durable; fatal for the enclosing operation.
    async fn set_user_id(&self, id: UserId) -> Result<()>;

    /// Remove the stored identity and notify observers once with absent.
    ///
    /// # Errors
    /// - `Error::Io` / `Error::SessionStore` if the removal cannot be made
    ///   durable; fatal for the enclosing operation.
    async fn clear(&self) -> Result<()>;

    /// True iff an identity is currently present.
    ///
    /// This is a direct snapshot read; it must never await a future
    /// notification.
    fn is_authenticated(&self) -> bool;
}
