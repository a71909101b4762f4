//! Error taxonomy for the sync engine.
//!
//! Three families of failures flow through [`SyncError`]:
//!
//! - **Configuration errors** ([`SyncError::LocaleCollision`]): fatal, raised
//!   synchronously, never retried. They indicate a setup defect that needs
//!   operator intervention.
//! - **Backend I/O errors** ([`SyncError::Backend`], [`SyncError::Store`]):
//!   propagated upward unmodified. They abort the current stage or batch;
//!   retry policy, if any, belongs to the backend client.
//! - **Lock errors** ([`SyncError::Lock`]): the reindex mutual-exclusion lock
//!   could not be obtained.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Two distinct locales folded to the same physical index name.
    ///
    /// Index names only keep lowercase ASCII letters, so e.g. `en-US` and
    /// `en_us` both normalize to `enus`. Writing both into one index would
    /// silently corrupt data, so the second locale seen fails hard instead.
    #[error("locale collision: '{second}' and '{first}' both map to index '{index}'")]
    LocaleCollision {
        /// The locale that claimed the index name first.
        first: String,
        /// The locale that collided with it.
        second: String,
        /// The derived physical index name.
        index: String,
    },

    /// Search engine call failed.
    #[error("search backend error: {0}")]
    Backend(String),

    /// Document store call failed.
    #[error("document store error: {0}")]
    Store(String),

    /// Named lock could not be acquired.
    #[error("lock '{0}' could not be acquired")]
    Lock(String),
}

impl SyncError {
    /// Whether this error is a configuration defect (as opposed to a
    /// transient backend failure). Configuration errors must never be
    /// retried.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::LocaleCollision { .. })
    }
}
