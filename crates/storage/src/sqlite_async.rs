//! Async trait implementation for `SQLite` `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use notewatch_core::SeenRecord;

use crate::Storage;
use crate::error::StorageError;
use crate::traits::SeenStore;

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Join(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`      — `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`      — `.to_owned()` a `&str`, pass as `&arg`
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
}

// ── SeenStore ────────────────────────────────────────────────────

#[async_trait]
impl SeenStore for Storage {
    async fn insert_if_absent(&self, record: &SeenRecord) -> Result<bool, StorageError> {
        delegate!(self, insert_if_absent, @ref record)
    }
    async fn count_for_subject(&self, subject_id: &str) -> Result<u64, StorageError> {
        delegate!(self, count_for_subject, @str subject_id)
    }
}
