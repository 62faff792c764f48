//! # Callback Adapter
//!
//! Calls are plain futures. Front-ends built around completion callbacks can hand the future
//! to [`spawn_with_callback`], which runs it on the tokio runtime and reports the outcome once.
use super::client::CallError;
use std::future::Future;
use tokio::task::JoinHandle;

/// Spawns `call` and invokes `callback` exactly once with its outcome.
///
/// The `Result` carries either the response or the error, never both and never neither.
/// Dropping the returned handle detaches the task: the call still completes and the callback
/// still runs, nothing is cancelled on the transport.
///
/// Must be called from within a tokio runtime.
pub fn spawn_with_callback<F, T, C>(call: F, callback: C) -> JoinHandle<()>
where
    F: Future<Output = Result<T, CallError>> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(Result<T, CallError>) + Send + 'static,
{
    tokio::spawn(async move { callback(call.await) })
}
