//! Small async helpers shared by the connection and parsing code.

use std::future::Future;
use std::io;
use std::time::Duration;

/// Runs an I/O future under an optional deadline.
///
/// With `None` the future runs to completion however long it takes. An
/// elapsed deadline becomes an `io::ErrorKind::TimedOut` error naming `what`.
pub async fn with_deadline<T, F>(deadline: Option<Duration>, what: &str, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{what} timed out after {limit:?}"),
            )),
        },
        None => fut.await,
    }
}
