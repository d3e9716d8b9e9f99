//! Driver session caching.
//!
//! Drivers restart their underlying session (app relaunch, browser context
//! swap) without warning. [`SessionGuard`] hands out a cached handle as long
//! as the driver still reports the same session id and re-acquires
//! transparently the moment it changes, so callers never see a stale handle.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::AutomationError;

/// Provider of driver session handles.
#[async_trait]
pub trait SessionSource: Send + Sync {
    type Handle: Clone + Send;

    /// Id of the session the driver is currently running. Fails with
    /// [`AutomationError::SessionInvalid`] when no session is alive.
    async fn current_session_id(&self) -> Result<String, AutomationError>;

    /// Open a fresh handle, returning it with the id of its session.
    async fn acquire(&self) -> Result<(String, Self::Handle), AutomationError>;
}

/// Caches one handle per live session.
pub struct SessionGuard<S: SessionSource> {
    source: S,
    cached: Mutex<Option<(String, S::Handle)>>,
}

impl<S: SessionSource> SessionGuard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
        }
    }

    /// The handle for the driver's current session, re-acquired when the
    /// cached one no longer matches.
    pub async fn handle(&self) -> Result<S::Handle, AutomationError> {
        let mut cached = self.cached.lock().await;

        match self.source.current_session_id().await {
            Ok(current) => {
                if let Some((id, handle)) = cached.as_ref() {
                    if *id == current {
                        return Ok(handle.clone());
                    }
                    debug!("session changed from {id} to {current}");
                }
            }
            // A dead session is not an error here, just a cache miss.
            Err(AutomationError::SessionInvalid(reason)) => {
                debug!("session invalid ({reason}), acquiring a new one");
            }
            Err(other) => return Err(other),
        }

        let (id, handle) = self.source.acquire().await?;
        info!("acquired session {id}");
        *cached = Some((id, handle.clone()));
        Ok(handle)
    }

    /// Drop the cached handle so the next access re-acquires.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    struct FlakySource {
        /// Session ids reported by successive `current_session_id` calls.
        ids: StdMutex<Vec<Option<String>>>,
        acquisitions: AtomicUsize,
    }

    impl FlakySource {
        fn reporting(ids: &[Option<&str>]) -> Self {
            Self {
                ids: StdMutex::new(
                    ids.iter().rev().map(|id| id.map(str::to_string)).collect(),
                ),
                acquisitions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionSource for FlakySource {
        type Handle = usize;

        async fn current_session_id(&self) -> Result<String, AutomationError> {
            match self.ids.lock().unwrap().pop() {
                Some(Some(id)) => Ok(id),
                Some(None) => Err(AutomationError::SessionInvalid("driver gone".into())),
                None => panic!("unexpected extra session id query"),
            }
        }

        async fn acquire(&self) -> Result<(String, usize), AutomationError> {
            let n = self.acquisitions.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((format!("s{n}"), n))
        }
    }

    #[tokio::test]
    async fn stable_session_reuses_the_cached_handle() {
        // acquire yields s1; both later queries still report s1.
        let guard = SessionGuard::new(FlakySource::reporting(&[
            Some("s0"),
            Some("s1"),
            Some("s1"),
        ]));
        assert_eq!(guard.handle().await.unwrap(), 1);
        assert_eq!(guard.handle().await.unwrap(), 1);
        assert_eq!(guard.handle().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn changed_session_id_triggers_reacquisition() {
        let guard = SessionGuard::new(FlakySource::reporting(&[
            Some("s0"),
            Some("other"),
        ]));
        assert_eq!(guard.handle().await.unwrap(), 1);
        assert_eq!(guard.handle().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn dead_session_is_replaced_silently() {
        let guard = SessionGuard::new(FlakySource::reporting(&[Some("s0"), None]));
        assert_eq!(guard.handle().await.unwrap(), 1);
        // The driver reports no session; the guard recovers on its own.
        assert_eq!(guard.handle().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn invalidate_drops_the_cache() {
        let guard = SessionGuard::new(FlakySource::reporting(&[
            Some("s0"),
            Some("s1"),
        ]));
        assert_eq!(guard.handle().await.unwrap(), 1);
        guard.invalidate().await;
        assert_eq!(guard.handle().await.unwrap(), 2);
    }
}
