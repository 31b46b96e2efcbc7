//! Process-wide uploader handle.
//!
//! The handle is built on first use and then shared by every request:
//!
//! ```text
//! Uninitialized --first get()--> Constructing --ok--> Ready (forever)
//!                                      |
//!                                      +--err--> Uninitialized
//! ```
//!
//! Concurrent first callers wait on the same construction instead of
//! racing to build their own. A failed construction is not remembered, so
//! the next request tries again. A ready handle is never refreshed.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::UploadError;
use crate::upload::uploader::{Uploader, UploaderFactory};

pub struct UploaderSession {
    factory: Arc<dyn UploaderFactory>,
    handle: OnceCell<Arc<dyn Uploader>>,
}

impl UploaderSession {
    pub fn new(factory: Arc<dyn UploaderFactory>) -> Self {
        Self {
            factory,
            handle: OnceCell::new(),
        }
    }

    /// Return the shared uploader, constructing it if no call has succeeded yet.
    pub async fn get(&self) -> Result<Arc<dyn Uploader>, UploadError> {
        self.handle
            .get_or_try_init(|| async {
                tracing::info!("Initializing Irys uploader");
                match self.factory.connect().await {
                    Ok(uploader) => {
                        tracing::info!("Irys uploader initialized");
                        Ok(uploader)
                    }
                    Err(e) => {
                        tracing::error!("Failed to initialize Irys uploader: {}", e);
                        Err(e)
                    }
                }
            })
            .await
            .map(Arc::clone)
    }

    /// Whether a handle has been constructed.
    pub fn is_ready(&self) -> bool {
        self.handle.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::uploader::{MockUploader, Tag, UploadReceipt};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Factory that fails its first `failures` calls and counts every call.
    struct CountingFactory {
        calls: AtomicUsize,
        failures: usize,
        delay: Duration,
    }

    impl CountingFactory {
        fn new(failures: usize, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
                delay,
            }
        }
    }

    #[async_trait]
    impl UploaderFactory for CountingFactory {
        async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if n < self.failures {
                return Err(UploadError::MissingCredential("PRIVATE_KEY".to_string()));
            }
            Ok(Arc::new(MockUploader))
        }
    }

    #[tokio::test]
    async fn test_ready_handle_is_shared() {
        let factory = Arc::new(CountingFactory::new(0, Duration::ZERO));
        let session = UploaderSession::new(factory.clone());
        assert!(!session.is_ready());

        let a = session.get().await.unwrap();
        let b = session.get().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(session.is_ready());
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let factory = Arc::new(CountingFactory::new(1, Duration::ZERO));
        let session = UploaderSession::new(factory.clone());

        let err = session.get().await.err().unwrap();
        assert!(matches!(err, UploadError::MissingCredential(_)));
        assert!(!session.is_ready());

        session.get().await.unwrap();
        session.get().await.unwrap();
        assert_eq!(factory.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_always_failing_factory_never_yields_handle() {
        let factory = Arc::new(CountingFactory::new(usize::MAX, Duration::ZERO));
        let session = UploaderSession::new(factory.clone());
        for _ in 0..3 {
            assert!(session.get().await.is_err());
        }
        assert!(!session.is_ready());
        assert_eq!(factory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_construction() {
        let factory = Arc::new(CountingFactory::new(0, Duration::from_millis(50)));
        let session = Arc::new(UploaderSession::new(factory.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.get().await })
            })
            .collect();

        let mut uploaders = Vec::new();
        for handle in handles {
            uploaders.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
        assert!(uploaders.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));

        let receipt: UploadReceipt = uploaders[0]
            .upload(b"x", &[Tag::new("a", "b")])
            .await
            .unwrap();
        assert!(!receipt.id.is_empty());
    }
}
