//! Async run driver.

use futures_io::AsyncRead;

use super::AsyncValueScanner;
use crate::error::Result;
use crate::splitter::{RunLoop, RunReport, Splitter};

impl Splitter {
    /// Consumes an async reader to the end, delivering chunks to the flush handler.
    ///
    /// Same start, stop and error semantics as [`run`](Splitter::run). The
    /// flush handler is still called synchronously between reads. A configured
    /// rate limit does not apply to async runs.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use splitrs::{SplitConfig, Splitter};
    /// use tokio_util::compat::TokioAsyncReadCompatExt;
    ///
    /// let file = tokio::fs::File::open("events.log").await?;
    /// let splitter = Splitter::new(SplitConfig::new("\n")?);
    /// let report = splitter.run_async(file.compat()).await?;
    /// ```
    pub async fn run_async<R: AsyncRead + Unpin>(&self, reader: R) -> Result<RunReport> {
        self.begin()?;
        let _guard = AbandonGuard(self);
        if self.config().rate_limit().is_some() {
            log::debug!("rate limit is not applied to async runs");
        }

        let result = match AsyncValueScanner::new(
            reader,
            self.config().delimiter().clone(),
            self.config().value_max_scan_size(),
        ) {
            Ok(scanner) => self.drive_async(scanner).await,
            Err(e) => Err(e),
        };

        self.end(result)
    }

    async fn drive_async<R: AsyncRead + Unpin>(
        &self,
        mut scanner: AsyncValueScanner<R>,
    ) -> Result<RunReport> {
        let mut run = RunLoop::new(self);
        loop {
            if let Some(report) = run.check_stop() {
                return Ok(report);
            }
            let scan = scanner.next_value().await?;
            if let Some(report) = run.accept(scan) {
                return Ok(report);
            }
        }
    }
}

/// Finishes the run if the `run_async` future is dropped part way.
struct AbandonGuard<'s>(&'s Splitter);

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        self.0.abandon();
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    use futures_io::AsyncRead;

    use crate::{Chunk, RunState, RunStatus, SplitConfig, SplitError, Splitter};

    /// Never produces data.
    struct Stalled;

    impl AsyncRead for Stalled {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn test_run_async_matches_blocking_run() {
        let input = b"apple,banana,pear,peach,cherry";
        let collect = |out: Arc<Mutex<Vec<Chunk>>>| {
            SplitConfig::new(",")
                .unwrap()
                .with_chunk_size_limit(16)
                .with_flush_handler(move |c| out.lock().unwrap().push(c))
        };

        let sync_out = Arc::new(Mutex::new(Vec::new()));
        Splitter::new(collect(Arc::clone(&sync_out)))
            .run(&input[..])
            .unwrap();

        let async_out = Arc::new(Mutex::new(Vec::new()));
        let report = Splitter::new(collect(Arc::clone(&async_out)))
            .run_async(&input[..])
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(*sync_out.lock().unwrap(), *async_out.lock().unwrap());
    }

    #[tokio::test]
    async fn test_run_async_once() {
        let splitter = Splitter::new(SplitConfig::new(",").unwrap().with_flush_handler(|_| {}));
        splitter.run_async(&b"a"[..]).await.unwrap();
        let err = splitter.run_async(&b"b"[..]).await.unwrap_err();
        assert!(matches!(err, SplitError::AlreadyStarted));
    }

    #[tokio::test]
    async fn test_run_async_stopped() {
        let splitter = Splitter::new(SplitConfig::new(",").unwrap().with_flush_handler(|_| {}));
        splitter.request_stop();
        let report = splitter.run_async(&b"a,b"[..]).await.unwrap();
        assert_eq!(report.status, RunStatus::Stopped);
        assert_eq!(report.chunks, 0);
    }

    #[test]
    fn test_dropped_run_is_finished() {
        let splitter = Splitter::new(SplitConfig::new(",").unwrap().with_flush_handler(|_| {}));
        {
            let mut run = tokio_test::task::spawn(splitter.run_async(Stalled));
            assert!(run.poll().is_pending());
            assert_eq!(splitter.state(), RunState::Running);
        }
        assert_eq!(splitter.state(), RunState::Finished);

        let err = tokio_test::block_on(splitter.run_async(&b"a"[..])).unwrap_err();
        assert!(matches!(err, SplitError::AlreadyStarted));
    }
}
