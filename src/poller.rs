// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fixed-interval refresh tied to the lifetime of a handle.
//!
//! The first tick runs immediately, then once per interval. Ticking stops when
//! the tick returns [`ControlFlow::Break`], when [`PollHandle::cancel`] is
//! called, or when the handle is dropped.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};

pub struct PollHandle {
    name: String,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<u64>>,
}

/// Starts ticking on a background thread. `tick` receives the zero-based
/// tick number.
pub fn spawn<F>(name: &str, interval: Duration, mut tick: F) -> Result<PollHandle>
where
    F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let thread_name = format!("poll-{}", name);
    let thread = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let mut n = 0u64;
            loop {
                let flow = tick(n);
                n += 1;
                if flow.is_break() {
                    tracing::debug!(thread = %thread_name, ticks = n, "poll finished");
                    break;
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        tracing::debug!(thread = %thread_name, ticks = n, "poll cancelled");
                        break;
                    }
                }
            }
            n
        })
        .with_context(|| format!("Failed to start poller '{}'", name))?;

    Ok(PollHandle {
        name: name.to_string(),
        stop: Some(stop_tx),
        thread: Some(thread),
    })
}

impl PollHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Stops ticking and waits for an in-flight tick to return. Returns the
    /// number of ticks started.
    pub fn cancel(mut self) -> u64 {
        self.stop_and_join()
    }

    /// Blocks until the tick itself breaks the loop.
    pub fn wait(mut self) -> u64 {
        match self.thread.take() {
            Some(t) => t.join().unwrap_or_default(),
            None => 0,
        }
    }

    fn stop_and_join(&mut self) -> u64 {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        match self.thread.take() {
            Some(t) => t.join().unwrap_or_default(),
            None => 0,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    #[test]
    fn breaks_when_tick_says_so() {
        let h = spawn("break", Duration::from_millis(5), |n| {
            if n >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(h.wait(), 3);
    }

    #[test]
    fn cancel_stops_a_long_interval_promptly() {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let h = spawn("cancel", Duration::from_secs(60), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();
        while count.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        let started = Instant::now();
        h.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        {
            let _h = spawn("drop", Duration::from_millis(2), move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            })
            .unwrap();
            thread::sleep(Duration::from_millis(20));
        }
        let after_drop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
