//! Keep-alive
//!
//! The server drops query sessions that stay idle for a few minutes. A
//! background thread sends `version` on a fixed interval to keep the session
//! open. It goes through a [`SharedTransport`], so it never interleaves with
//! the caller's own commands.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{bounded, tick, Sender};

use crate::protocol::Command;
use super::{SharedTransport, Transport};

/// Handle to a running keep-alive thread; stops it on drop
pub struct KeepAlive {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl KeepAlive {
    /// Start pinging through `transport` every `interval`
    ///
    /// The thread exits on its own after the first transport fault.
    pub fn spawn<T>(transport: SharedTransport<T>, interval: Duration) -> Self
    where
        T: Transport + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let mut transport = transport;

        let handle = std::thread::spawn(move || {
            let ticker = tick(interval);
            let ping = Command::global("version");

            loop {
                crossbeam::select! {
                    recv(ticker) -> _ => match transport.execute(&ping) {
                        Ok(response) if !response.is_success() => {
                            tracing::warn!("Keep-alive answered with {}", response.status);
                        }
                        Ok(_) => tracing::trace!("Keep-alive sent"),
                        Err(e) => {
                            tracing::warn!("Keep-alive stopped: {}", e);
                            break;
                        }
                    },
                    recv(shutdown_rx) -> _ => break,
                }
            }
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown_inner();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    fn shutdown_inner(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // Receiver is gone if the thread already exited
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Keep-alive thread panicked");
            }
        }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
