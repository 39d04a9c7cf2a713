//! Shared transport
//!
//! Lets several threads use one connection. The lock is held for the whole
//! command/response exchange, so replies can never be interleaved.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::protocol::{Command, Response, Status};
use super::Transport;

/// Cloneable handle to a transport guarded by a mutex
pub struct SharedTransport<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedTransport<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedTransport<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// Exclusive access for a sequence of exchanges
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Recover the transport once every other handle has been dropped
    pub fn try_into_inner(self) -> std::result::Result<T, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<T: Transport> Transport for SharedTransport<T> {
    fn execute(&mut self, command: &Command) -> Result<Response> {
        self.inner.lock().execute(command)
    }

    fn select_virtual_server(&mut self, sid: u64) -> Result<Status> {
        self.inner.lock().select_virtual_server(sid)
    }
}
