//! Transport abstraction
//!
//! The seam between the protocol core and the outside world. A transport
//! carries one command and returns its parsed reply; it never runs two
//! exchanges at once.

use crate::error::Result;
use crate::protocol::{Command, Response, Status};

/// Executes commands against a server
pub trait Transport {
    /// Send one command and wait for its complete reply
    ///
    /// `Err` means the exchange itself failed. A non-ok status is returned
    /// inside `Ok`.
    fn execute(&mut self, command: &Command) -> Result<Response>;

    /// Address subsequent commands to virtual server `sid`
    fn select_virtual_server(&mut self, sid: u64) -> Result<Status> {
        Ok(self.execute(&Command::new("use").param("sid", sid))?.status)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&mut self, command: &Command) -> Result<Response> {
        (**self).execute(command)
    }

    fn select_virtual_server(&mut self, sid: u64) -> Result<Status> {
        (**self).select_virtual_server(sid)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, command: &Command) -> Result<Response> {
        (**self).execute(command)
    }

    fn select_virtual_server(&mut self, sid: u64) -> Result<Status> {
        (**self).select_virtual_server(sid)
    }
}
