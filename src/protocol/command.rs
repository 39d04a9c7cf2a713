//! Command definitions
//!
//! An outgoing ServerQuery command: a verb and an ordered parameter list.
//! Values are stored raw and escaped only when the wire text is produced.

use std::fmt;

use super::escape::encode;

/// Where a command is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Runs against the selected virtual server
    VirtualServer,

    /// Instance-wide (e.g. `serverlist`, `serverstart`)
    Global,
}

/// A command ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    params: Vec<(String, String)>,
    scope: Scope,
}

impl Command {
    /// Command against the selected virtual server
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            params: Vec::new(),
            scope: Scope::VirtualServer,
        }
    }

    /// Instance-wide command
    pub fn global(verb: impl Into<String>) -> Self {
        Self {
            scope: Scope::Global,
            ..Self::new(verb)
        }
    }

    /// Append a parameter; order is preserved on the wire
    pub fn param(mut self, key: &str, value: impl ParamValue) -> Self {
        self.params.push((key.to_string(), value.to_param()));
        self
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Raw (unescaped) parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Wire text: `verb k1=v1 k2=v2\n` with every value escaped once
    pub fn to_wire(&self) -> String {
        let mut line = self.verb.clone();
        for (key, value) in &self.params {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(&encode(value));
        }
        line.push('\n');
        line
    }
}

impl fmt::Display for Command {
    /// Log-friendly form; `client_login_password` is masked
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb)?;
        for (key, value) in &self.params {
            if key == "client_login_password" {
                write!(f, " {}=***", key)?;
            } else {
                write!(f, " {}={}", key, encode(value))?;
            }
        }
        Ok(())
    }
}

/// Values that can be passed as a command parameter
pub trait ParamValue {
    fn to_param(&self) -> String;
}

impl ParamValue for bool {
    fn to_param(&self) -> String {
        (if *self { "1" } else { "0" }).to_string()
    }
}

impl ParamValue for &str {
    fn to_param(&self) -> String {
        (*self).to_string()
    }
}

impl ParamValue for String {
    fn to_param(&self) -> String {
        self.clone()
    }
}

impl ParamValue for &String {
    fn to_param(&self) -> String {
        (*self).clone()
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl ParamValue for $t {
            fn to_param(&self) -> String {
                self.to_string()
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32, u64, usize);
