use std::fmt;

use uuid::Uuid;

/// Who a request is counted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// A caller with a verified identity.
    User(Uuid),
    /// An anonymous caller, keyed by client address.
    Ip(String),
}

impl Identifier {
    pub fn unknown_ip() -> Self {
        Identifier::Ip("unknown".to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::User(id) => write!(f, "user:{id}"),
            Identifier::Ip(addr) => write!(f, "ip:{addr}"),
        }
    }
}

/// Counter key for an identifier hitting a path.
pub fn counter_key(identifier: &Identifier, path: &str) -> String {
    format!("{identifier}:{path}")
}
