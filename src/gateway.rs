pub mod assets;
pub mod factory;
pub mod memory;
pub mod rest;

use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

// How the catalog reaches the ownership (asset) service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum GatewayVia {
    Rest,
    InMemory,
}

impl From<String> for GatewayVia {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "rest" => GatewayVia::Rest,
            _ => GatewayVia::InMemory,
        }
    }
}

impl Display for GatewayVia {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            GatewayVia::Rest => write!(f, "rest"),
            GatewayVia::InMemory => write!(f, "memory"),
        }
    }
}
