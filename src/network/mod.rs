//! Network Module
//!
//! Node configuration, JSON-RPC access and the gateway used for balance
//! queries and sends.

mod config;
mod gateway;
mod rpc;

pub use config::*;
pub use gateway::*;
pub use rpc::*;
