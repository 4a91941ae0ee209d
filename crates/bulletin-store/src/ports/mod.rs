//! Port traits: the inbound delivery/query API and the outbound
//! ordered-KV and clock dependencies.

pub mod inbound;
pub mod outbound;
