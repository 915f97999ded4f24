//! Flutter-facing bindings for Flowboard core.

pub mod api;
