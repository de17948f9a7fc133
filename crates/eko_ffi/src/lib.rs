//! Dashboard UI bindings over `eko_core`.

pub mod api;
