//! Execution-layer observability for the confab engine.
//!
//! Bridges the engine's `tracing` events to the webview channel and to the
//! test suite that enforces the lifecycle logging contract.

mod lifecycle_layer;

pub use lifecycle_layer::{LifecycleEvent, LifecycleEventLayer, forward_to_webview};
