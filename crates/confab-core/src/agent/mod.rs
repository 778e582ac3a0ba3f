//! Agent domain module.
//!
//! # Module Structure
//!
//! - `mode`: Agent operating modes (`AgentMode`)
//! - `handle`: Live agent handle (`Agent`)
//! - `observer`: Message-update observer registration
//! - `settings`: Provider settings (`AgentSettings`)
//! - `manager`: Agent lifecycle management (`AgentManager`)

mod handle;
mod manager;
mod mode;
mod observer;
mod settings;

pub use handle::Agent;
pub use manager::{AgentManager, AgentManagerConfig};
pub use mode::AgentMode;
pub use observer::MessageUpdateObserver;
pub use settings::AgentSettings;
