pub mod controller;
pub mod events;
pub mod hub;
pub mod state;

pub use controller::MonitorController;
pub use events::MonitorEvent;
pub use hub::FusionHub;
pub use state::{MonitorState, MonitorStatus};
