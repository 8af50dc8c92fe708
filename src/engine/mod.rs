pub mod core;
pub mod poller;
pub mod viewport;

pub use core::ChartOrchestrator;
pub use poller::{Poller, PollerHandle};
pub use viewport::ViewportTracker;
