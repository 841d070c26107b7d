pub mod api;
pub mod logging;
pub mod sections;
pub mod workflow;
