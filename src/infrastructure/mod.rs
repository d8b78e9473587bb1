// Infrastructure module - External collaborators
pub mod capture;
pub mod config;
pub mod logging;
pub mod serial;
