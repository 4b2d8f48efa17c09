//! Core setup structures: the run context and its progress journal

mod context;
mod progress;

pub use context::SetupContext;
pub use progress::InstallProgress;
