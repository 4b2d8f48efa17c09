//! Setup progress tracking

/// One progress record of a setup run
#[derive(Debug, Clone, PartialEq)]
pub struct InstallProgress {
    pub step: String,
    pub progress: f32, // 0.0 to 1.0
    pub message: String,
    pub is_error: bool,
}

impl InstallProgress {
    pub fn new(step: impl Into<String>, progress: f32, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            is_error: false,
        }
    }

    /// Create error progress update
    pub fn error(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            progress: 0.0,
            message: message.into(),
            is_error: true,
        }
    }

    /// Create completion progress update
    pub fn complete(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            progress: 1.0,
            message: message.into(),
            is_error: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.is_error && self.progress >= 1.0
    }
}
