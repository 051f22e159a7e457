/// Preload-execution errors.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    #[error("preload action failed for target '{target}': {reason}")]
    ActionFailed { target: String, reason: String },
}
