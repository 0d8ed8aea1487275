//! Error taxonomy for the audio subsystem.

use thiserror::Error;

/// Failures raised by tone playback, metronome control and microphone capture.
///
/// Only [`AudioError::PermissionDenied`] and [`AudioError::DeviceAbsent`] are
/// expected during normal use; both leave the session idle so the user can retry.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output capability in this environment. Callers skip playback.
    #[error("no audio output device is available")]
    AudioUnavailable,

    /// The platform refused access to the microphone.
    #[error("microphone access was denied: {0}")]
    PermissionDenied(String),

    /// No capture device could be found or opened.
    #[error("no microphone available: {0}")]
    DeviceAbsent(String),

    /// `stop()` was requested while no recording was in progress.
    #[error("no recording in progress")]
    NotRecording,

    #[error("tempo {0} BPM is outside the supported range of 60-180 BPM")]
    TempoOutOfRange(u16),

    #[error("failed to encode clip: {0}")]
    Encode(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Returns true for failures the user can fix and retry (microphone access).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::DeviceAbsent(_))
    }

    /// Short message suitable for an in-UI banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(_) => {
                "Microphone is not active. Allow microphone access and try again.".to_string()
            }
            Self::DeviceAbsent(_) => {
                "No microphone found. Connect an input device and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microphone_failures_are_retryable() {
        assert!(AudioError::PermissionDenied("denied".into()).is_retryable());
        assert!(AudioError::DeviceAbsent("none".into()).is_retryable());
        assert!(!AudioError::NotRecording.is_retryable());
        assert!(!AudioError::AudioUnavailable.is_retryable());
    }

    #[test]
    fn test_user_message_hides_backend_detail() {
        let msg = AudioError::PermissionDenied("ALSA: EACCES".into()).user_message();
        assert!(msg.contains("Microphone"));
        assert!(!msg.contains("EACCES"));
    }
}
