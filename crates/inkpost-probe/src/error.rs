//! Error types for inkpost-probe

use inkpost_common::ImageKind;

/// Reasons a byte buffer is rejected by [`crate::inspect`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No known magic number at the start of the buffer
    #[error("unrecognized image signature ({len} bytes)")]
    UnknownSignature {
        /// Length of the inspected buffer
        len: usize,
    },

    /// Signature matched but the trailer check failed
    #[error("{kind} image is truncated or corrupt ({len} bytes)")]
    Corrupt {
        /// Kind detected from the signature
        kind: ImageKind,
        /// Length of the inspected buffer
        len: usize,
    },
}

impl From<ProbeError> for inkpost_common::Error {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::UnknownSignature { .. } => {
                inkpost_common::Error::UnsupportedFormat(err.to_string())
            }
            ProbeError::Corrupt { .. } => inkpost_common::Error::CorruptFile(err.to_string()),
        }
    }
}
