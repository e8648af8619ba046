use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::quad::BoundingQuad;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("frame is not ready for decoding: {0}")]
    MalformedFrame(String),
}

/// Which luminance polarities the decoder tries.
///
/// Printed codes are dark-on-light; codes shown on screens or printed on dark
/// stock are often light-on-dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionMode {
    DontInvert,
    OnlyInvert,
    #[default]
    AttemptBoth,
    InvertFirst,
}

impl InversionMode {
    /// Polarities to try, in order. `true` means inverted.
    pub fn polarities(self) -> &'static [bool] {
        match self {
            InversionMode::DontInvert => &[false],
            InversionMode::OnlyInvert => &[true],
            InversionMode::AttemptBoth => &[false, true],
            InversionMode::InvertFirst => &[true, false],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub inversion: InversionMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub text: String,
    pub quad: Option<BoundingQuad>,
}

/// Domain interface for optical-code decoding.
///
/// A pure function of its inputs: implementations keep no state between
/// calls, hence `&self`.
pub trait CodeDecoder: Send {
    fn decode(
        &self,
        frame: &Frame,
        options: &DecodeOptions,
    ) -> Result<Option<DecodedPayload>, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::dont_invert(InversionMode::DontInvert, &[false])]
    #[case::only_invert(InversionMode::OnlyInvert, &[true])]
    #[case::attempt_both(InversionMode::AttemptBoth, &[false, true])]
    #[case::invert_first(InversionMode::InvertFirst, &[true, false])]
    fn test_polarity_order(#[case] mode: InversionMode, #[case] expected: &[bool]) {
        assert_eq!(mode.polarities(), expected);
    }

    #[test]
    fn test_default_attempts_both() {
        assert_eq!(DecodeOptions::default().inversion, InversionMode::AttemptBoth);
    }

    #[test]
    fn test_inversion_mode_serde_names() {
        let mode: InversionMode = serde_json::from_str("\"invert_first\"").unwrap();
        assert_eq!(mode, InversionMode::InvertFirst);
        assert_eq!(
            serde_json::to_string(&InversionMode::DontInvert).unwrap(),
            "\"dont_invert\""
        );
    }
}
