use std::time::Instant;

use crate::shared::quad::BoundingQuad;

/// One successful decode, produced by the scan loop and consumed by dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanEvent {
    pub payload: String,
    pub timestamp: Instant,
    pub bounding_quad: Option<BoundingQuad>,
}

impl ScanEvent {
    pub fn new(payload: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            payload: payload.into(),
            timestamp,
            bounding_quad: None,
        }
    }

    pub fn with_quad(mut self, quad: Option<BoundingQuad>) -> Self {
        self.bounding_quad = quad;
        self
    }
}
