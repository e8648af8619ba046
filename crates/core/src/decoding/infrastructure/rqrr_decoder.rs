use rqrr::PreparedImage;

use crate::decoding::domain::code_decoder::{
    CodeDecoder, DecodeError, DecodeOptions, DecodedPayload,
};
use crate::shared::frame::Frame;
use crate::shared::quad::{BoundingQuad, Point};

/// QR decoding backed by the pure-Rust `rqrr` crate.
///
/// The frame is reduced to luma once; each polarity requested by the
/// inversion mode gets its own prepared image. The first grid that decodes
/// wins.
#[derive(Debug, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

fn try_decode(luma: &[u8], w: usize, h: usize, inverted: bool) -> Option<DecodedPayload> {
    let mut img = PreparedImage::prepare_from_greyscale(w, h, |x, y| {
        let v = luma[y * w + x];
        if inverted {
            255 - v
        } else {
            v
        }
    });

    img.detect_grids().into_iter().find_map(|grid| {
        let quad = BoundingQuad::new(grid.bounds.map(|p| Point::new(p.x, p.y)));
        match grid.decode() {
            Ok((_meta, text)) => Some(DecodedPayload {
                text,
                quad: Some(quad),
            }),
            Err(e) => {
                log::trace!("Grid found but not decodable: {e:?}");
                None
            }
        }
    })
}

impl CodeDecoder for RqrrDecoder {
    fn decode(
        &self,
        frame: &Frame,
        options: &DecodeOptions,
    ) -> Result<Option<DecodedPayload>, DecodeError> {
        if !frame.is_well_formed() {
            return Err(DecodeError::MalformedFrame(format!(
                "{}x{}x{} with {} bytes",
                frame.width(),
                frame.height(),
                frame.channels(),
                frame.data().len()
            )));
        }

        let luma = frame.to_luma();
        let (w, h) = (frame.width() as usize, frame.height() as usize);

        Ok(options
            .inversion
            .polarities()
            .iter()
            .find_map(|&inverted| try_decode(&luma, w, h, inverted)))
    }
}
