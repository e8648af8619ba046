/// A single captured frame: contiguous pixel bytes in row-major order.
///
/// `channels` is 1 (luma), 3 (RGB) or 4 (RGBA). Format conversion happens at
/// the capture boundary; the scan loop treats pixel data as opaque and only
/// asks for a luma view when handing the frame to a decoder.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when the buffer length matches the declared dimensions and
    /// there is at least one pixel.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && matches!(self.channels, 1 | 3 | 4)
            && self.data.len()
                == (self.width as usize) * (self.height as usize) * (self.channels as usize)
    }

    /// Returns one luma byte per pixel (BT.601 weights, alpha ignored).
    pub fn to_luma(&self) -> Vec<u8> {
        match self.channels {
            1 => self.data.clone(),
            c => self
                .data
                .chunks_exact(c as usize)
                .map(|px| {
                    let y = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                    (y / 1000) as u8
                })
                .collect(),
        }
    }
}
