//! Pixel data representations.
//!
//! Pixels travel on the wire as packed RGB triplets. Applications may also
//! work with one `u32` per pixel laid out as `0x00RRGGBB`.

use bytes::{BufMut, Bytes, BytesMut};

/// Bytes per pixel on the wire (red, green, blue).
pub const BYTES_PER_PIXEL: usize = 3;

/// Which representation the dispatcher hands to the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataFormat {
    /// Packed RGB bytes, passed through unchanged.
    #[default]
    Buffer,
    /// One `0x00RRGGBB` integer per pixel.
    IntArray,
}

/// Pixel colors in either representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    Buffer(Bytes),
    IntArray(Vec<u32>),
}

impl PixelData {
    /// Number of whole pixels held.
    pub fn pixel_count(&self) -> usize {
        match self {
            PixelData::Buffer(buf) => buf.len() / BYTES_PER_PIXEL,
            PixelData::IntArray(pixels) => pixels.len(),
        }
    }

    /// Wire size of the pixel payload in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            PixelData::Buffer(buf) => buf.len(),
            PixelData::IntArray(pixels) => pixels.len() * BYTES_PER_PIXEL,
        }
    }

    /// Packed RGB bytes. A buffer is returned as-is (cheap clone).
    pub fn to_bytes(&self) -> Bytes {
        match self {
            PixelData::Buffer(buf) => buf.clone(),
            PixelData::IntArray(pixels) => to_buffer(pixels).freeze(),
        }
    }

    /// One integer per pixel. Trailing bytes of a buffer are ignored.
    pub fn to_ints(&self) -> Vec<u32> {
        match self {
            PixelData::Buffer(buf) => to_int_array(buf),
            PixelData::IntArray(pixels) => pixels.clone(),
        }
    }

    /// Convert into the requested representation.
    pub fn into_format(self, format: DataFormat) -> PixelData {
        match (self, format) {
            (PixelData::Buffer(buf), DataFormat::IntArray) => {
                PixelData::IntArray(to_int_array(&buf))
            }
            (PixelData::IntArray(pixels), DataFormat::Buffer) => {
                PixelData::Buffer(to_buffer(&pixels).freeze())
            }
            (same, _) => same,
        }
    }
}

impl From<Bytes> for PixelData {
    fn from(buf: Bytes) -> Self {
        PixelData::Buffer(buf)
    }
}

impl From<Vec<u8>> for PixelData {
    fn from(buf: Vec<u8>) -> Self {
        PixelData::Buffer(Bytes::from(buf))
    }
}

impl From<Vec<u32>> for PixelData {
    fn from(pixels: Vec<u32>) -> Self {
        PixelData::IntArray(pixels)
    }
}

/// Pack one pixel as `0x00RRGGBB`.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Split a `0x00RRGGBB` pixel into its components. The high byte is ignored.
pub fn unpack_rgb(pixel: u32) -> (u8, u8, u8) {
    ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

/// Serialize integer pixels into packed RGB bytes (3 per pixel).
pub fn to_buffer(pixels: &[u32]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(pixels.len() * BYTES_PER_PIXEL);
    for &pixel in pixels {
        let (r, g, b) = unpack_rgb(pixel);
        buf.put_u8(r);
        buf.put_u8(g);
        buf.put_u8(b);
    }
    buf
}

/// Parse packed RGB bytes into integer pixels.
///
/// Output length is `bytes.len() / 3`; one or two trailing bytes are dropped.
pub fn to_int_array(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|rgb| pack_rgb(rgb[0], rgb[1], rgb[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_buffer_emits_rgb_order() {
        let buf = to_buffer(&[0x0000FF, 0x00FF00, 0x123456]);
        assert_eq!(
            buf.as_ref(),
            &[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x12, 0x34, 0x56]
        );
    }

    #[test]
    fn to_buffer_ignores_high_byte() {
        let buf = to_buffer(&[0xAB10_2030]);
        assert_eq!(buf.as_ref(), &[0x10, 0x20, 0x30]);
    }

    #[test]
    fn to_int_array_combines_triplets() {
        let pixels = to_int_array(&[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00]);
        assert_eq!(pixels, vec![0x0000FF, 0x00FF00]);
    }

    #[test]
    fn to_int_array_truncates_trailing_bytes() {
        assert_eq!(to_int_array(&[1, 2, 3, 4]), vec![0x010203]);
        assert_eq!(to_int_array(&[1, 2, 3, 4, 5]), vec![0x010203]);
        assert!(to_int_array(&[9, 9]).is_empty());
        assert!(to_int_array(&[]).is_empty());
    }

    #[test]
    fn int_array_survives_buffer_conversion() {
        let pixels: Vec<u32> = (0..512u32).map(|i| (i * 0x010203) & 0x00FF_FFFF).collect();
        assert_eq!(to_int_array(&to_buffer(&pixels)), pixels);
    }

    #[test]
    fn pack_and_unpack() {
        assert_eq!(pack_rgb(0x12, 0x34, 0x56), 0x123456);
        assert_eq!(unpack_rgb(0xFF12_3456), (0x12, 0x34, 0x56));
    }

    #[test]
    fn pixel_data_conversions() {
        let data = PixelData::from(vec![0x0000FFu32, 0x00FF00]);
        assert_eq!(data.pixel_count(), 2);
        assert_eq!(data.byte_len(), 6);
        assert_eq!(data.to_bytes().as_ref(), &[0, 0, 0xFF, 0, 0xFF, 0]);

        let buffer = data.clone().into_format(DataFormat::Buffer);
        assert!(matches!(buffer, PixelData::Buffer(_)));
        assert_eq!(buffer.into_format(DataFormat::IntArray), data);
    }

    #[test]
    fn pixel_count_of_ragged_buffer() {
        let data = PixelData::from(vec![1u8, 2, 3, 4]);
        assert_eq!(data.pixel_count(), 1);
        assert_eq!(data.byte_len(), 4);
        assert_eq!(data.to_ints(), vec![0x010203]);
    }
}
