//! Image decoding and PNG encoding.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::CodecError;
use crate::icon_matte::alpha_channel::PixelBuffer;

/// Decodes any format supported by the enabled `image` features into RGBA8
///
/// # Errors
///
/// * `CodecError::Decode` - When the format is unknown or the data is corrupt
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|err| CodecError::Decode(err.to_string()))?;
    Ok(decoded.to_rgba8())
}

/// Encodes the buffer as a lossless PNG
///
/// # Errors
///
/// * `CodecError::Encode` - When the PNG encoder fails
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|err| CodecError::Encode(err.to_string()))?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_round_trip_is_exact() {
        let image = PixelBuffer::from_fn(7, 5, |x, y| {
            Rgba([(x * 30) as u8, (y * 40) as u8, 90, (x * 36 + y) as u8])
        });

        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode(&bytes).unwrap(), image);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(decode(&[]).is_err());
    }
}
