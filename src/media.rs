//! Server-side image recompression for slideshow and series uploads.

use image::codecs::jpeg::JpegEncoder;

/// Quality used when re-encoding uploads that only ever render as backdrop
/// or tile imagery.
const RECOMPRESS_QUALITY: u8 = 50;

/// Decode an uploaded image and re-encode it as a quality-reduced JPEG.
/// Alpha is dropped in the process. Fails on bytes that are not a decodable
/// image.
pub fn recompress(data: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(data)?;
    let rgb = decoded.to_rgb8();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, RECOMPRESS_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(out)
}

/// Object name for a recompressed upload: the original stem with the
/// extension the re-encoder actually produced.
pub fn recompressed_name(original: &str) -> String {
    let stem = original.rsplit_once('.').map(|(s, _)| s).unwrap_or(original);
    format!("{stem}.jpg")
}
