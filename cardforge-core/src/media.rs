//! Media sniffing for uploaded assets
//!
//! "Animated" means an image format that plays multiple frames. Video and
//! audio are never animated here. Detection runs once, when an asset is
//! attached, and the result is cached as the `animated` binding tag.

use std::io::Cursor;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;

/// Image mimetypes that always denote an animation
const ANIMATED_MIMETYPES: &[&str] = &["image/apng"];

fn normalize_mimetype(mimetype: &str) -> String {
    mimetype
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether the mimetype alone marks the media as animated
pub fn is_animated_mimetype(mimetype: &str) -> bool {
    ANIMATED_MIMETYPES.contains(&normalize_mimetype(mimetype).as_str())
}

/// Decide whether `bytes` of the declared `mimetype` are an animated image
///
/// Bytes the decoder rejects are never animated.
pub fn is_animated(mimetype: &str, bytes: &[u8]) -> bool {
    match normalize_mimetype(mimetype).as_str() {
        "image/gif" => decoded_gif_frames(bytes, 2) > 1,
        "image/png" | "image/apng" => PngDecoder::new(Cursor::new(bytes))
            .and_then(|decoder| decoder.is_apng())
            .unwrap_or(false),
        "image/webp" => WebPDecoder::new(Cursor::new(bytes))
            .map(|decoder| decoder.has_animation())
            .unwrap_or(false),
        _ => false,
    }
}

/// Guess an image mimetype from the file header
pub fn sniff_mimetype(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Decode up to `limit` frames, stopping at the first one that fails
fn decoded_gif_frames(bytes: &[u8], limit: usize) -> usize {
    match GifDecoder::new(Cursor::new(bytes)) {
        Ok(decoder) => decoder
            .into_frames()
            .take(limit)
            .take_while(Result::is_ok)
            .count(),
        Err(_) => 0,
    }
}

/// Count the frames of a GIF stream
///
/// A truncated stream counts the frames decoded before the data ends.
pub fn gif_frame_count(bytes: &[u8]) -> usize {
    decoded_gif_frames(bytes, usize::MAX)
}
