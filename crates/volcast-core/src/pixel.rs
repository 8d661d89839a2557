//! Packed 32-bit RGBA pixels.
//!
//! Red lives in the low byte, alpha in the high byte, so a `u32` slice in
//! little-endian memory reads as RGBA8 bytes.

use glam::Vec4;

/// Packs a color with channels in `[0, 1]` into one `u32`.
///
/// Channels are clamped, then scaled to 255 and rounded to nearest.
#[must_use]
pub fn pack_rgba(color: Vec4) -> u32 {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0 + 0.5).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let [r, g, b, a] = [c.x as u32, c.y as u32, c.z as u32, c.w as u32];
    (a << 24) | (b << 16) | (g << 8) | r
}

/// Splits a packed pixel into `[r, g, b, a]` bytes.
#[must_use]
pub fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Expands packed pixels into an RGBA8 byte buffer.
#[must_use]
pub fn to_rgba_bytes(pixels: &[u32]) -> Vec<u8> {
    pixels.iter().flat_map(|p| unpack_rgba(*p)).collect()
}
