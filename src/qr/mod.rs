//! QR image rendering for certificate verification links.
//!
//! Codes are encoded at error-correction level M and drawn module by module
//! into an RGBA buffer so the quiet zone and colours follow `QrConfig`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageBuffer, ImageFormat, Rgba};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

use crate::config::QrConfig;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum QrError {
    #[error("failed to encode QR payload: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid colour '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("not a PNG data URL")]
    InvalidDataUrl,

    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Public link printed inside every QR code
pub fn verification_url(origin: &str, id: Uuid) -> String {
    format!("{}/verify/{}", origin.trim_end_matches('/'), id)
}

/// Render `payload` as PNG bytes
pub fn render_png(payload: &str, config: &QrConfig) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)?;
    let dark = parse_hex_color(&config.dark_color)?;
    let light = parse_hex_color(&config.light_color)?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let total = modules + config.margin * 2;
    let scale = (config.size / total).max(1);
    let dimension = total * scale;

    let image = ImageBuffer::from_fn(dimension, dimension, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        if mx < config.margin || my < config.margin {
            return light;
        }
        let (mx, my) = (mx - config.margin, my - config.margin);
        if mx >= modules || my >= modules {
            return light;
        }
        match colors[(my * modules + mx) as usize] {
            Color::Dark => dark,
            Color::Light => light,
        }
    });

    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Render `payload` as a `data:image/png;base64,` URL
pub fn render_data_url(payload: &str, config: &QrConfig) -> Result<String, QrError> {
    let png = render_png(payload, config)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
}

pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, QrError> {
    let encoded = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or(QrError::InvalidDataUrl)?;
    Ok(STANDARD.decode(encoded)?)
}

/// Parses `#RRGGBB` or `#RRGGBBAA`
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, QrError> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || QrError::InvalidColor(value.to_string());

    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colours() {
        assert_eq!(parse_hex_color("#000000").unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_color("ffffff").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("#11223380").unwrap(), Rgba([0x11, 0x22, 0x33, 0x80]));
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
    }

    #[test]
    fn verification_url_uses_origin() {
        let id = Uuid::new_v4();
        assert_eq!(
            verification_url("https://verify.example.com/", id),
            format!("https://verify.example.com/verify/{}", id)
        );
    }

    #[test]
    fn renders_png_near_target_size() {
        let config = QrConfig::default();
        let png = render_png("http://localhost:3000/verify/abc", &config).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let image = image::load_from_memory(&png).unwrap();
        assert_eq!(image.width(), image.height());
        assert!(image.width() <= config.size);
        assert!(image.width() > config.size / 2);
    }

    #[test]
    fn data_url_round_trips_to_png() {
        let config = QrConfig::default();
        let url = render_data_url("hello", &config).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        let png = decode_data_url(&url).unwrap();
        assert_eq!(png, render_png("hello", &config).unwrap());
        assert!(decode_data_url("data:text/plain;base64,aGk=").is_err());
    }

    #[test]
    fn quiet_zone_is_light() {
        let config = QrConfig::default();
        let png = render_png("margin", &config).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(*image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }
}
