//! QR code rendering
//!
//! Codes are rendered as SVG and stored inline as a `data:` URI, so no media
//! host is involved in issuing one.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;

use crate::error::ApiError;

const DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Public viewer URL of an experience
pub fn public_url(base_url: &str, slug: &str) -> String {
    format!("{}/experience/{}", base_url.trim_end_matches('/'), slug)
}

/// Encode `content` as a QR code SVG `data:` URI
pub fn qr_data_uri(content: &str) -> Result<String, ApiError> {
    let code = QrCode::new(content.as_bytes())
        .map_err(|e| ApiError::Internal(format!("QR encoding failed: {e}")))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(image)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_cleanly() {
        assert_eq!(
            public_url("https://cx.example.com/", "glow-serum"),
            "https://cx.example.com/experience/glow-serum"
        );
    }

    #[test]
    fn test_qr_is_svg_data_uri() {
        let uri = qr_data_uri("https://cx.example.com/experience/glow").unwrap();
        let encoded = uri.strip_prefix(DATA_URI_PREFIX).unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_qr_is_deterministic() {
        assert_eq!(qr_data_uri("abc").unwrap(), qr_data_uri("abc").unwrap());
    }
}
