//! QR code collaborator interface (§4.6): out of scope for the core data
//! plane, named only as an interface Create exposes. 300x300 monochrome PNG,
//! high error correction.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use urlshort_core::ApiError;

const QR_DIMENSION: u32 = 300;

pub fn render_png(short_url: &str) -> Result<Vec<u8>, ApiError> {
    let code = QrCode::with_error_correction_level(short_url, EcLevel::H).map_err(|e| {
        tracing::error!(error = %e, "qr encoding failed");
        ApiError::InternalServerError
    })?;

    let image = code
        .render::<Luma<u8>>()
        .max_dimensions(QR_DIMENSION, QR_DIMENSION)
        .build();

    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| {
            tracing::error!(error = %e, "qr png encoding failed");
            ApiError::InternalServerError
        })?;
    Ok(buf)
}
