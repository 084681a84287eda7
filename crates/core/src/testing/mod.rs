//! Testing utilities and mock implementations.
//!
//! Mocks for every seam of the station (verifier, QR decoder, camera), so
//! the full scan → verify → present cycle can be tested without a backend
//! or a camera.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketgate_core::testing::{fixtures, MockCameraDevice, MockDecoder, MockVerifier};
//!
//! let verifier = Arc::new(MockVerifier::new());
//! let decoder = Arc::new(MockDecoder::new());
//! let camera = Arc::new(MockCameraDevice::new());
//!
//! verifier.push_response(ApiEnvelope::ok(fixtures::ticket_record("Jazz Night", 2))).await;
//! decoder.push_text("TKT-1");
//! camera.push_frame(fixtures::blank_png(8, 8));
//! ```

mod mock_camera;
mod mock_decoder;
mod mock_verifier;

pub use mock_camera::{MockCameraDevice, MockFrameSource};
pub use mock_decoder::MockDecoder;
pub use mock_verifier::{MockVerifier, RecordedVerification};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use image::{GrayImage, ImageFormat, Luma};
    use qrcode::{Color, QrCode};
    use serde_json::{json, Value};

    use crate::events::{EventImage, PublicEvent};
    use crate::verification::{EventDetails, LeadUser, TicketRecord};

    /// Pixels per QR module in generated images.
    const MODULE_PX: u32 = 8;
    /// Quiet zone around generated codes, in modules.
    const QUIET_ZONE: u32 = 4;

    /// Create a ticket record with reasonable defaults.
    pub fn ticket_record(title: &str, quantity: i64) -> TicketRecord {
        TicketRecord {
            event: EventDetails {
                title: title.to_string(),
                location: "Blue Hall".to_string(),
                start_date: "2026-11-02T19:00:00Z".to_string(),
                end_date: Some("2026-11-02T23:00:00Z".to_string()),
            },
            lead_user: LeadUser {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
            },
            ticket_quantity: quantity,
            booking_status: "confirmed".to_string(),
        }
    }

    /// Backend JSON for a successful verification of `record`.
    pub fn success_body(record: &TicketRecord) -> Value {
        json!({
            "success": true,
            "message": "Ticket verified",
            "data": record,
        })
    }

    /// Backend JSON for a rejection.
    pub fn rejection_body(message: &str) -> Value {
        json!({
            "success": false,
            "message": message,
        })
    }

    /// Create a public event listing entry.
    pub fn public_event(id: i64, title: &str) -> PublicEvent {
        PublicEvent {
            id,
            title: title.to_string(),
            description: Some(format!("{} live", title)),
            location: "Blue Hall".to_string(),
            start_date: "2026-11-02T19:00:00Z".to_string(),
            end_date: None,
            event_price: Some("25.00".to_string()),
            images: vec![EventImage {
                url: format!("https://cdn.example.com/events/{}.jpg", id),
            }],
        }
    }

    /// PNG of a QR code encoding `text`.
    ///
    /// # Panics
    ///
    /// Panics if `text` does not fit in a QR code.
    pub fn qr_png(text: &str) -> Vec<u8> {
        let code = QrCode::new(text.as_bytes()).expect("payload fits in a QR code");
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;

        let image = GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / MODULE_PX) as i64 - QUIET_ZONE as i64;
            let my = (y / MODULE_PX) as i64 - QUIET_ZONE as i64;
            let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
            let dark =
                inside && colors[(my as u32 * modules + mx as u32) as usize] == Color::Dark;
            Luma([if dark { 0 } else { 255 }])
        });

        encode_png(&image)
    }

    /// PNG of a plain white image with no code in it.
    pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&GrayImage::from_pixel(width, height, Luma([255])))
    }

    fn encode_png(image: &GrayImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("in-memory PNG encoding");
        bytes.into_inner()
    }
}
