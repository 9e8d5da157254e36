//! Handwriting/OCR support.
//!
//! An [`OcrEngine`] turns an image into unordered [`Detection`]s; the
//! [`lines`] module puts them back into reading order.

pub mod lines;
mod remote;

pub use lines::{DEFAULT_HEIGHT_MULTIPLIER, Line, cluster, render};
pub use remote::RemoteOcrEngine;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in image coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// One recognised text fragment.
///
/// Deserializes from the `[quad, text, confidence]` triples an EasyOCR
/// style recognizer emits. Corners run clockwise from the top-left.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDetection")]
pub struct Detection {
    pub quad: [Point; 4],
    pub text: String,
    pub confidence: f64,
}

#[derive(Deserialize)]
struct RawDetection([Point; 4], String, f64);

impl From<RawDetection> for Detection {
    fn from(RawDetection(quad, text, confidence): RawDetection) -> Self {
        Self {
            quad,
            text,
            confidence,
        }
    }
}

impl Detection {
    pub fn new(quad: [Point; 4], text: impl Into<String>, confidence: f64) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// An upright rectangle spanning `left..right` and `top..bottom`.
    pub fn rect(left: f64, top: f64, right: f64, bottom: f64, text: impl Into<String>) -> Self {
        Self::new(
            [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            1.0,
        )
    }

    pub fn top_left(&self) -> Point {
        self.quad[0]
    }

    pub fn bottom_right(&self) -> Point {
        self.quad[2]
    }

    /// Vertical midpoint of the top-left/bottom-right diagonal.
    pub fn y_center(&self) -> f64 {
        (self.top_left().y + self.bottom_right().y) / 2.0
    }

    /// Height measured along the same diagonal.
    pub fn height(&self) -> f64 {
        (self.top_left().y - self.bottom_right().y).abs()
    }

    /// Horizontal sort key: the top-left x coordinate.
    pub fn x_position(&self) -> f64 {
        self.top_left().x
    }
}

/// OCR engine failures.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("engine answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl OcrError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// External text recognizer.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Detect text in an encoded image. No ordering is guaranteed.
    async fn detect(&self, image: Bytes) -> Result<Vec<Detection>, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_from_easyocr_triple() {
        let json = r#"[[[10, 20], [90, 20], [90, 40.5], [10, 40.5]], "Hello", 0.93]"#;
        let det: Detection = serde_json::from_str(json).unwrap();

        assert_eq!(det.text, "Hello");
        assert_eq!(det.top_left(), Point::new(10.0, 20.0));
        assert_eq!(det.bottom_right(), Point::new(90.0, 40.5));
        assert!((det.confidence - 0.93).abs() < f64::EPSILON);
    }

    #[test]
    fn geometry_uses_diagonal_corners() {
        // Slanted quad: only corners 0 and 2 count.
        let det = Detection::new(
            [
                Point::new(5.0, 12.0),
                Point::new(50.0, 2.0),
                Point::new(52.0, 8.0),
                Point::new(7.0, 30.0),
            ],
            "word",
            0.5,
        );
        assert_eq!(det.y_center(), 10.0);
        assert_eq!(det.height(), 4.0);
        assert_eq!(det.x_position(), 5.0);
    }

    #[test]
    fn short_quad_is_rejected() {
        let json = r#"[[[0, 0], [1, 0], [1, 1]], "x", 1.0]"#;
        assert!(serde_json::from_str::<Detection>(json).is_err());
    }
}
