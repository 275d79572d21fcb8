use serde::{Deserialize, Serialize};

/// A 2-D point in pixel coordinates. On the wire it is the bare `[x, y]`
/// pair recognition services emit for polygon corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// One detected text region.
///
/// The polygon corners arrive in the engine's documented order: top-left,
/// top-right, bottom-right, bottom-left. Callers that only need an
/// axis-aligned box read corners 0 and 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub polygon: [Point; 4],
    pub text: String,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_parses_service_payload() {
        let payload = r#"{
            "polygon": [[10.0, 20.0], [50.0, 20.0], [50.0, 70.0], [10.0, 70.0]],
            "text": "Invoice",
            "confidence": 0.97
        }"#;

        let detection: Detection = serde_json::from_str(payload).unwrap();
        assert_eq!(detection.polygon[0], Point { x: 10.0, y: 20.0 });
        assert_eq!(detection.polygon[2], Point { x: 50.0, y: 70.0 });
        assert_eq!(detection.text, "Invoice");
    }

    #[test]
    fn points_serialize_as_pairs() {
        let json = serde_json::to_string(&Point { x: 1.5, y: 2.0 }).unwrap();
        assert_eq!(json, "[1.5,2.0]");
    }
}
