//! Span geometry for pole-to-pole measurements.
//!
//! Horizontal distances come from the haversine great-circle formula; the real
//! conductor path adds the altitude difference between the two supports.
//! Altitudes must be resolved by the caller (field survey or elevation
//! service) before [`span_metrics`] is called.

use crate::error::{LvError, LvResult};
use crate::units::{round_to, Meters};
use serde::{Deserialize, Serialize};

/// Mean Earth radius (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Horizontal span above which a span is flagged for review
pub const CRITICAL_SPAN: Meters = Meters(80.0);

/// WGS84 coordinate with optional altitude (m above sea level).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng, alt: None }
    }

    pub fn with_alt(mut self, alt: f64) -> Self {
        self.alt = Some(alt);
        self
    }
}

/// Length of the conductor path over a horizontal span with a height difference.
#[inline]
pub fn real_span_length(horizontal: Meters, vertical: Meters) -> Meters {
    Meters(horizontal.value().hypot(vertical.value()))
}

/// Unrounded haversine distance between two points.
pub fn great_circle_distance(p1: &GeoPoint, p2: &GeoPoint) -> Meters {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let d_phi = (p2.lat - p1.lat).to_radians();
    let d_lambda = (p2.lng - p1.lng).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Meters(EARTH_RADIUS_M * c)
}

/// Haversine distance rounded to centimetres.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> Meters {
    great_circle_distance(p1, p2).rounded(2)
}

/// Span lengths between two supports, rounded to centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanMetrics {
    pub horizontal: Meters,
    pub height_diff: Meters,
    pub real_span: Meters,
    /// Horizontal span longer than [`CRITICAL_SPAN`]
    pub is_critical_span: bool,
}

impl SpanMetrics {
    pub fn from_lengths(horizontal: Meters, height_diff: Meters) -> Self {
        let height_diff = height_diff.abs();
        Self {
            horizontal: horizontal.rounded(2),
            height_diff: height_diff.rounded(2),
            real_span: real_span_length(horizontal, height_diff).rounded(2),
            is_critical_span: horizontal > CRITICAL_SPAN,
        }
    }
}

/// Span metrics between two surveyed points; both need an altitude.
pub fn span_metrics(p1: &GeoPoint, p2: &GeoPoint) -> LvResult<SpanMetrics> {
    for point in [p1, p2] {
        if !point.lat.is_finite() || !point.lng.is_finite() {
            return Err(LvError::validation(format!(
                "coordinates must be finite (got {}, {})",
                point.lat, point.lng
            )));
        }
    }
    let (alt1, alt2) = match (p1.alt, p2.alt) {
        (Some(a1), Some(a2)) if a1.is_finite() && a2.is_finite() => (a1, a2),
        _ => {
            return Err(LvError::validation(
                "both span endpoints need a resolved altitude",
            ))
        }
    };

    let horizontal = great_circle_distance(p1, p2);
    Ok(SpanMetrics::from_lengths(horizontal, Meters(alt2 - alt1)))
}

/// Area (m²) of a small polygon, e.g. a substation plot or a city block.
///
/// Vertices are projected equirectangularly around the first vertex, scaling
/// longitude by the cosine of the mean latitude. Fewer than three vertices
/// give zero.
pub fn polygon_area(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let origin = points[0];
    let mean_lat = points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64;
    let lng_scale = EARTH_RADIUS_M * mean_lat.to_radians().cos();

    let projected: Vec<(f64, f64)> = points
        .iter()
        .map(|p| {
            let x = (p.lng - origin.lng).to_radians() * lng_scale;
            let y = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
            (x, y)
        })
        .collect();

    let twice_area: f64 = projected
        .iter()
        .zip(projected.iter().cycle().skip(1))
        .map(|((x1, y1), (x2, y2))| x1 * y2 - x2 * y1)
        .sum();

    round_to(twice_area.abs() / 2.0, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_span_pythagoras() {
        let real = real_span_length(Meters(3.0), Meters(4.0));
        assert!((real.value() - 5.0).abs() < 1e-12);

        let h = 50.0;
        let v = 5.5;
        let r = real_span_length(Meters(h), Meters(v)).value();
        assert!((r * r - (h * h + v * v)).abs() < 1e-9);

        assert_eq!(real_span_length(Meters::ZERO, Meters::ZERO), Meters::ZERO);
    }

    #[test]
    fn test_haversine_short_span() {
        let p1 = GeoPoint::new(-23.5878, -46.6590);
        let p2 = GeoPoint::new(-23.5878 + 0.00035, -46.6590 + 0.00015);
        let d = haversine_distance(&p1, &p2).value();
        assert!(d > 41.0 && d < 45.0, "distance was {}", d);

        // Rounded to two decimals
        assert!((d * 100.0 - (d * 100.0).round()).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::new(-23.5, -46.6);
        assert_eq!(haversine_distance(&p, &p), Meters::ZERO);
    }

    #[test]
    fn test_span_metrics() {
        let p1 = GeoPoint::new(-23.5878, -46.6590).with_alt(760.0);
        let p2 = GeoPoint::new(-23.5878 + 0.00035, -46.6590 + 0.00015).with_alt(754.5);

        let m = span_metrics(&p1, &p2).unwrap();
        assert!((m.height_diff.value() - 5.5).abs() < 1e-9);
        assert!(m.real_span > m.horizontal);
        assert!(!m.is_critical_span);
    }

    #[test]
    fn test_span_metrics_requires_altitude() {
        let p1 = GeoPoint::new(-23.5878, -46.6590).with_alt(760.0);
        let p2 = GeoPoint::new(-23.5875, -46.6589);
        let err = span_metrics(&p1, &p2).unwrap_err();
        assert!(matches!(err, LvError::Validation(_)));
    }

    #[test]
    fn test_critical_span_flag() {
        assert!(SpanMetrics::from_lengths(Meters(80.5), Meters(0.0)).is_critical_span);
        assert!(!SpanMetrics::from_lengths(Meters(80.0), Meters(0.0)).is_critical_span);

        let m = SpanMetrics::from_lengths(Meters(40.0), Meters(-1.234));
        assert_eq!(m.height_diff, Meters(1.23));
        assert_eq!(m.real_span, Meters(40.02));
    }

    #[test]
    fn test_polygon_area_square() {
        let d: f64 = 0.001;
        let square = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, d),
            GeoPoint::new(d, d),
            GeoPoint::new(d, 0.0),
        ];
        let side = d.to_radians() * EARTH_RADIUS_M;
        let area = polygon_area(&square);
        assert!((area - side * side).abs() < 0.1, "area was {}", area);
    }

    #[test]
    fn test_polygon_area_orientation_independent() {
        let triangle = [
            GeoPoint::new(-23.5878, -46.6590),
            GeoPoint::new(-23.5870, -46.6590),
            GeoPoint::new(-23.5878, -46.6580),
        ];
        let mut reversed = triangle;
        reversed.reverse();
        assert!((polygon_area(&triangle) - polygon_area(&reversed)).abs() < 0.011);
        assert!(polygon_area(&triangle) > 0.0);
    }

    #[test]
    fn test_polygon_degenerate() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(
            polygon_area(&[GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]),
            0.0
        );
    }
}
