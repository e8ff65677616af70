//! Bounding box, volume and surface area of a triangle soup.
//!
//! Both analyzer modes go through [`MetricsAccumulator::fold`]: the buffered
//! path iterates a slice of triangles, the streaming path feeds one decoded
//! record at a time. The accumulator never keeps a triangle around.

use nalgebra::Vector3;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{AnalysisError, Triangle};

/// Per-axis extent (max - min) of a mesh in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct BoundingBox {
    #[schema(example = 10.0)]
    pub x: f64,
    #[schema(example = 10.0)]
    pub y: f64,
    #[schema(example = 10.0)]
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMetrics {
    pub bounding_box: BoundingBox,
    pub volume_mm3: f64,
    pub surface_area_mm2: f64,
    pub triangle_count: u64,
}

impl GeometryMetrics {
    /// Rejects meshes that parsed fine but cannot be printed: no triangles or
    /// no enclosed volume.
    pub fn check_printable(&self) -> Result<(), AnalysisError> {
        if self.triangle_count == 0 {
            return Err(AnalysisError::invalid_mesh("model contains no triangles"));
        }
        if self.volume_mm3.is_nan() || self.volume_mm3 <= 0.0 {
            return Err(AnalysisError::invalid_mesh("model has no enclosed volume"));
        }

        Ok(())
    }
}

/// Kahan compensated running sum.
#[derive(Debug, Clone, Copy, Default)]
struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    #[inline]
    fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    min: Vector3<f64>,
    max: Vector3<f64>,
    signed_volume: KahanSum,
    area: KahanSum,
    triangles: u64,
}

impl Default for MetricsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self {
            min: Vector3::repeat(f64::INFINITY),
            max: Vector3::repeat(f64::NEG_INFINITY),
            signed_volume: KahanSum::default(),
            area: KahanSum::default(),
            triangles: 0,
        }
    }

    /// Folds one triangle's contribution into the running extrema and sums.
    #[inline]
    pub fn fold(&mut self, vertices: &[[f32; 3]; 3]) {
        let [a, b, c] = (*vertices).map(|v| Vector3::new(v[0], v[1], v[2]).cast::<f64>());

        for v in [&a, &b, &c] {
            self.min = self.min.inf(v);
            self.max = self.max.sup(v);
        }

        // signed volume of the tetrahedron formed by joining the triangle to the origin
        self.signed_volume.add(a.dot(&b.cross(&c)) / 6.0);
        self.area.add((b - a).cross(&(c - a)).norm() / 2.0);
        self.triangles += 1;
    }

    pub fn finish(&self) -> GeometryMetrics {
        if self.triangles == 0 {
            return GeometryMetrics {
                bounding_box: BoundingBox::default(),
                volume_mm3: 0.0,
                surface_area_mm2: 0.0,
                triangle_count: 0,
            };
        }

        let span = self.max - self.min;
        GeometryMetrics {
            bounding_box: BoundingBox {
                x: round2(span.x),
                y: round2(span.y),
                z: round2(span.z),
            },
            volume_mm3: self.signed_volume.sum.abs(),
            surface_area_mm2: self.area.sum,
            triangle_count: self.triangles,
        }
    }
}

impl<'a> Extend<&'a Triangle> for MetricsAccumulator {
    fn extend<I: IntoIterator<Item = &'a Triangle>>(&mut self, iter: I) {
        for triangle in iter {
            self.fold(&triangle.vertices);
        }
    }
}

pub fn metrics(triangles: &[Triangle]) -> GeometryMetrics {
    let mut acc = MetricsAccumulator::new();
    acc.extend(triangles);
    acc.finish()
}

pub fn bounding_box(triangles: &[Triangle]) -> BoundingBox {
    metrics(triangles).bounding_box
}

pub fn volume(triangles: &[Triangle]) -> f64 {
    metrics(triangles).volume_mm3
}

pub fn surface_area(triangles: &[Triangle]) -> f64 {
    metrics(triangles).surface_area_mm2
}

/// Rounds to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle::new([0.0; 3], [a, b, c])
    }

    // unit right tetrahedron, outward winding
    fn tetrahedron() -> Vec<Triangle> {
        let o = [0.0, 0.0, 0.0];
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        let z = [0.0, 0.0, 1.0];
        vec![tri(o, y, x), tri(o, x, z), tri(o, z, y), tri(x, y, z)]
    }

    #[test]
    fn empty_input_is_zero() {
        let m = metrics(&[]);
        assert_eq!(m.bounding_box, BoundingBox::default());
        assert_eq!(m.volume_mm3, 0.0);
        assert_eq!(m.surface_area_mm2, 0.0);
        assert_eq!(m.triangle_count, 0);
    }

    #[test]
    fn tetrahedron_metrics() {
        let t = tetrahedron();
        assert!((volume(&t) - 1.0 / 6.0).abs() < 1e-12);

        let expected_area = 1.5 + 3f64.sqrt() / 2.0;
        assert!((surface_area(&t) - expected_area).abs() < 1e-6);

        let bb = bounding_box(&t);
        assert_eq!(bb, BoundingBox { x: 1.0, y: 1.0, z: 1.0 });
    }

    #[test]
    fn degenerate_triangle_contributes_nothing() {
        let p = [3.0, 4.0, 5.0];
        let m = metrics(&[tri(p, p, p)]);
        assert_eq!(m.volume_mm3, 0.0);
        assert_eq!(m.surface_area_mm2, 0.0);
        assert_eq!(m.bounding_box, BoundingBox::default());
        assert_eq!(m.triangle_count, 1);
    }

    #[test]
    fn inverted_winding_keeps_magnitudes() {
        let t = tetrahedron();
        let flipped: Vec<Triangle> = t.iter().map(Triangle::flipped).collect();
        assert!((volume(&t) - volume(&flipped)).abs() < 1e-12);
        assert!((surface_area(&t) - surface_area(&flipped)).abs() < 1e-12);
    }

    #[test]
    fn bounding_box_is_rounded_to_two_decimals() {
        let m = metrics(&[tri([0.0, 0.0, 0.0], [1.234_5, 0.0, 0.0], [0.0, 2.001, 0.3])]);
        assert_eq!(m.bounding_box, BoundingBox { x: 1.23, y: 2.0, z: 0.3 });
    }

    #[test]
    fn check_printable_rejects_empty_and_flat_meshes() {
        use crate::model::ErrorKind;

        assert_eq!(metrics(&[]).check_printable().unwrap_err().kind(), ErrorKind::InvalidMesh);

        let flat = metrics(&[tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])]);
        assert_eq!(flat.check_printable().unwrap_err().kind(), ErrorKind::InvalidMesh);

        assert!(metrics(&tetrahedron()).check_printable().is_ok());
    }
}
