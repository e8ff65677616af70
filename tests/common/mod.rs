#![allow(dead_code)]

use bytes::Bytes;
use futures_util::{Stream, stream};
use stl_metrics::model::Triangle;

pub type Chunk = Result<Bytes, std::io::Error>;

/// Axis aligned cube with one corner at `origin`, 12 outward facing triangles.
pub fn cube_at(origin: [f32; 3], edge: f32) -> Vec<Triangle> {
    let [ox, oy, oz] = origin;
    let p = |x: f32, y: f32, z: f32| [ox + x * edge, oy + y * edge, oz + z * edge];

    let faces = [
        // bottom, -z
        ([0.0, 0.0, -1.0], [p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.)]),
        ([0.0, 0.0, -1.0], [p(0., 0., 0.), p(1., 1., 0.), p(1., 0., 0.)]),
        // top, +z
        ([0.0, 0.0, 1.0], [p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.)]),
        ([0.0, 0.0, 1.0], [p(0., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)]),
        // front, -y
        ([0.0, -1.0, 0.0], [p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.)]),
        ([0.0, -1.0, 0.0], [p(0., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)]),
        // back, +y
        ([0.0, 1.0, 0.0], [p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.)]),
        ([0.0, 1.0, 0.0], [p(0., 1., 0.), p(1., 1., 1.), p(1., 1., 0.)]),
        // left, -x
        ([-1.0, 0.0, 0.0], [p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.)]),
        ([-1.0, 0.0, 0.0], [p(0., 0., 0.), p(0., 1., 1.), p(0., 1., 0.)]),
        // right, +x
        ([1.0, 0.0, 0.0], [p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.)]),
        ([1.0, 0.0, 0.0], [p(1., 0., 0.), p(1., 1., 1.), p(1., 0., 1.)]),
    ];

    faces
        .into_iter()
        .map(|(normal, vertices)| Triangle::new(normal, vertices))
        .collect()
}

pub fn cube(edge: f32) -> Vec<Triangle> {
    cube_at([0.0; 3], edge)
}

pub fn to_binary(header: &[u8], triangles: &[Triangle]) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out[..header.len()].copy_from_slice(header);
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        for f in triangle.normal.iter().chain(triangle.vertices.iter().flatten()) {
            out.extend_from_slice(&f.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

pub fn to_ascii(name: &str, triangles: &[Triangle]) -> String {
    let mut out = format!("solid {}\n", name);
    for triangle in triangles {
        let [nx, ny, nz] = triangle.normal;
        out.push_str(&format!("  facet normal {:e} {:e} {:e}\n", nx, ny, nz));
        out.push_str("    outer loop\n");
        for [x, y, z] in triangle.vertices {
            out.push_str(&format!("      vertex {:e} {:e} {:e}\n", x, y, z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {}\n", name));
    out
}

/// Splits `bytes` into a stream of `size` byte chunks.
pub fn chunked(bytes: &[u8], size: usize) -> impl Stream<Item = Chunk> + Unpin + use<> {
    let parts: Vec<Chunk> = bytes
        .chunks(size.max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    stream::iter(parts)
}

pub fn assert_close(actual: f64, expected: f64, rel: f64) {
    let scale = expected.abs().max(f64::MIN_POSITIVE);
    assert!(
        (actual - expected).abs() / scale <= rel,
        "{} is not within {} of {}",
        actual,
        rel,
        expected
    );
}
