// Binary triangle record (50 bytes)
// bytes range | description
// ------------|----------------
// 0-11        | normal (3 x f32 LE)
// 12-47       | vertices (9 x f32 LE)
// 48-49       | attribute byte count, ignored

use crate::model::{
    AnalysisError, AnalyzerLimits, MeshParser, ParsedMesh, Triangle,
    sniff::{self, Encoding, PREAMBLE_SIZE, TRIANGLE_SIZE},
};

#[inline]
fn read_vec3(bytes: &[u8]) -> [f32; 3] {
    [
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
    ]
}

/// Decodes the three vertices of a binary triangle record, skipping the
/// normal and attribute bytes.
#[inline]
pub fn decode_vertices(record: &[u8; TRIANGLE_SIZE]) -> [[f32; 3]; 3] {
    [
        read_vec3(&record[12..24]),
        read_vec3(&record[24..36]),
        read_vec3(&record[36..48]),
    ]
}

fn decode_triangle(record: &[u8; TRIANGLE_SIZE]) -> Triangle {
    Triangle::new(read_vec3(&record[0..12]), decode_vertices(record))
}

pub fn parse_binary(bytes: &[u8]) -> Result<Vec<Triangle>, AnalysisError> {
    if bytes.len() < PREAMBLE_SIZE {
        return Err(AnalysisError::malformed(format!(
            "binary STL needs at least {} bytes, got {}",
            PREAMBLE_SIZE,
            bytes.len()
        )));
    }

    let count = sniff::declared_count(bytes);
    let expected = sniff::expected_size(count);
    if expected > bytes.len() as u64 {
        return Err(AnalysisError::malformed(format!(
            "header declares {} triangles ({} bytes) but only {} bytes are present",
            count,
            expected,
            bytes.len()
        )));
    }
    if (bytes.len() as u64) > expected {
        log::debug!(
            "[stl] ignoring {} trailing bytes after {} triangles",
            bytes.len() as u64 - expected,
            count
        );
    }

    let body = &bytes[PREAMBLE_SIZE..expected as usize];
    let triangles = body
        .chunks_exact(TRIANGLE_SIZE)
        .map(|chunk| {
            let record: &[u8; TRIANGLE_SIZE] = chunk
                .try_into()
                .map_err(|_| AnalysisError::malformed("truncated triangle record"))?;
            Ok(decode_triangle(record))
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(triangles)
}

fn parse_coords<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    Some([x, y, z])
}

/// Lenient ASCII STL reader. Only `facet normal`, `vertex` and `endfacet`
/// lines matter; facets without exactly three vertices are dropped.
pub fn parse_ascii(bytes: &[u8]) -> Vec<Triangle> {
    struct OpenFacet {
        normal: [f32; 3],
        vertices: [[f32; 3]; 3],
        seen: usize,
        broken: bool,
    }

    let content = String::from_utf8_lossy(bytes);
    let mut triangles = Vec::new();
    let mut facet: Option<OpenFacet> = None;
    let mut dropped = 0usize;

    for line in content.lines() {
        let line = line.trim().to_ascii_lowercase();
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "facet" => {
                if parts.next() != Some("normal") {
                    continue;
                }
                if facet.is_some() {
                    dropped += 1;
                }
                facet = Some(OpenFacet {
                    normal: parse_coords(parts).unwrap_or_default(),
                    vertices: [[0.0; 3]; 3],
                    seen: 0,
                    broken: false,
                });
            }
            "vertex" => {
                if let Some(open) = facet.as_mut() {
                    match parse_coords(parts) {
                        Some(v) if open.seen < 3 => open.vertices[open.seen] = v,
                        Some(_) => {}
                        None => open.broken = true,
                    }
                    open.seen += 1;
                }
            }
            "endfacet" => {
                if let Some(open) = facet.take() {
                    if open.seen == 3 && !open.broken {
                        triangles.push(Triangle::new(open.normal, open.vertices));
                    } else {
                        dropped += 1;
                    }
                }
            }
            _ => {}
        }
    }

    if dropped > 0 {
        log::debug!("[stl] dropped {} incomplete ascii facets", dropped);
    }

    triangles
}

pub struct BufferedParser {
    limits: AnalyzerLimits,
}

impl BufferedParser {
    pub fn new(limits: AnalyzerLimits) -> Self {
        Self { limits }
    }
}

impl MeshParser for BufferedParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedMesh, AnalysisError> {
        if bytes.len() as u64 > self.limits.max_buffer_bytes {
            return Err(AnalysisError::TooLarge {
                limit: self.limits.max_buffer_bytes,
            });
        }

        let encoding = Encoding::detect(bytes);
        let triangles = match encoding {
            Encoding::Binary => parse_binary(bytes)?,
            Encoding::Ascii => parse_ascii(bytes),
        };
        log::debug!(
            "[stl] parsed {} triangles from {} byte {:?} buffer",
            triangles.len(),
            bytes.len(),
            encoding,
        );

        Ok(ParsedMesh {
            triangles,
            is_binary: encoding.is_binary(),
        })
    }
}
