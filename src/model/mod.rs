pub mod error;
pub mod sniff;
pub mod stl;
pub mod stream;

pub use error::{AnalysisError, ErrorKind, Section};

pub const MAX_TRIANGLES: u32 = 100_000_000;
pub const MAX_BUFFER_BYTES: u64 = 25 * 1024 * 1024; // 25MB
pub const MAX_STREAM_BYTES: u64 = 400 * 1024 * 1024; // 400MB

/// One facet of a triangle soup. The normal is carried as read and never
/// used for any metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

impl Triangle {
    pub fn new(normal: [f32; 3], vertices: [[f32; 3]; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Same facet with the opposite winding order (v2 and v3 swapped).
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self {
            normal: self.normal.map(|n| -n),
            vertices: [a, c, b],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedMesh {
    pub triangles: Vec<Triangle>,
    pub is_binary: bool,
}

/// Ceilings applied by both analyzer modes. Built once from the process
/// configuration and handed to the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerLimits {
    pub max_buffer_bytes: u64,
    pub max_stream_bytes: u64,
    pub max_triangles: u32,
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        Self {
            max_buffer_bytes: MAX_BUFFER_BYTES,
            max_stream_bytes: MAX_STREAM_BYTES,
            max_triangles: MAX_TRIANGLES,
        }
    }
}

pub trait MeshParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedMesh, AnalysisError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    STL,
}

impl Format {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.contains("application/sla")
            || content_type.contains("application/vnd.ms-pki.stl")
            || content_type.contains("model/stl")
        {
            Some(Format::STL)
        } else {
            None
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let file_name = file_name.to_lowercase();
        if file_name.ends_with(".stl") {
            Some(Format::STL)
        } else {
            None
        }
    }

    /// Resolves the format from the upload's file name, falling back to the
    /// declared content type.
    pub fn resolve(file_name: &str, content_type: Option<&str>) -> Result<Self, AnalysisError> {
        Self::from_file_name(file_name)
            .or_else(|| content_type.and_then(Self::from_content_type))
            .ok_or_else(|| {
                AnalysisError::unsupported_format(format!(
                    "'{}' is not an STL file",
                    file_name
                ))
            })
    }
}
