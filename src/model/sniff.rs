// STL file format
// bytes range | description
// ------------|----------------
// 0-79        | 80 byte header
// 80-83       | 4 byte unsigned int (number of triangles)
// 84-end      | triangle data // INFO: (50 bytes per triangle)
//
// ASCII STL starts with "solid", but so do plenty of binary headers, hence
// the structural checks below.

pub const HEADER_SIZE: usize = 80;
pub const COUNT_SIZE: usize = 4;
pub const PREAMBLE_SIZE: usize = HEADER_SIZE + COUNT_SIZE;
pub const TRIANGLE_SIZE: usize = 50;

/// How far the actual length may stray from the size implied by the header
/// and still count as binary.
pub const SIZE_TOLERANCE: u64 = 100;

/// Bytes inspected for the `facet` keyword when only a stream prefix is
/// available.
pub const STREAM_PEEK_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Ascii,
}

impl Encoding {
    /// Classifies a fully buffered STL file.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.len() < PREAMBLE_SIZE {
            return if starts_with_solid(bytes) {
                Self::Ascii
            } else {
                Self::Binary
            };
        }

        if size_matches_count(bytes, bytes.len() as u64) {
            return Self::Binary;
        }

        if starts_with_solid(&bytes[..HEADER_SIZE]) {
            Self::Ascii
        } else {
            Self::Binary
        }
    }

    /// Classifies a stream from its first bytes. `total_len` is the declared
    /// length of the whole stream, when the caller knows it.
    pub fn detect_prefix(prefix: &[u8], total_len: Option<u64>) -> Self {
        if let Some(total_len) = total_len
            && prefix.len() >= PREAMBLE_SIZE
            && size_matches_count(prefix, total_len)
        {
            return Self::Binary;
        }

        let header = &prefix[..prefix.len().min(HEADER_SIZE)];
        let window = &prefix[..prefix.len().min(STREAM_PEEK_SIZE)];
        if starts_with_solid(header) && contains_ignore_case(window, b"facet") {
            Self::Ascii
        } else {
            Self::Binary
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }
}

/// Triangle count declared at offset 80. Callers guarantee at least 84 bytes.
pub fn declared_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

/// Size in bytes of a binary STL holding `count` triangles.
pub fn expected_size(count: u32) -> u64 {
    PREAMBLE_SIZE as u64 + u64::from(count) * TRIANGLE_SIZE as u64
}

fn size_matches_count(bytes: &[u8], total_len: u64) -> bool {
    expected_size(declared_count(bytes)).abs_diff(total_len) <= SIZE_TOLERANCE
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    bytes
        .trim_ascii_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"solid"))
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_preamble(header: &[u8], count: u32, total_len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; total_len.max(PREAMBLE_SIZE)];
        bytes[..header.len()].copy_from_slice(header);
        bytes[HEADER_SIZE..PREAMBLE_SIZE].copy_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn short_input_uses_solid_prefix_only() {
        assert_eq!(Encoding::detect(b"  SOLID cube"), Encoding::Ascii);
        assert_eq!(Encoding::detect(b"\0\0\0"), Encoding::Binary);
        assert_eq!(Encoding::detect(b""), Encoding::Binary);
    }

    #[test]
    fn size_match_wins_over_solid_header() {
        let bytes = binary_preamble(b"solid exported by cad", 2, 84 + 2 * 50);
        assert_eq!(Encoding::detect(&bytes), Encoding::Binary);
    }

    #[test]
    fn size_match_tolerates_padding() {
        let bytes = binary_preamble(b"solid padded", 1, 84 + 50 + 100);
        assert_eq!(Encoding::detect(&bytes), Encoding::Binary);

        let bytes = binary_preamble(b"solid padded", 1, 84 + 50 + 101);
        assert_eq!(Encoding::detect(&bytes), Encoding::Ascii);
    }

    #[test]
    fn not_solid_header_is_binary() {
        let bytes = binary_preamble(b"not solid", 1_000_000, 100);
        assert_eq!(Encoding::detect(&bytes), Encoding::Binary);
        assert_eq!(Encoding::detect_prefix(&bytes, None), Encoding::Binary);
    }

    #[test]
    fn ascii_text_is_detected() {
        let text = b"solid cube\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n    endloop\n  endfacet\nendsolid cube\n";
        assert_eq!(Encoding::detect(text), Encoding::Ascii);
        assert_eq!(Encoding::detect_prefix(text, None), Encoding::Ascii);
    }

    #[test]
    fn stream_prefix_needs_facet_keyword() {
        let bytes = binary_preamble(b"solid but binary", 3, 84 + 3 * 50);
        assert_eq!(Encoding::detect_prefix(&bytes, None), Encoding::Binary);
    }

    #[test]
    fn stream_prefix_ignores_facet_beyond_peek_window() {
        let mut text = b"solid x\n".to_vec();
        text.resize(STREAM_PEEK_SIZE, b' ');
        text.extend_from_slice(b"facet normal 0 0 1\n");
        assert_eq!(Encoding::detect_prefix(&text, None), Encoding::Binary);
    }

    #[test]
    fn stream_prefix_uses_declared_length() {
        let mut bytes = binary_preamble(b"solid facet", 2, PREAMBLE_SIZE);
        bytes.extend_from_slice(b"facet");
        let total = expected_size(2);
        assert_eq!(Encoding::detect_prefix(&bytes, Some(total)), Encoding::Binary);
        assert_eq!(Encoding::detect_prefix(&bytes, None), Encoding::Ascii);
    }

    #[test]
    fn expected_size_does_not_overflow() {
        assert_eq!(expected_size(u32::MAX), 84 + u64::from(u32::MAX) * 50);
    }
}
