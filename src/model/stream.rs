//! Constant-memory analysis of a binary STL delivered as a byte stream.
//!
//! Only the transport chunk currently being consumed is buffered; every
//! 50-byte record is folded into a [`MetricsAccumulator`] and dropped.

use bytes::{Buf, Bytes, BytesMut};
use futures_util::{Stream, StreamExt};

use crate::{
    calculate::{GeometryMetrics, MetricsAccumulator},
    error::StdErrorExt,
    model::{
        AnalysisError, AnalyzerLimits, Section,
        sniff::{self, COUNT_SIZE, Encoding, HEADER_SIZE, STREAM_PEEK_SIZE, TRIANGLE_SIZE},
        stl::decode_vertices,
    },
};

/// Pulls fixed-size reads out of a chunked byte stream. A read that cannot
/// be served from the pending chunk awaits the next one.
pub struct ByteReader<S> {
    stream: S,
    pending: BytesMut,
    pulled: u64,
    limit: u64,
    finished: bool,
}

impl<S, E> ByteReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: StdErrorExt,
{
    pub fn new(stream: S, limit: u64) -> Self {
        Self {
            stream,
            pending: BytesMut::new(),
            pulled: 0,
            limit,
            finished: false,
        }
    }

    /// Total bytes received from the stream so far.
    pub fn bytes_pulled(&self) -> u64 {
        self.pulled
    }

    /// Appends the next non-empty chunk to the pending buffer. Returns
    /// `false` once the stream has ended.
    async fn pull(&mut self) -> Result<bool, AnalysisError> {
        if self.finished {
            return Ok(false);
        }

        while let Some(chunk) = self.stream.next().await {
            let chunk = chunk.map_err(AnalysisError::stream)?;
            if chunk.is_empty() {
                continue;
            }

            self.pulled += chunk.len() as u64;
            if self.pulled > self.limit {
                return Err(AnalysisError::TooLarge { limit: self.limit });
            }
            self.pending.extend_from_slice(&chunk);
            return Ok(true);
        }

        self.finished = true;
        Ok(false)
    }

    /// Returns up to `n` leading bytes without consuming them. Fewer are
    /// returned only if the stream ends first.
    pub async fn peek(&mut self, n: usize) -> Result<&[u8], AnalysisError> {
        while self.pending.len() < n && self.pull().await? {}
        Ok(&self.pending[..self.pending.len().min(n)])
    }

    pub async fn read_array<const N: usize>(
        &mut self,
        section: Section,
    ) -> Result<[u8; N], AnalysisError> {
        while self.pending.len() < N {
            if !self.pull().await? {
                return Err(AnalysisError::PrematureEnd {
                    section,
                    expected: N,
                    got: self.pending.len(),
                });
            }
        }

        let mut out = [0u8; N];
        out.copy_from_slice(&self.pending[..N]);
        self.pending.advance(N);
        Ok(out)
    }

    /// Consumes the rest of the stream and returns how many bytes were left.
    pub async fn drain(&mut self) -> Result<u64, AnalysisError> {
        let mut remaining = self.pending.len() as u64;
        self.pending.clear();
        while self.pull().await? {
            remaining += self.pending.len() as u64;
            self.pending.clear();
        }
        Ok(remaining)
    }
}

pub struct StreamAnalyzer {
    limits: AnalyzerLimits,
}

impl StreamAnalyzer {
    pub fn new(limits: AnalyzerLimits) -> Self {
        Self { limits }
    }

    /// Analyzes a binary STL stream. `content_length` is the declared size of
    /// the whole stream, if the transport provides one.
    pub async fn analyze<S, E>(
        &self,
        stream: S,
        content_length: Option<u64>,
    ) -> Result<GeometryMetrics, AnalysisError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: StdErrorExt,
    {
        let max_bytes = self.limits.max_stream_bytes;
        if let Some(length) = content_length
            && length > max_bytes
        {
            return Err(AnalysisError::TooLarge { limit: max_bytes });
        }

        let mut reader = ByteReader::new(stream, max_bytes);

        let prefix = reader.peek(STREAM_PEEK_SIZE).await?;
        if Encoding::detect_prefix(prefix, content_length) == Encoding::Ascii {
            return Err(AnalysisError::unsupported_format(
                "ASCII STL is not supported, export the model as binary STL",
            ));
        }

        let _header: [u8; HEADER_SIZE] = reader.read_array(Section::Header).await?;
        let count = u32::from_le_bytes(
            reader
                .read_array::<COUNT_SIZE>(Section::TriangleCount)
                .await?,
        );
        self.check_count(count)?;

        let mut acc = MetricsAccumulator::new();
        for index in 0..count {
            let record: [u8; TRIANGLE_SIZE] =
                reader.read_array(Section::Triangle(index)).await?;
            acc.fold(&decode_vertices(&record));
        }

        // every declared record is folded; nothing after them can fail the analysis
        match reader.drain().await {
            Ok(0) => {}
            Ok(trailing) => log::warn!(
                "[stream] ignoring {} trailing bytes after {} triangles",
                trailing,
                count
            ),
            Err(err) => log::warn!(
                "[stream] stopped reading trailing bytes after {} triangles: {}",
                count,
                err
            ),
        }

        let metrics = acc.finish();
        log::info!(
            "[stream] analyzed {} triangles from {} bytes",
            metrics.triangle_count,
            reader.bytes_pulled()
        );

        Ok(metrics)
    }

    fn check_count(&self, count: u32) -> Result<(), AnalysisError> {
        if count == 0 {
            return Err(AnalysisError::malformed("model declares zero triangles"));
        }
        if count > self.limits.max_triangles {
            return Err(AnalysisError::malformed(format!(
                "declared triangle count {} exceeds the limit of {}",
                count, self.limits.max_triangles
            )));
        }

        let expected = sniff::expected_size(count);
        if expected > self.limits.max_stream_bytes {
            return Err(AnalysisError::TooLarge {
                limit: self.limits.max_stream_bytes,
            });
        }

        Ok(())
    }
}
