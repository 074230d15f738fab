//! Newline-delimited JSON samples over TCP

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};
use vib_core::{SampleSource, SourceEvent, VibError, VibResult};

/// Longest record accepted, newline included
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Characters of an oversized or undecodable line kept for the rejection report
const EXCERPT_CHARS: usize = 80;

/// Reads one JSON record per line from a TCP peer.
///
/// The peer closing the connection ends the stream. There is no reconnect;
/// a read error ends the acquisition session. Lines that are not UTF-8 or
/// exceed [`MAX_LINE_BYTES`] are reported as malformed records.
pub struct TcpJsonSource {
    reader: BufReader<TcpStream>,
    line_buffer: Vec<u8>,
    name: String,
}

impl TcpJsonSource {
    /// Connect to a sample server and return a ready source.
    pub async fn connect(address: &str) -> VibResult<Self> {
        let name = format!("tcp://{}", address);
        let stream = TcpStream::connect(address).await.map_err(|e| VibError::Source {
            source_name: name.clone(),
            reason: e.to_string(),
        })?;
        info!("Connected to {}", name);

        Ok(Self {
            reader: BufReader::new(stream),
            line_buffer: Vec::with_capacity(256),
            name,
        })
    }

    /// Read up to the next newline or the line limit into `line_buffer`
    async fn read_chunk(&mut self) -> VibResult<usize> {
        self.line_buffer.clear();
        (&mut self.reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut self.line_buffer)
            .await
            .map_err(|e| VibError::Source {
                source_name: self.name.clone(),
                reason: e.to_string(),
            })
    }

    /// Drop the remainder of an oversized line
    async fn skip_line(&mut self) -> VibResult<()> {
        loop {
            let bytes = self.read_chunk().await?;
            if bytes == 0 || self.line_buffer.ends_with(b"\n") {
                return Ok(());
            }
        }
    }

    fn excerpt(&self) -> String {
        String::from_utf8_lossy(&self.line_buffer)
            .trim_end()
            .chars()
            .take(EXCERPT_CHARS)
            .collect()
    }
}

#[async_trait]
impl SampleSource for TcpJsonSource {
    async fn next_record(&mut self) -> VibResult<SourceEvent> {
        loop {
            let bytes = self.read_chunk().await?;
            if bytes == 0 {
                return Ok(SourceEvent::Eof);
            }

            if bytes == MAX_LINE_BYTES && !self.line_buffer.ends_with(b"\n") {
                let raw = self.excerpt();
                self.skip_line().await?;
                return Ok(SourceEvent::Malformed {
                    raw,
                    reason: format!("record exceeds {} bytes", MAX_LINE_BYTES),
                });
            }

            match std::str::from_utf8(&self.line_buffer) {
                Ok(line) => {
                    if let Some(event) = SourceEvent::from_line(line) {
                        return Ok(event);
                    }
                }
                Err(e) => {
                    return Ok(SourceEvent::Malformed {
                        raw: self.excerpt(),
                        reason: format!("invalid UTF-8: {}", e),
                    });
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.reader.get_mut().shutdown().await {
            debug!("Shutdown of {} failed: {}", self.name, e);
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const RECORD: &[u8] = b"{\"Time\": 0.002, \"X\": 1.0, \"Y\": 0.0, \"Z\": 9.81}\n";

    async fn serve(payload: Vec<u8>) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(&payload).await.unwrap();
        });
        (address, server)
    }

    #[tokio::test]
    async fn test_reads_lines_until_peer_closes() {
        let mut payload = b"{\"Time\": 0.0, \"X\": 1.0, \"Y\": 0.0, \"Z\": 9.81}\n\n{\"Time\": 0.001,\n".to_vec();
        payload.extend_from_slice(RECORD);
        let (address, server) = serve(payload).await;

        let mut source = TcpJsonSource::connect(&address).await.unwrap();
        assert!(source.source_name().starts_with("tcp://127.0.0.1:"));

        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Record(_)));
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Malformed { .. }));
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Record(_)));

        server.await.unwrap();
        assert_eq!(source.next_record().await.unwrap(), SourceEvent::Eof);
        source.close().await;
    }

    #[tokio::test]
    async fn test_invalid_utf8_rejected_and_stream_continues() {
        let mut payload = b"{\"Time\":0.0,\"X\":\xff,\"Y\":0.0,\"Z\":9.81}\n".to_vec();
        payload.extend_from_slice(RECORD);
        let (address, server) = serve(payload).await;

        let mut source = TcpJsonSource::connect(&address).await.unwrap();
        match source.next_record().await.unwrap() {
            SourceEvent::Malformed { raw, reason } => {
                assert!(raw.starts_with("{\"Time\":0.0"));
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Record(_)));

        server.await.unwrap();
        assert_eq!(source.next_record().await.unwrap(), SourceEvent::Eof);
    }

    #[tokio::test]
    async fn test_oversized_line_skipped() {
        let mut payload = vec![b'a'; MAX_LINE_BYTES * 2 + 10];
        payload.push(b'\n');
        payload.extend_from_slice(RECORD);
        let (address, server) = serve(payload).await;

        let mut source = TcpJsonSource::connect(&address).await.unwrap();
        match source.next_record().await.unwrap() {
            SourceEvent::Malformed { raw, reason } => {
                assert_eq!(raw.len(), EXCERPT_CHARS);
                assert!(reason.contains("exceeds"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Record(_)));

        server.await.unwrap();
        assert_eq!(source.next_record().await.unwrap(), SourceEvent::Eof);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = TcpJsonSource::connect(&address).await;
        assert!(matches!(result, Err(VibError::Source { .. })));
    }
}
