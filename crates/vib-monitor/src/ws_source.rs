//! JSON samples from a WebSocket sensor gateway, one record per message

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use vib_core::{SampleSource, SourceEvent, VibError, VibResult};

/// WebSocket client reading one JSON record per text message.
///
/// A close frame from the gateway ends the stream. Binary messages are
/// decoded as UTF-8 text; control frames are handled by the protocol layer.
pub struct WebSocketSource {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    name: String,
}

impl WebSocketSource {
    /// Connect to a gateway such as `ws://192.168.1.1:80`
    pub async fn connect(url: &str) -> VibResult<Self> {
        let (stream, response) = connect_async(url).await.map_err(|e| VibError::Source {
            source_name: url.to_string(),
            reason: e.to_string(),
        })?;
        info!("Connected to {} (HTTP {})", url, response.status());

        Ok(Self {
            stream,
            name: url.to_string(),
        })
    }

    fn source_error(&self, reason: impl ToString) -> VibError {
        VibError::Source {
            source_name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl SampleSource for WebSocketSource {
    async fn next_record(&mut self) -> VibResult<SourceEvent> {
        loop {
            let message = match self.stream.next().await {
                None => return Ok(SourceEvent::Eof),
                Some(Err(e)) => return Err(self.source_error(e)),
                Some(Ok(message)) => message,
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        let raw: String = String::from_utf8_lossy(e.as_bytes()).chars().take(80).collect();
                        return Ok(SourceEvent::Malformed {
                            raw,
                            reason: format!("invalid UTF-8: {}", e.utf8_error()),
                        });
                    }
                },
                Message::Close(frame) => {
                    debug!("{} sent close frame {:?}", self.name, frame);
                    return Ok(SourceEvent::Eof);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            if let Some(event) = SourceEvent::from_line(&text) {
                return Ok(event);
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Close of {} failed: {}", self.name, e);
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
