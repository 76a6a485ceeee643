//! WebSocket transport layer.
//!
//! A thin ownership wrapper around one tokio-tungstenite stream. The
//! transport knows nothing about message semantics: it hands text frames up
//! and reports the connection ending, nothing else. Lifecycle, reconnection,
//! and heartbeats live in the driver that owns it.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace};

use crate::error::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One inbound transport event.
#[derive(Debug)]
pub enum Frame {
    /// A text frame arrived.
    Text(String),
    /// The connection ended - close frame, protocol error, or EOF.
    Closed,
}

/// An established WebSocket connection.
pub struct Transport {
    stream: WsStream,
}

impl Transport {
    /// Open a connection to the given `ws://`/`wss://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        debug!(url, "transport connected");
        Ok(Self { stream })
    }

    /// Transmit one text frame.
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    /// Wait for the next frame.
    ///
    /// Binary and control frames are skipped (tungstenite answers pings
    /// itself). Both a close frame and a read error surface as
    /// [`Frame::Closed`]; the distinction only matters for logging.
    pub async fn next_frame(&mut self) -> Frame {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Frame::Text(text.as_str().to_owned()),
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "transport received close frame");
                    return Frame::Closed;
                }
                Some(Ok(other)) => {
                    trace!(kind = ?other, "skipping non-text frame");
                }
                Some(Err(e)) => {
                    debug!(error = %e, "transport read error");
                    return Frame::Closed;
                }
                None => return Frame::Closed,
            }
        }
    }

    /// Close the connection. Errors are ignored; the peer may already be
    /// gone.
    pub async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
