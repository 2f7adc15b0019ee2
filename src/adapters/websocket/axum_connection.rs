//! Frame sink and source over an axum WebSocket.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::ports::{FrameSink, FrameSource, InboundFrame, OutboundFrame, TransportError};

/// Write half of an upgraded socket.
pub struct WsFrameSink(SplitSink<WebSocket, Message>);

/// Read half of an upgraded socket.
pub struct WsFrameSource(SplitStream<WebSocket>);

/// Splits an upgraded socket into the halves a session needs.
pub fn split_socket(socket: WebSocket) -> (WsFrameSink, WsFrameSource) {
    let (sink, stream) = socket.split();
    (WsFrameSink(sink), WsFrameSource(stream))
}

fn to_message(frame: OutboundFrame) -> Message {
    match frame {
        OutboundFrame::Text(envelope) => Message::Text(envelope.as_str().to_owned()),
        OutboundFrame::Ping => Message::Ping(Vec::new()),
        OutboundFrame::Close => Message::Close(None),
    }
}

fn to_inbound(message: Message) -> Result<InboundFrame, TransportError> {
    match message {
        Message::Pong(_) => Ok(InboundFrame::Pong),
        Message::Ping(_) => Ok(InboundFrame::Ping),
        Message::Text(text) => Ok(InboundFrame::Data { len: text.len() }),
        Message::Binary(bytes) => Ok(InboundFrame::Data { len: bytes.len() }),
        Message::Close(_) => Err(TransportError::Closed),
    }
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        self.0.send(to_message(frame)).await.map_err(TransportError::io)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.0.close().await.map_err(TransportError::io)
    }
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Result<InboundFrame, TransportError> {
        match self.0.next().await {
            Some(Ok(message)) => to_inbound(message),
            Some(Err(e)) => Err(TransportError::io(e)),
            None => Err(TransportError::Closed),
        }
    }
}
