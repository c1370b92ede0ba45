use std::borrow::Cow;
use std::convert::TryInto;

use futures::prelude::*;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::CONTENT_TYPE;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::MaybeTlsStream;

use crate::error::Error;

pub type WsStream = SplitStream<tokio_tungstenite::WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Connects to the Gemini Live API's websocket endpoint (`url` already
/// carries the `?key=` query parameter).
pub async fn connect(url: &str) -> Result<(WsSink, WsStream), Error> {
    let mut request = url.into_client_request()?;
    request.headers_mut().insert(
        CONTENT_TYPE,
        "application/json"
            .try_into()
            .expect("'application/json' is a valid header value"),
    );

    let (stream, _) = tokio_tungstenite::connect_async(request).await?;
    let (sink, stream) = stream.split();

    Ok((
        WsSink {
            sink: Mutex::new(sink),
        },
        stream,
    ))
}

pub struct WsSink {
    sink: Mutex<SplitSink<tokio_tungstenite::WebSocketStream<MaybeTlsStream<TcpStream>>, Message>>,
}

impl WsSink {
    pub(crate) async fn send_json(&self, msg: &str) -> Result<(), Error> {
        self.sink.lock().await.send(Message::Text(msg.to_owned())).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<(), Error> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: Cow::Borrowed("going away"),
        })))
        .await?;
        sink.close().await?;
        Ok(())
    }
}
