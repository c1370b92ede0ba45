use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;

use crate::error::Error;
use crate::ids::{HandleId, SessionId, TransactionId};
use crate::message::JanusMessage;
use crate::transport::{self, WsSink, WsStream};

enum TaskCmd {
    Register {
        id: TransactionId,
        sender: mpsc::Sender<JanusMessage>,
    },
    Unregister(TransactionId),
}

/// One in-flight request/response exchange with Janus, identified by a
/// random transaction id. Janus acks every request before (possibly much
/// later) delivering the actual result as an `event`; the two can also
/// arrive out of order, which `backlog` accounts for.
struct Transaction {
    id: TransactionId,
    messages: mpsc::Receiver<JanusMessage>,
    task_sender: mpsc::UnboundedSender<TaskCmd>,
    is_async: bool,
    backlog: Option<JanusMessage>,
}

impl Transaction {
    async fn do_receive_ack(&mut self, exclusive: bool) -> Result<(), Error> {
        loop {
            let msg = match timeout(Duration::from_secs(2), self.messages.recv()).await {
                Ok(Some(msg)) => msg,
                Ok(None) => return Err(Error::NotConnected),
                Err(_) => return Err(Error::Timeout),
            };

            match msg {
                JanusMessage::Ack(_) => return Ok(()),
                _ if exclusive => return Err(Error::InvalidResponse),
                msg => {
                    self.backlog = Some(msg);
                    continue;
                }
            }
        }
    }

    /// Waits for the plain `ack`, used for fire-and-forget requests
    /// (keepalive) that never get a follow-up event.
    async fn receive_ack(mut self) -> Result<(), Error> {
        self.do_receive_ack(true).await
    }

    /// Waits for the final response: the `success`/`event` Janus sends,
    /// either directly (sync requests) or after an ack (async ones).
    async fn receive(mut self) -> Result<JanusMessage, Error> {
        let msg_timeout = if self.is_async {
            self.do_receive_ack(false).await?;
            Duration::from_secs(10)
        } else {
            Duration::from_secs(5)
        };

        if let Some(backlog) = self.backlog.take() {
            return backlog.into_result();
        }

        match timeout(msg_timeout, self.messages.recv()).await {
            Ok(Some(msg)) => msg.into_result(),
            Ok(None) => Err(Error::NotConnected),
            Err(_) => Err(Error::Timeout),
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let _ = self.task_sender.send(TaskCmd::Unregister(self.id.clone()));
    }
}

struct InnerClient {
    task_sender: mpsc::UnboundedSender<TaskCmd>,
    sink: WsSink,
}

impl InnerClient {
    async fn create_transaction(&self, is_async: bool) -> Result<(TransactionId, Transaction), Error> {
        let suffix: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let id = TransactionId(suffix);

        let (sender, messages) = mpsc::channel(4);

        self.task_sender
            .send(TaskCmd::Register {
                id: id.clone(),
                sender,
            })
            .map_err(|_| Error::NotConnected)?;

        Ok((
            id.clone(),
            Transaction {
                id,
                messages,
                task_sender: self.task_sender.clone(),
                is_async,
                backlog: None,
            },
        ))
    }

    async fn send(&self, msg: &serde_json::Value) -> Result<(), Error> {
        let text = serde_json::to_string(msg)?;
        tracing::trace!(message = %text, "sending janus request");
        self.sink.send_json(&text).await
    }
}

/// A connection to one Janus websocket endpoint, carrying a single plugin
/// session. Mirrors how the bridge actually uses Janus: one connection for
/// the AudioBridge participant, a separate one for the VideoRoom
/// subscriber, each with exactly one attached plugin handle.
#[derive(Clone)]
pub struct Client {
    inner: Arc<InnerClient>,
}

impl Client {
    /// Connects to `url` and starts the background task that reads
    /// responses off the socket and dispatches them to pending
    /// transactions. Messages with no matching transaction (plugin events
    /// not directly solicited by a request) are published on the returned
    /// broadcast receiver.
    pub async fn connect(url: &str) -> Result<(Self, broadcast::Receiver<Arc<JanusMessage>>), Error> {
        let (sink, stream) = transport::connect(url).await?;
        let (task_sender, cmd_receiver) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = broadcast::channel(32);

        tokio::spawn(receive_loop(stream, cmd_receiver, events_tx));

        Ok((
            Self {
                inner: Arc::new(InnerClient { task_sender, sink }),
            },
            events_rx,
        ))
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.inner.sink.close().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_session(&self) -> Result<SessionId, Error> {
        let (id, transaction) = self.inner.create_transaction(false).await?;
        self.inner
            .send(&json!({"janus": "create", "transaction": id.0}))
            .await?;

        match transaction.receive().await? {
            JanusMessage::Success(s) => s
                .data_id()
                .map(SessionId)
                .ok_or(Error::InvalidResponse),
            _ => Err(Error::InvalidResponse),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn attach(&self, session: SessionId, plugin: &str) -> Result<HandleId, Error> {
        let (id, transaction) = self.inner.create_transaction(false).await?;
        self.inner
            .send(&json!({
                "janus": "attach",
                "session_id": session.0,
                "plugin": plugin,
                "transaction": id.0,
            }))
            .await?;

        match transaction.receive().await? {
            JanusMessage::Success(s) => s
                .data_id()
                .map(HandleId)
                .ok_or(Error::InvalidResponse),
            _ => Err(Error::InvalidResponse),
        }
    }

    /// Sends a plugin request (the `body` of a Janus `message`), returning
    /// the `success`/`event` response. `is_async` selects whether Janus is
    /// expected to ack first and deliver the real result as a later event
    /// (true for most plugin requests) or respond immediately (rare).
    pub async fn send_plugin_message<R: Serialize>(
        &self,
        session: SessionId,
        handle: HandleId,
        body: &R,
        is_async: bool,
    ) -> Result<JanusMessage, Error> {
        let (id, transaction) = self.inner.create_transaction(is_async).await?;
        self.inner
            .send(&json!({
                "janus": "message",
                "session_id": session.0,
                "handle_id": handle.0,
                "transaction": id.0,
                "body": body,
            }))
            .await?;

        transaction.receive().await
    }

    pub async fn keep_alive(&self, session: SessionId) -> Result<(), Error> {
        let (id, transaction) = self.inner.create_transaction(false).await?;
        self.inner
            .send(&json!({
                "janus": "keepalive",
                "session_id": session.0,
                "transaction": id.0,
            }))
            .await?;

        transaction.receive_ack().await
    }

    pub async fn detach(&self, session: SessionId, handle: HandleId) -> Result<(), Error> {
        let (id, transaction) = self.inner.create_transaction(false).await?;
        self.inner
            .send(&json!({
                "janus": "detach",
                "session_id": session.0,
                "handle_id": handle.0,
                "transaction": id.0,
            }))
            .await?;

        transaction.receive().await.map(|_| ())
    }

    pub async fn destroy_session(&self, session: SessionId) -> Result<(), Error> {
        let (id, transaction) = self.inner.create_transaction(false).await?;
        self.inner
            .send(&json!({
                "janus": "destroy",
                "session_id": session.0,
                "transaction": id.0,
            }))
            .await?;

        transaction.receive().await.map(|_| ())
    }
}

async fn receive_loop(
    mut stream: WsStream,
    mut cmd_receiver: mpsc::UnboundedReceiver<TaskCmd>,
    events: broadcast::Sender<Arc<JanusMessage>>,
) {
    let mut transactions: HashMap<TransactionId, mpsc::Sender<JanusMessage>> = HashMap::new();

    loop {
        tokio::select! {
            cmd = cmd_receiver.recv() => {
                match cmd {
                    Some(TaskCmd::Register { id, sender }) => {
                        transactions.insert(id, sender);
                    }
                    Some(TaskCmd::Unregister(id)) => {
                        transactions.remove(&id);
                    }
                    None => {
                        tracing::debug!("janus client dropped, ending receive loop");
                        return;
                    }
                }
            }
            frame = stream.next() => {
                let Some(frame) = frame else {
                    tracing::info!("janus websocket closed");
                    return;
                };

                let text = match frame {
                    Ok(msg) if msg.is_text() => msg.into_text().expect("checked is_text"),
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::warn!(?err, "janus websocket error");
                        return;
                    }
                };

                let parsed: Result<JanusMessage, _> = serde_json::from_str(&text);
                match parsed {
                    Ok(msg) => dispatch(msg, &mut transactions, &events).await,
                    Err(err) => tracing::warn!(?err, raw = %text, "received invalid json from janus"),
                }
            }
        }
    }
}

async fn dispatch(
    msg: JanusMessage,
    transactions: &mut HashMap<TransactionId, mpsc::Sender<JanusMessage>>,
    events: &broadcast::Sender<Arc<JanusMessage>>,
) {
    if let Some(id) = msg.transaction_id() {
        if let Some(sender) = transactions.get(id) {
            if sender.send(msg).await.is_err() {
                tracing::trace!("transaction receiver dropped before response arrived");
            }
            return;
        }
    }

    // No matching transaction: an unsolicited plugin push (participant
    // talking/leaving, publisher join, room destroyed, hangup...).
    let _ = events.send(Arc::new(msg));
}
