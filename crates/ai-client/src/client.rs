use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::error::Error;
use crate::message::ServerMessage;
use crate::requests;
use crate::transport::{self, WsSink, WsStream};

const GEMINI_LIVE_WS_URL: &str = "wss://generativelanguage.googleapis.com/ws/\
    google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub system_instruction: Option<String>,
}

/// Events pushed out of the background receive loop. One `AiClient` method
/// call never blocks on these directly; callers drain them from the
/// receiver returned by [`AiClient::connect`].
#[derive(Debug, Clone)]
pub enum AiEvent {
    SetupComplete,
    Audio(Vec<u8>),
    Text(String),
    TurnComplete,
    Interrupted,
    ToolCall(serde_json::Value),
    ToolCallCancellation,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AiStats {
    pub connected: bool,
    pub setup_complete: bool,
    pub is_speaking: bool,
    pub audio_chunks_sent: u64,
    pub audio_chunks_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Default)]
struct Counters {
    audio_chunks_sent: AtomicU64,
    audio_chunks_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

/// A bidirectional streaming connection to the Gemini Live API.
///
/// Manages the websocket, the setup handshake, and turn/interruption state.
/// Audio input is PCM16 @ 16kHz, audio output PCM16 @ 24kHz; this client
/// doesn't resample or transcode, it only moves bytes and base64.
pub struct AiClient {
    sink: Arc<WsSink>,
    connected: Arc<AtomicBool>,
    setup_complete: Arc<AtomicBool>,
    is_speaking: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl AiClient {
    /// Connects, sends the setup message, and waits (up to 5s) for
    /// `setupComplete` before returning.
    pub async fn connect(config: &AiConfig) -> Result<(Self, mpsc::Receiver<AiEvent>), Error> {
        if config.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }

        let url = format!("{GEMINI_LIVE_WS_URL}?key={}", config.api_key);
        let (sink, stream) = transport::connect(&url).await?;
        tracing::info!("connected to gemini live api");

        let connected = Arc::new(AtomicBool::new(true));
        let setup_complete = Arc::new(AtomicBool::new(false));
        let is_speaking = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());

        let (events_tx, events_rx) = mpsc::channel(64);
        let (setup_tx, setup_rx) = oneshot::channel();

        tokio::spawn(receive_loop(
            stream,
            events_tx,
            Arc::clone(&connected),
            Arc::clone(&setup_complete),
            Arc::clone(&is_speaking),
            Arc::clone(&counters),
            setup_tx,
        ));

        let client = Self {
            sink: Arc::new(sink),
            connected,
            setup_complete,
            is_speaking,
            counters,
        };
        client.send_setup(config).await?;

        match timeout(Duration::from_secs(5), setup_rx).await {
            Ok(Ok(())) => {
                tracing::info!("gemini session ready");
                Ok((client, events_rx))
            }
            Ok(Err(_)) => Err(Error::NotConnected),
            Err(_) => {
                tracing::error!("timeout waiting for gemini setup");
                let _ = client.close().await;
                Err(Error::SetupTimeout)
            }
        }
    }

    async fn send_setup(&self, config: &AiConfig) -> Result<(), Error> {
        let setup = requests::SetupRequest {
            setup: requests::SetupConfig {
                model: config.model.clone(),
                generation_config: requests::GenerationConfig {
                    response_modalities: vec!["AUDIO"],
                    media_resolution: "MEDIA_RESOLUTION_MEDIUM",
                    speech_config: requests::SpeechConfig {
                        voice_config: requests::VoiceConfig {
                            prebuilt_voice_config: requests::PrebuiltVoiceConfig {
                                voice_name: config.voice.clone(),
                            },
                        },
                    },
                },
                tools: Vec::new(),
                system_instruction: config.system_instruction.clone().map(|text| {
                    requests::SystemInstruction {
                        parts: vec![requests::TextPart { text }],
                    }
                }),
            },
        };

        tracing::info!(model = %config.model, voice = %config.voice, "sending gemini setup");
        self.send(&setup).await
    }

    async fn send(&self, msg: &impl Serialize) -> Result<(), Error> {
        let text = serde_json::to_string(msg)?;
        self.sink.send_json(&text).await
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Both `send_audio` and `send_image` require this, returning `false`
    /// rather than erroring when the session isn't ready yet.
    pub fn is_ready(&self) -> bool {
        self.connected.load(Ordering::Relaxed) && self.setup_complete.load(Ordering::Relaxed)
    }

    /// Sends PCM16 @ 16kHz audio. Returns `false` (not an error) if the
    /// session isn't connected and set up yet.
    pub async fn send_audio(&self, pcm: &[u8]) -> bool {
        if !self.is_ready() {
            tracing::debug!("cannot send audio: not connected or setup incomplete");
            return false;
        }

        let msg = requests::RealtimeInputAudio {
            realtime_input: requests::MediaChunksInput {
                media_chunks: vec![requests::MediaChunk {
                    mime_type: "audio/pcm;rate=16000".to_string(),
                    data: BASE64.encode(pcm),
                }],
            },
        };

        if self.send(&msg).await.is_err() {
            return false;
        }

        self.counters.audio_chunks_sent.fetch_add(1, Ordering::Relaxed);
        self.counters
            .bytes_sent
            .fetch_add(pcm.len() as u64, Ordering::Relaxed);
        true
    }

    /// Sends an image frame (JPEG recommended) for visual understanding.
    pub async fn send_image(&self, image: &[u8], mime_type: &str) -> bool {
        if !self.is_ready() {
            tracing::debug!("cannot send image: not connected or setup incomplete");
            return false;
        }

        let msg = requests::RealtimeInputImage {
            realtime_input: requests::MediaInput {
                media: requests::Media {
                    mime_type: mime_type.to_string(),
                    data: BASE64.encode(image),
                },
            },
        };

        self.send(&msg).await.is_ok()
    }

    pub async fn send_text(&self, text: &str, end_of_turn: bool) -> bool {
        if !self.connected.load(Ordering::Relaxed) {
            return false;
        }

        let msg = requests::ClientContentRequest {
            client_content: requests::ClientContent {
                turns: vec![requests::Turn {
                    role: "user",
                    parts: vec![requests::TextPart { text: text.to_string() }],
                }],
                turn_complete: end_of_turn,
            },
        };

        self.send(&msg).await.is_ok()
    }

    pub async fn send_tool_response(&self, function_responses: Vec<serde_json::Value>) -> bool {
        if !self.connected.load(Ordering::Relaxed) {
            return false;
        }

        let msg = requests::ToolResponseRequest {
            tool_response: requests::ToolResponseBody { function_responses },
        };

        self.send(&msg).await.is_ok()
    }

    pub fn stats(&self) -> AiStats {
        AiStats {
            connected: self.connected.load(Ordering::Relaxed),
            setup_complete: self.setup_complete.load(Ordering::Relaxed),
            is_speaking: self.is_speaking.load(Ordering::Relaxed),
            audio_chunks_sent: self.counters.audio_chunks_sent.load(Ordering::Relaxed),
            audio_chunks_received: self.counters.audio_chunks_received.load(Ordering::Relaxed),
            bytes_sent: self.counters.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes_received.load(Ordering::Relaxed),
        }
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.connected.store(false, Ordering::Relaxed);
        self.setup_complete.store(false, Ordering::Relaxed);
        self.sink.close().await
    }
}

async fn receive_loop(
    mut stream: WsStream,
    events: mpsc::Sender<AiEvent>,
    connected: Arc<AtomicBool>,
    setup_complete: Arc<AtomicBool>,
    is_speaking: Arc<AtomicBool>,
    counters: Arc<Counters>,
    mut setup_tx: Option<oneshot::Sender<()>>,
) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(msg) if msg.is_text() => msg.into_text().expect("checked is_text"),
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(?err, "gemini websocket error");
                break;
            }
        };

        let server_msg: ServerMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(?err, raw = %text, "received invalid json from gemini");
                continue;
            }
        };

        if server_msg.setup_complete.is_some() {
            setup_complete.store(true, Ordering::Relaxed);
            tracing::info!("gemini setup complete");
            if let Some(tx) = setup_tx.take() {
                let _ = tx.send(());
            }
            let _ = events.send(AiEvent::SetupComplete).await;
            continue;
        }

        if let Some(content) = server_msg.server_content {
            if content.interrupted {
                is_speaking.store(false, Ordering::Relaxed);
                tracing::debug!("gemini interrupted by user");
                let _ = events.send(AiEvent::Interrupted).await;
                continue;
            }

            if content.turn_complete {
                is_speaking.store(false, Ordering::Relaxed);
                tracing::debug!("gemini turn complete");
                let _ = events.send(AiEvent::TurnComplete).await;
            }

            for part in content.model_turn.map(|t| t.parts).unwrap_or_default() {
                if let Some(inline) = part.inline_data {
                    if inline.mime_type.starts_with("audio/pcm") {
                        match BASE64.decode(&inline.data) {
                            Ok(bytes) => {
                                is_speaking.store(true, Ordering::Relaxed);
                                counters.audio_chunks_received.fetch_add(1, Ordering::Relaxed);
                                counters
                                    .bytes_received
                                    .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                                let _ = events.send(AiEvent::Audio(bytes)).await;
                            }
                            Err(err) => {
                                tracing::warn!(?err, "invalid base64 audio from gemini");
                            }
                        }
                    }
                }

                if let Some(text) = part.text {
                    tracing::debug!(%text, "gemini text");
                    let _ = events.send(AiEvent::Text(text)).await;
                }
            }
        }

        if let Some(tool_call) = server_msg.tool_call {
            tracing::info!(?tool_call, "tool call received");
            let _ = events.send(AiEvent::ToolCall(tool_call)).await;
        }

        if server_msg.tool_call_cancellation.is_some() {
            tracing::info!("tool call cancelled");
            let _ = events.send(AiEvent::ToolCallCancellation).await;
        }
    }

    connected.store(false, Ordering::Relaxed);
    tracing::info!(
        sent = counters.audio_chunks_sent.load(Ordering::Relaxed),
        received = counters.audio_chunks_received.load(Ordering::Relaxed),
        "gemini connection closed"
    );
}
