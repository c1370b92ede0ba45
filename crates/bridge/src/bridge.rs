//! The orchestrator: wires together the Janus AudioBridge participant, the
//! optional VideoRoom subscriber, the AI streaming client, and the two
//! audio pumps that move media between them.
//!
//! Startup is strictly ordered (the RTP receiver must be bound and
//! listening before Janus is told about it) and every long-lived piece of
//! I/O runs on its own task, communicating only through channels and a
//! handful of atomics. No mutable state crosses a task boundary by
//! reference.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_client::{AiClient, AiConfig, AiEvent};
use audio_codec::AudioProcessor;
use janus_client::message::PluginData;
use janus_client::{
    AudioBridgeClient, AudioBridgeConfig, JanusMessage, ParticipantId, RoomId, VideoRoomClient,
    VideoRoomConfig,
};
use jitter_buffer::JitterBuffer;
use parking_lot::{Mutex as PlMutex, RwLock};
use rtp_core::{RtpPacket, RtpReceiver, RtpSender};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use vad::VoiceActivityDetector;
use video_pipeline::VideoPipeline;

use crate::debug_audio::DebugAudioWriter;
use crate::error::Error;
use crate::fifo::BoundedFifo;
use crate::settings::Settings;
use crate::stats::{AgentState, BridgeStats};
use crate::status::{
    AiStatus, AudioProcessorStatus, AudioStatus, BridgeStatus, JanusStatus, JitterBufferStatus,
    RtpStatus, VadStatus,
};

/// 100ms of 16kHz mono PCM16, the forward pump's send granularity.
const FORWARD_SEND_THRESHOLD_BYTES: usize = 3_200;
/// 20ms of 48kHz mono PCM16, one Opus frame.
const FRAME_SAMPLES: u32 = 960;
/// Slightly under 20ms so the playback pipeline never starves waiting on
/// the pacing sleep.
const PLAYBACK_PACE: Duration = Duration::from_millis(18);
const JANUS_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(25);
const GREETING_DELAY: Duration = Duration::from_millis(1_500);
const INCOMING_QUEUE_CAPACITY: usize = 100;
const OUTGOING_QUEUE_CAPACITY: usize = 100;
/// Delay before the single reconnect attempt after the AI stream closes.
const AI_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Shared handle to the current AI client. Reconnecting replaces the whole
/// client (new socket, new event channel), so every task that needs it
/// re-fetches a fresh `Arc` instead of holding one for its whole lifetime.
/// The lock is never held across an `.await`.
type AiCell = Arc<PlMutex<Arc<AiClient>>>;

pub struct Bridge {
    state: Arc<RwLock<AgentState>>,
    stats: Arc<BridgeStats>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    tasks: PlMutex<Vec<JoinHandle<()>>>,

    room: u64,
    participant_id: Option<u64>,
    janus_connected: Arc<AtomicBool>,
    rtp_receiver_running: Arc<AtomicBool>,

    ai: AiCell,
    audio_processor: Arc<PlMutex<AudioProcessor>>,
    jitter_buffer: Arc<PlMutex<JitterBuffer>>,
    vad: Arc<PlMutex<VoiceActivityDetector>>,
}

impl Bridge {
    /// Brings up every component in strict order, binding the RTP receiver
    /// before contacting Janus, and starts its background workers. Video is
    /// best-effort: a failure there is logged and the bridge continues
    /// audio-only.
    pub async fn start(settings: Settings) -> Result<Self, Error> {
        settings.validate()?;

        let state = Arc::new(RwLock::new(AgentState::Initializing));
        let stats = Arc::new(BridgeStats::new());
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        let audio_processor = Arc::new(PlMutex::new(AudioProcessor::new()?));

        let vad_model = match &settings.vad_model_path {
            Some(path) => match vad::VadModel::load(path, 16_000) {
                Ok(model) => Some(model),
                Err(err) => {
                    tracing::warn!(?err, "failed to load vad model, voice detection fails open");
                    None
                }
            },
            None => {
                tracing::info!("no vad model configured, voice detection fails open");
                None
            }
        };
        let vad = Arc::new(PlMutex::new(VoiceActivityDetector::new(vad_model, 0.5, 16_000)));
        let jitter_buffer = Arc::new(PlMutex::new(JitterBuffer::default()));

        let (debug_audio_in, debug_audio_out) = if settings.audio.debug_audio {
            (
                open_debug_writer(&settings.audio.debug_audio_dir, "janus_to_ai.wav", 16_000),
                open_debug_writer(&settings.audio.debug_audio_dir, "ai_to_janus.wav", 24_000),
            )
        } else {
            (None, None)
        };

        *state.write() = AgentState::Connecting;

        tracing::info!(
            host = %settings.audio.rtp_host,
            port = settings.audio.rtp_port,
            "binding audio rtp receiver before contacting janus"
        );
        let rtp_receiver = Arc::new(
            RtpReceiver::bind(&settings.audio.rtp_host, settings.audio.rtp_port).await?,
        );
        let rtp_receiver_running = Arc::new(AtomicBool::new(true));
        let (rtp_tx, rtp_rx) = mpsc::channel(INCOMING_QUEUE_CAPACITY);
        tasks.push(spawn_rtp_receiver(
            Arc::clone(&rtp_receiver),
            rtp_tx,
            Arc::clone(&rtp_receiver_running),
        ));

        let audiobridge_config = AudioBridgeConfig {
            url: settings.janus.ws_url.clone(),
            room: RoomId(settings.janus.room_id),
            display_name: settings.janus.display.clone(),
            rtp_host: settings.audio.rtp_host.clone(),
            rtp_port: settings.audio.rtp_port,
            sampling_rate: settings.janus.sampling_rate,
        };
        tracing::info!(url = %audiobridge_config.url, room = settings.janus.room_id, "joining janus audiobridge");
        let mut janus = AudioBridgeClient::connect(&audiobridge_config).await?;
        janus.ensure_room(&audiobridge_config).await?;
        janus.join(&audiobridge_config).await?;

        let participant_id = janus.participant_id();
        let (target_ip, target_port) = janus.rtp_target().ok_or(Error::Janus(
            janus_client::error::Error::InvalidResponse,
        ))?;
        let dest: SocketAddr = format!("{target_ip}:{target_port}")
            .parse()
            .map_err(|_| Error::Janus(janus_client::error::Error::InvalidResponse))?;

        let ssrc = participant_id.map(|id| id.0 as u32).unwrap_or(0);
        let rtp_sender = Arc::new(RtpSender::shared(&rtp_receiver, dest));
        let janus_connected = Arc::new(AtomicBool::new(true));

        let ai_config = AiConfig {
            api_key: settings.ai.api_key.clone(),
            model: settings.ai.model.clone(),
            voice: settings.ai.voice.clone(),
            system_instruction: settings.ai.system_instruction.clone(),
        };
        tracing::info!(model = %ai_config.model, "connecting to ai service");
        let (ai, ai_events) = AiClient::connect(&ai_config).await?;
        let ai: AiCell = Arc::new(PlMutex::new(Arc::new(ai)));

        if settings.audio.video_rtp_port != 0 {
            if let Err(err) = start_video(
                &settings,
                Arc::clone(&ai),
                Arc::clone(&shutdown),
                &mut tasks,
            )
            .await
            {
                tracing::warn!(?err, "video components unavailable, continuing audio-only");
            }
        }

        let playback_fifo = Arc::new(BoundedFifo::new(OUTGOING_QUEUE_CAPACITY));

        tasks.push(tokio::spawn(audio_forward_loop(
            rtp_rx,
            Arc::clone(&jitter_buffer),
            Arc::clone(&vad),
            Arc::clone(&audio_processor),
            Arc::clone(&ai),
            Arc::clone(&stats),
            Arc::clone(&shutdown),
            debug_audio_in,
        )));

        tasks.push(tokio::spawn(audio_playback_loop(
            Arc::clone(&playback_fifo),
            Arc::clone(&audio_processor),
            rtp_sender,
            ssrc,
            Arc::clone(&stats),
            Arc::clone(&shutdown),
            debug_audio_out,
        )));

        tasks.push(tokio::spawn(ai_events_loop(
            ai_events,
            Arc::clone(&ai),
            ai_config,
            playback_fifo,
            Arc::clone(&stats),
            Arc::clone(&state),
            Arc::clone(&running),
            Arc::clone(&shutdown),
        )));

        tasks.push(tokio::spawn(janus_events_loop(
            janus,
            Arc::clone(&ai),
            settings.audio.rtp_host.clone(),
            settings.audio.rtp_port,
            Arc::clone(&stats),
            Arc::clone(&janus_connected),
            Arc::clone(&shutdown),
        )));

        *state.write() = AgentState::Ready;
        tracing::info!("bridge ready");

        Ok(Self {
            state,
            stats,
            running,
            shutdown,
            tasks: PlMutex::new(tasks),
            room: settings.janus.room_id,
            participant_id: participant_id.map(|p| p.0),
            janus_connected,
            rtp_receiver_running,
            ai,
            audio_processor,
            jitter_buffer,
            vad,
        })
    }

    pub fn state(&self) -> AgentState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> BridgeStatus {
        let ai_stats = Arc::clone(&self.ai.lock()).stats();

        let processor_stats = {
            let processor = self.audio_processor.lock();
            let s = processor.stats();
            AudioProcessorStatus {
                decode_count: s.decode_count.load(Ordering::Relaxed),
                encode_count: s.encode_count.load(Ordering::Relaxed),
                decode_errors: s.decode_errors.load(Ordering::Relaxed),
                encode_errors: s.encode_errors.load(Ordering::Relaxed),
            }
        };

        let jitter_stats: JitterBufferStatus = self.jitter_buffer.lock().stats().into();
        let vad_stats: VadStatus = self.vad.lock().stats().into();

        BridgeStatus {
            state: self.state(),
            running: self.is_running(),
            is_speaking: ai_stats.is_speaking,
            janus: JanusStatus {
                connected: self.janus_connected.load(Ordering::Relaxed),
                room: self.room,
                participant_id: self.participant_id,
            },
            ai: AiStatus {
                connected: ai_stats.connected,
                ready: ai_stats.setup_complete,
                is_speaking: ai_stats.is_speaking,
            },
            audio: AudioStatus {
                processor_ready: true,
                processor_stats,
            },
            rtp: RtpStatus {
                receiver_running: self.rtp_receiver_running.load(Ordering::Relaxed),
                sender_running: self.is_running(),
                jitter_buffer: jitter_stats,
            },
            vad: vad_stats,
            stats: self.stats.snapshot(),
        }
    }

    /// Tears the bridge down: AI first, then every other worker is woken to
    /// close its own connection and exit. Best-effort throughout, a
    /// component that doesn't shut down cleanly is logged, not retried.
    pub async fn shutdown(&self) {
        tracing::info!("stopping bridge");
        *self.state.write() = AgentState::Stopping;
        self.running.store(false, Ordering::Relaxed);

        let ai = Arc::clone(&self.ai.lock());
        if let Err(err) = ai.close().await {
            tracing::warn!(?err, "error closing ai client");
        }

        self.shutdown.notify_waiters();

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if tokio::time::timeout(Duration::from_secs(3), task).await.is_err() {
                tracing::warn!("a worker task did not exit within the shutdown grace period");
            }
        }

        *self.state.write() = AgentState::Stopped;
        tracing::info!("bridge stopped");
    }
}

fn open_debug_writer(dir: &str, file_name: &str, sample_rate: u32) -> Option<Arc<DebugAudioWriter>> {
    match DebugAudioWriter::create(dir, file_name, sample_rate) {
        Ok(writer) => Some(Arc::new(writer)),
        Err(err) => {
            tracing::warn!(?err, dir, file_name, "failed to open debug audio file");
            None
        }
    }
}

fn spawn_rtp_receiver(
    receiver: Arc<RtpReceiver>,
    tx: mpsc::Sender<RtpPacket>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        receiver.run(tx).await;
        running.store(false, Ordering::Relaxed);
    })
}

async fn start_video(
    settings: &Settings,
    ai: AiCell,
    shutdown: Arc<Notify>,
    tasks: &mut Vec<JoinHandle<()>>,
) -> Result<(), Error> {
    let video_receiver = Arc::new(
        RtpReceiver::bind(&settings.audio.rtp_host, settings.audio.video_rtp_port).await?,
    );
    let (video_tx, video_rx) = mpsc::channel(64);
    tasks.push(tokio::spawn(async move {
        video_receiver.run(video_tx).await;
    }));

    let config = VideoRoomConfig {
        url: settings.janus.ws_url.clone(),
        room: RoomId(settings.janus.room_id),
        display_name: settings.janus.display.clone(),
        rtp_video_host: settings.audio.rtp_host.clone(),
        rtp_video_port: settings.audio.video_rtp_port,
    };
    let mut client = VideoRoomClient::connect(&config).await?;
    client.join(&config).await?;

    tasks.push(tokio::spawn(video_loop(
        client, config, video_rx, ai, shutdown,
    )));
    Ok(())
}

/// Janus→AI: decode and resample incoming Opus, accumulate into 100ms
/// chunks, discard them outright while the AI is speaking (feedback
/// prevention), otherwise gate on VAD before sending.
async fn audio_forward_loop(
    mut rx: mpsc::Receiver<RtpPacket>,
    jitter_buffer: Arc<PlMutex<JitterBuffer>>,
    vad: Arc<PlMutex<VoiceActivityDetector>>,
    audio_processor: Arc<PlMutex<AudioProcessor>>,
    ai: AiCell,
    stats: Arc<BridgeStats>,
    shutdown: Arc<Notify>,
    debug_audio: Option<Arc<DebugAudioWriter>>,
) {
    let mut buffer: Vec<u8> = Vec::with_capacity(FORWARD_SEND_THRESHOLD_BYTES * 2);

    loop {
        let packet = tokio::select! {
            _ = shutdown.notified() => return,
            packet = rx.recv() => match packet {
                Some(p) => p,
                None => {
                    tracing::debug!("rtp audio channel closed, exiting forward pump");
                    return;
                }
            },
        };

        stats.rtp_packets_received.fetch_add(1, Ordering::Relaxed);
        stats
            .rtp_bytes_received
            .fetch_add(packet.payload.len() as u64, Ordering::Relaxed);
        jitter_buffer.lock().put(packet);

        while let Some(packet) = jitter_buffer.lock().get() {
            let pcm = audio_processor.lock().janus_to_ai(&packet.payload);
            let Some(pcm) = pcm else {
                stats.decode_errors.fetch_add(1, Ordering::Relaxed);
                continue;
            };
            if let Some(writer) = &debug_audio {
                writer.write(&pcm);
            }
            buffer.extend_from_slice(&pcm);

            if buffer.len() < FORWARD_SEND_THRESHOLD_BYTES {
                continue;
            }

            let ai_snapshot = Arc::clone(&ai.lock());
            if ai_snapshot.stats().is_speaking {
                tracing::trace!("discarding forward buffer: ai is speaking");
            } else {
                let samples: Vec<i16> = buffer
                    .chunks_exact(2)
                    .map(|c| i16::from_le_bytes([c[0], c[1]]))
                    .collect();
                let is_speech = vad.lock().is_speech(&samples);
                if is_speech && ai_snapshot.send_audio(&buffer).await {
                    stats.audio_chunks_to_ai.fetch_add(1, Ordering::Relaxed);
                }
            }
            buffer.clear();
        }
    }
}

/// AI→Janus: encode each PCM chunk to 20ms Opus frames and pace them out at
/// roughly one every 18ms so the far end's jitter buffer never starves.
async fn audio_playback_loop(
    fifo: Arc<BoundedFifo<Vec<u8>>>,
    audio_processor: Arc<PlMutex<AudioProcessor>>,
    rtp_sender: Arc<RtpSender>,
    ssrc: u32,
    stats: Arc<BridgeStats>,
    shutdown: Arc<Notify>,
    debug_audio: Option<Arc<DebugAudioWriter>>,
) {
    let mut sequence_number: u16 = rand::random();
    let mut timestamp: u32 = 0;

    loop {
        let pcm = tokio::select! {
            _ = shutdown.notified() => return,
            pcm = fifo.recv() => pcm,
        };

        if let Some(writer) = &debug_audio {
            writer.write(&pcm);
        }

        let frames = audio_processor.lock().ai_to_janus(&pcm);
        stats.audio_chunks_from_ai.fetch_add(1, Ordering::Relaxed);

        for (i, frame) in frames.into_iter().enumerate() {
            let packet = RtpPacket::new(111, sequence_number, timestamp, ssrc, i == 0, frame);
            match rtp_sender.send(&packet).await {
                Ok(()) => {
                    stats.rtp_packets_sent.fetch_add(1, Ordering::Relaxed);
                    stats
                        .rtp_bytes_sent
                        .fetch_add(packet.payload.len() as u64, Ordering::Relaxed);
                }
                Err(err) => tracing::warn!(?err, "failed to send rtp audio frame"),
            }

            sequence_number = sequence_number.wrapping_add(1);
            timestamp = timestamp.wrapping_add(FRAME_SAMPLES);
            tokio::time::sleep(PLAYBACK_PACE).await;
        }
    }
}

async fn ai_events_loop(
    mut events: mpsc::Receiver<AiEvent>,
    ai_cell: AiCell,
    ai_config: AiConfig,
    playback_fifo: Arc<BoundedFifo<Vec<u8>>>,
    stats: Arc<BridgeStats>,
    state: Arc<RwLock<AgentState>>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.notified() => return,
            event = events.recv() => match event {
                Some(e) => e,
                None => {
                    if !running.load(Ordering::Relaxed) {
                        return;
                    }
                    tracing::warn!("ai event stream closed, reconnecting after delay");
                    match reconnect_ai(&ai_config, &shutdown).await {
                        Some((client, new_events)) => {
                            *ai_cell.lock() = Arc::new(client);
                            events = new_events;
                            tracing::info!("ai reconnected");
                            continue;
                        }
                        None => {
                            tracing::error!("ai reconnect failed, giving up");
                            return;
                        }
                    }
                }
            },
        };

        match event {
            AiEvent::SetupComplete => {
                tracing::info!("ai session ready");
                *state.write() = AgentState::Active;
            }
            AiEvent::Audio(pcm) => {
                if playback_fifo.push(pcm) {
                    tracing::trace!("outgoing audio fifo full, dropped oldest chunk");
                }
            }
            AiEvent::Text(text) => {
                tracing::debug!(%text, "ai text output");
            }
            AiEvent::TurnComplete => {
                // Trailing audio after turnComplete is legitimate; the fifo
                // is left alone, only is_speaking (owned by ai-client) is
                // cleared.
                stats.turns_completed.fetch_add(1, Ordering::Relaxed);
            }
            AiEvent::Interrupted => {
                stats.interruptions.fetch_add(1, Ordering::Relaxed);
                playback_fifo.clear();
            }
            AiEvent::ToolCall(call) => {
                tracing::info!(?call, "tool call received (unhandled)");
            }
            AiEvent::ToolCallCancellation => {
                tracing::info!("tool call cancelled");
            }
        }
    }
}

/// Waits out the reconnect delay (interruptible by shutdown) and attempts a
/// single `AiClient::connect`. No retry loop: a failure here is reported to
/// the caller, which leaves the stale client in place and gives up.
async fn reconnect_ai(
    ai_config: &AiConfig,
    shutdown: &Arc<Notify>,
) -> Option<(AiClient, mpsc::Receiver<AiEvent>)> {
    tokio::select! {
        _ = shutdown.notified() => None,
        _ = tokio::time::sleep(AI_RECONNECT_DELAY) => {
            match AiClient::connect(ai_config).await {
                Ok(pair) => Some(pair),
                Err(err) => {
                    tracing::error!(?err, "ai reconnect attempt failed");
                    None
                }
            }
        }
    }
}

async fn janus_events_loop(
    mut janus: AudioBridgeClient,
    ai: AiCell,
    rtp_host: String,
    rtp_port: u16,
    stats: Arc<BridgeStats>,
    janus_connected: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    let mut keepalive = tokio::time::interval(JANUS_KEEPALIVE_INTERVAL);
    keepalive.tick().await;
    let mut greeted: HashSet<ParticipantId> = HashSet::new();
    let mut forwarded: HashSet<ParticipantId> = HashSet::new();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                let _ = janus.close().await;
                janus_connected.store(false, Ordering::Relaxed);
                return;
            }
            _ = keepalive.tick() => {
                if let Err(err) = janus.keep_alive().await {
                    tracing::warn!(?err, "janus keepalive failed");
                    stats.janus_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
            event = janus.next_event() => {
                match event {
                    Some(msg) => {
                        handle_audiobridge_event(
                            &msg,
                            &janus,
                            &ai,
                            &stats,
                            &rtp_host,
                            rtp_port,
                            &mut greeted,
                            &mut forwarded,
                        )
                        .await;
                    }
                    None => {
                        tracing::error!("janus audiobridge connection closed unexpectedly");
                        janus_connected.store(false, Ordering::Relaxed);
                        return;
                    }
                }
            }
        }
    }
}

/// Greets each newly-seen participant and sets up per-publisher RTP
/// forwarding for them, independent of the mixed room audio the bridge
/// already receives. Both are idempotent per participant id: `greeted` and
/// `forwarded` are cleared only for ids that actually leave.
async fn handle_audiobridge_event(
    msg: &JanusMessage,
    janus: &AudioBridgeClient,
    ai: &AiCell,
    stats: &Arc<BridgeStats>,
    rtp_host: &str,
    rtp_port: u16,
    greeted: &mut HashSet<ParticipantId>,
    forwarded: &mut HashSet<ParticipantId>,
) {
    let JanusMessage::Event(event) = msg else {
        return;
    };
    let Some(PluginData::AudioBridge(data)) = &event.plugindata else {
        return;
    };

    if let Some(code) = data.error_code {
        tracing::warn!(?code, error = ?data.error, "audiobridge plugin error");
        stats.janus_errors.fetch_add(1, Ordering::Relaxed);
        return;
    }

    for participant in &data.participants {
        if greeted.insert(participant.id) {
            stats.participants_joined.fetch_add(1, Ordering::Relaxed);
            let ai_snapshot = Arc::clone(&ai.lock());
            schedule_greeting(ai_snapshot, participant.display.clone());
        }

        if forwarded.insert(participant.id) {
            match janus.rtp_forward(participant.id, rtp_host, rtp_port).await {
                Ok(()) => {
                    tracing::info!(publisher = participant.id.0, "rtp forwarding configured");
                }
                Err(err) => {
                    tracing::warn!(?err, publisher = participant.id.0, "rtp forward request failed");
                    stats.janus_errors.fetch_add(1, Ordering::Relaxed);
                    forwarded.remove(&participant.id);
                }
            }
        }
    }

    if let Some(leaving) = data.leaving {
        greeted.remove(&leaving);
        forwarded.remove(&leaving);
    }
}

/// Waits for RTP forwarding to stabilize, then asks the AI to greet the new
/// arrival by name with a generic instruction. Persona and wording are
/// operator-configurable via the system instruction, not hardcoded here.
fn schedule_greeting(ai: Arc<AiClient>, display_name: String) {
    tokio::spawn(async move {
        tokio::time::sleep(GREETING_DELAY).await;
        if !ai.is_ready() {
            tracing::debug!(%display_name, "skipping greeting, ai not ready");
            return;
        }
        let greeting = format!(
            "A new participant named {display_name} just joined the room. Greet them warmly by name."
        );
        if !ai.send_text(&greeting, true).await {
            tracing::debug!(%display_name, "failed to send greeting");
        }
    });
}

async fn video_loop(
    mut client: VideoRoomClient,
    config: VideoRoomConfig,
    mut rx: mpsc::Receiver<RtpPacket>,
    ai: AiCell,
    shutdown: Arc<Notify>,
) {
    let mut pipeline = match VideoPipeline::new(1.0) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::warn!(?err, "failed to start video pipeline, disabling video");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                let _ = client.close().await;
                return;
            }
            event = client.next_event() => {
                match event {
                    Some(msg) => {
                        if let Some(publisher) = client.apply_event(&msg) {
                            tracing::info!(publisher = publisher.id.0, "new video publisher, subscribing");
                            if let Err(err) = client.subscribe_to_publisher(&config, publisher.id).await {
                                tracing::warn!(?err, "failed to subscribe to publisher video");
                            }
                        }
                    }
                    None => {
                        tracing::warn!("videoroom connection closed");
                        return;
                    }
                }
            }
            packet = rx.recv() => {
                let Some(packet) = packet else { return };
                let (jpeg, needs_keyframe) = pipeline.process_packet(&packet);
                if let Some(jpeg) = jpeg {
                    let ai_snapshot = Arc::clone(&ai.lock());
                    ai_snapshot.send_image(&jpeg, "image/jpeg").await;
                }
                if needs_keyframe {
                    let publishers: Vec<_> = client.publishers().map(|p| p.id).collect();
                    for publisher_id in publishers {
                        if let Err(err) = client.request_keyframe(&config, publisher_id).await {
                            tracing::warn!(?err, "keyframe re-request failed");
                        }
                    }
                }
            }
        }
    }
}
