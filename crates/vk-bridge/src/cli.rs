use bridge::Settings;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vk-bridge",
    version,
    about = "Bridges a Janus room to a streaming AI backend over plain RTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bridge until interrupted (the default when no subcommand is given).
    Serve(ServeArgs),
    /// Start the bridge, print one status snapshot as JSON, then stop.
    Get(ServeArgs),
    /// Validate configuration without contacting Janus or the AI backend.
    Health(ServeArgs),
    /// Print the binary's version and exit.
    Version,
}

#[derive(Args, Clone, Default)]
pub struct ServeArgs {
    /// Path to a TOML config file; missing is not an error.
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long)]
    pub room: Option<u64>,
    #[arg(long = "janus-url")]
    pub janus_url: Option<String>,
    #[arg(long = "rtp-host")]
    pub rtp_host: Option<String>,
    #[arg(long = "rtp-port")]
    pub rtp_port: Option<u16>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub voice: Option<String>,
    #[arg(long = "system-prompt")]
    pub system_prompt: Option<String>,
    /// Forces DEBUG-level logging regardless of configured log_level.
    #[arg(long, short)]
    pub verbose: bool,
    #[arg(long = "debug-audio")]
    pub debug_audio: bool,
}

/// CLI flags win over whatever `Settings::load` already resolved from file
/// and environment, matching the precedence order in the external
/// interfaces section: CLI > env > file > default.
pub fn apply_overrides(settings: &mut Settings, args: &ServeArgs) {
    if let Some(room) = args.room {
        settings.janus.room_id = room;
    }
    if let Some(url) = &args.janus_url {
        settings.janus.ws_url = url.clone();
    }
    if let Some(host) = &args.rtp_host {
        settings.audio.rtp_host = host.clone();
    }
    if let Some(port) = args.rtp_port {
        settings.audio.rtp_port = port;
    }
    if let Some(model) = &args.model {
        settings.ai.model = model.clone();
    }
    if let Some(voice) = &args.voice {
        settings.ai.voice = voice.clone();
    }
    if let Some(prompt) = &args.system_prompt {
        settings.ai.system_instruction = Some(prompt.clone());
    }
    if args.debug_audio {
        settings.audio.debug_audio = true;
    }
    if args.verbose {
        settings.log_level = "DEBUG".to_string();
    }
}
