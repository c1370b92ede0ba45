//! Configuration loading: one `Settings` struct populated from an optional
//! TOML file overlaid by `VKBRIDGE_`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::Error;

fn default_janus_ws_url() -> String {
    "ws://localhost:8188".to_string()
}

fn default_room_id() -> u64 {
    1234
}

fn default_display_name() -> String {
    "AI Assistant".to_string()
}

fn default_rtp_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rtp_port() -> u16 {
    5004
}

fn default_video_rtp_port() -> u16 {
    5006
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_voice() -> String {
    "Puck".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_debug_audio_dir() -> String {
    "./debug_audio".to_string()
}

fn default_sampling_rate() -> u32 {
    48_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct JanusSettings {
    #[serde(default = "default_janus_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_room_id")]
    pub room_id: u64,
    #[serde(default = "default_display_name")]
    pub display: String,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: u32,
}

impl Default for JanusSettings {
    fn default() -> Self {
        Self {
            ws_url: default_janus_ws_url(),
            room_id: default_room_id(),
            display: default_display_name(),
            sampling_rate: default_sampling_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_rtp_host")]
    pub rtp_host: String,
    #[serde(default = "default_rtp_port")]
    pub rtp_port: u16,
    #[serde(default = "default_video_rtp_port")]
    pub video_rtp_port: u16,
    #[serde(default)]
    pub debug_audio: bool,
    #[serde(default = "default_debug_audio_dir")]
    pub debug_audio_dir: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            rtp_host: default_rtp_host(),
            rtp_port: default_rtp_port(),
            video_rtp_port: default_video_rtp_port(),
            debug_audio: false,
            debug_audio_dir: default_debug_audio_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    pub system_instruction: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            voice: default_voice(),
            system_instruction: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub janus: JanusSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path to a Silero-style ONNX VAD model. When unset the detector fails
    /// open: every buffer is treated as speech.
    pub vad_model_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            janus: JanusSettings::default(),
            audio: AudioSettings::default(),
            ai: AiSettings::default(),
            log_level: default_log_level(),
            vad_model_path: None,
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file (missing file is not an
    /// error, env vars and defaults may fully supply the configuration),
    /// overlaid by `VKBRIDGE__SECTION__FIELD`-style environment variables.
    pub fn load(file_name: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file_name) = file_name {
            builder = builder.add_source(File::new(file_name, FileFormat::Toml).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("VKBRIDGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Validates the loaded settings before any component is constructed,
    /// matching the strict startup-ordering step 1 in the orchestrator.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ai.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        if !(1024..65535).contains(&self.audio.rtp_port) {
            return Err(Error::InvalidRtpPort(self.audio.rtp_port));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_spec() {
        let settings = Settings::default();
        assert_eq!(settings.audio.rtp_port, 5004);
        assert_eq!(settings.audio.video_rtp_port, 5006);
        assert_eq!(settings.log_level, "INFO");
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let settings = Settings::default();
        assert!(matches!(settings.validate(), Err(Error::MissingApiKey)));
    }

    #[test]
    fn validate_rejects_out_of_range_rtp_port() {
        let mut settings = Settings::default();
        settings.ai.api_key = "key".to_string();
        settings.audio.rtp_port = 80;
        assert!(matches!(settings.validate(), Err(Error::InvalidRtpPort(80))));
    }

    #[test]
    fn validate_accepts_a_complete_config() {
        let mut settings = Settings::default();
        settings.ai.api_key = "key".to_string();
        assert!(settings.validate().is_ok());
    }
}
