//! Wire types for the inbound WebSocket media stream and the outbound
//! control frame.
//!
//! Inbound frames are JSON objects discriminated by a `kind` field.
//! Payload containers accept both the camelCase and PascalCase spellings
//! (`audioData`/`AudioData`, `dtmfData`/`DtmfData`) via `serde(alias)` —
//! §9's decision on the dual-spelling open question.

use serde::{Deserialize, Serialize};

/// An inbound WebSocket media-stream frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum InboundFrame {
    AudioMetadata {
        #[serde(rename = "audioMetadata")]
        audio_metadata: AudioMetadataPayload,
    },
    AudioData {
        #[serde(alias = "AudioData", rename(deserialize = "audioData"))]
        audio_data: AudioDataPayload,
    },
    DtmfData {
        #[serde(alias = "DtmfData", rename(deserialize = "dtmfData"))]
        dtmf_data: DtmfDataPayload,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetadataPayload {
    pub subscription_id: String,
    pub encoding: String,
    pub sample_rate: u32,
    pub channels: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioDataPayload {
    pub data: String,
    #[serde(default = "default_silent")]
    pub silent: bool,
}

fn default_silent() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DtmfDataPayload {
    pub data: String,
}

/// The outbound control frame sent exactly once per barge-in event.
#[derive(Debug, Clone, Serialize)]
pub struct StopAudioFrame {
    #[serde(rename = "Kind")]
    pub kind: &'static str,
    #[serde(rename = "AudioData")]
    pub audio_data: Option<()>,
    #[serde(rename = "StopAudio")]
    pub stop_audio: StopAudioBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopAudioBody {}

impl Default for StopAudioFrame {
    fn default() -> Self {
        Self {
            kind: "StopAudio",
            audio_data: None,
            stop_audio: StopAudioBody {},
        }
    }
}

impl StopAudioFrame {
    /// Serialize to the exact JSON shape fixed by the wire protocol:
    /// `{"Kind":"StopAudio","AudioData":null,"StopAudio":{}}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("StopAudioFrame always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_audio_data() {
        let raw = r#"{"kind":"AudioData","audioData":{"data":"abc","silent":false}}"#;
        let frame: InboundFrame = serde_json::from_str(raw).unwrap();
        match frame {
            InboundFrame::AudioData { audio_data } => {
                assert_eq!(audio_data.data, "abc");
                assert!(!audio_data.silent);
            }
            _ => panic!("expected AudioData"),
        }
    }

    #[test]
    fn parses_capitalized_audio_data_alias() {
        let raw = r#"{"kind":"AudioData","AudioData":{"data":"xyz","silent":true}}"#;
        let frame: InboundFrame = serde_json::from_str(raw).unwrap();
        match frame {
            InboundFrame::AudioData { audio_data } => {
                assert_eq!(audio_data.data, "xyz");
                assert!(audio_data.silent);
            }
            _ => panic!("expected AudioData"),
        }
    }

    #[test]
    fn silent_defaults_to_true_when_absent() {
        let raw = r#"{"kind":"AudioData","audioData":{"data":"abc"}}"#;
        let frame: InboundFrame = serde_json::from_str(raw).unwrap();
        match frame {
            InboundFrame::AudioData { audio_data } => assert!(audio_data.silent),
            _ => panic!("expected AudioData"),
        }
    }

    #[test]
    fn parses_audio_metadata() {
        let raw = r#"{"kind":"AudioMetadata","audioMetadata":{"subscriptionId":"s","encoding":"PCM","sampleRate":16000,"channels":1}}"#;
        let frame: InboundFrame = serde_json::from_str(raw).unwrap();
        match frame {
            InboundFrame::AudioMetadata { audio_metadata } => {
                assert_eq!(audio_metadata.subscription_id, "s");
                assert_eq!(audio_metadata.sample_rate, 16000);
            }
            _ => panic!("expected AudioMetadata"),
        }
    }

    #[test]
    fn malformed_json_fails_to_parse() {
        let raw = "not json";
        let result: Result<InboundFrame, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn stop_audio_frame_serializes_to_fixed_shape() {
        let frame = StopAudioFrame::default();
        assert_eq!(
            frame.to_json(),
            r#"{"Kind":"StopAudio","AudioData":null,"StopAudio":{}}"#
        );
    }
}
