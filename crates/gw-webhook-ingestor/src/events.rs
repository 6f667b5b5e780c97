//! Closed event vocabulary accepted from the media server (spec §4.5).

use gw_domain::model::AudioTrackInfo;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
struct RawRoom {
    name: String,
    #[serde(default)]
    metadata: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawParticipant {
    identity: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTrack {
    sid: String,
    #[serde(default)]
    r#type: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    muted: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    room: Option<RawRoom>,
    #[serde(default)]
    participant: Option<RawParticipant>,
    #[serde(default)]
    track: Option<RawTrack>,
}

/// The closed set of events this system recognizes (spec §4.5). Anything
/// outside the vocabulary decodes as `Unknown` and is counted, not acted
/// on.
#[derive(Debug, Clone)]
pub enum Event {
    RoomStarted {
        room_name: String,
        room_metadata: Option<Value>,
    },
    RoomFinished {
        room_name: String,
    },
    ParticipantJoined {
        room_name: String,
        participant_identity: String,
    },
    ParticipantLeft {
        room_name: String,
        participant_identity: String,
    },
    TrackPublished {
        room_name: String,
        participant_identity: String,
        track: AudioTrackInfo,
        track_type: String,
    },
    TrackUnpublished {
        room_name: String,
        track_sid: String,
    },
    RecordingStarted {
        room_name: String,
    },
    RecordingFinished {
        room_name: String,
    },
    Unknown {
        event_type: String,
    },
}

impl Event {
    pub fn room_name(&self) -> Option<&str> {
        match self {
            Event::RoomStarted { room_name, .. }
            | Event::RoomFinished { room_name }
            | Event::ParticipantJoined { room_name, .. }
            | Event::ParticipantLeft { room_name, .. }
            | Event::TrackPublished { room_name, .. }
            | Event::TrackUnpublished { room_name, .. }
            | Event::RecordingStarted { room_name }
            | Event::RecordingFinished { room_name } => Some(room_name),
            Event::Unknown { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::RoomStarted { .. } => "room_started",
            Event::RoomFinished { .. } => "room_finished",
            Event::ParticipantJoined { .. } => "participant_joined",
            Event::ParticipantLeft { .. } => "participant_left",
            Event::TrackPublished { .. } => "track_published",
            Event::TrackUnpublished { .. } => "track_unpublished",
            Event::RecordingStarted { .. } => "recording_started",
            Event::RecordingFinished { .. } => "recording_finished",
            Event::Unknown { .. } => "unknown",
        }
    }
}

/// Parses a raw webhook body into the closed `Event` vocabulary. Returns
/// `Err` only for malformed JSON (spec §6: 400 invalid JSON); an
/// unrecognized `event` field is not an error, it decodes as `Unknown`.
pub fn parse(body: &[u8]) -> Result<Event, serde_json::Error> {
    let raw: RawEvent = serde_json::from_slice(body)?;
    let room_name = raw.room.as_ref().map(|r| r.name.clone()).unwrap_or_default();

    let event = match raw.event.as_str() {
        "room_started" => Event::RoomStarted {
            room_name,
            room_metadata: raw
                .room
                .and_then(|r| r.metadata)
                .and_then(|m| serde_json::from_str(&m).ok()),
        },
        "room_finished" => Event::RoomFinished { room_name },
        "participant_joined" => Event::ParticipantJoined {
            room_name,
            participant_identity: raw.participant.map(|p| p.identity).unwrap_or_default(),
        },
        "participant_left" => Event::ParticipantLeft {
            room_name,
            participant_identity: raw.participant.map(|p| p.identity).unwrap_or_default(),
        },
        "track_published" => {
            let participant_identity = raw.participant.map(|p| p.identity).unwrap_or_default();
            let track = raw.track.unwrap_or(RawTrack {
                sid: String::new(),
                r#type: String::new(),
                source: String::new(),
                muted: false,
            });
            Event::TrackPublished {
                room_name,
                participant_identity: participant_identity.clone(),
                track: AudioTrackInfo {
                    track_sid: track.sid,
                    participant_identity,
                    source: track.source,
                    muted: track.muted,
                },
                track_type: track.r#type,
            }
        }
        "track_unpublished" => Event::TrackUnpublished {
            room_name,
            track_sid: raw.track.map(|t| t.sid).unwrap_or_default(),
        },
        "recording_started" => Event::RecordingStarted { room_name },
        "recording_finished" => Event::RecordingFinished { room_name },
        other => Event::Unknown {
            event_type: other.to_string(),
        },
    };

    Ok(event)
}

/// An audio/microphone-sourced track, the only kind that should start the
/// turn pipeline (spec §4.5: `track_published (type=audio, source=microphone)`).
pub fn is_microphone_audio(track: &AudioTrackInfo, track_type: &str) -> bool {
    track_type.eq_ignore_ascii_case("audio") && track.source.eq_ignore_ascii_case("microphone")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_room_started_with_metadata() {
        let body = br#"{"event":"room_started","room":{"name":"voice-ai-call-abc","metadata":"{\"caller\":\"+1\"}"}}"#;
        let event = parse(body).unwrap();
        match event {
            Event::RoomStarted { room_name, room_metadata } => {
                assert_eq!(room_name, "voice-ai-call-abc");
                assert_eq!(room_metadata.unwrap()["caller"], "+1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_event_type_decodes_as_unknown() {
        let body = br#"{"event":"egress_ended"}"#;
        let event = parse(body).unwrap();
        assert_eq!(event.kind(), "unknown");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse(b"not json").is_err());
    }

    #[test]
    fn track_published_captures_audio_track_info() {
        let body = br#"{"event":"track_published","room":{"name":"voice-ai-call-x"},"participant":{"identity":"caller"},"track":{"sid":"TR_1","type":"audio","source":"microphone","muted":false}}"#;
        let event = parse(body).unwrap();
        match event {
            Event::TrackPublished { track, track_type, .. } => {
                assert_eq!(track.track_sid, "TR_1");
                assert_eq!(track.source, "microphone");
                assert!(is_microphone_audio(&track, &track_type));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
