use serde::{Deserialize, Serialize};

/// `CreateRoom` request body (spec §6: Twirp RPC path, JSON fields).
#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub empty_timeout: u32,
    pub departure_timeout: u32,
    pub max_participants: u32,
    /// JSON-encoded metadata string, per spec §6.
    pub metadata: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub name: String,
    pub sid: String,
    pub creation_time: i64,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub num_participants: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteRoomRequest {
    pub room: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRoomsRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListRoomsResponse {
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomParticipantRequest {
    pub room: String,
    pub identity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListParticipantsRequest {
    pub room: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantInfo {
    pub identity: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub tracks: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListParticipantsResponse {
    #[serde(default)]
    pub participants: Vec<ParticipantInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateParticipantRequest {
    pub room: String,
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MuteTrackRequest {
    pub room: String,
    pub identity: String,
    pub track_sid: String,
    pub muted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSubscriptionsRequest {
    pub room: String,
    pub identity: String,
    pub track_sids: Vec<String>,
    pub subscribe: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendDataRequest {
    pub room: String,
    /// Base64-encoded payload, matching the wire convention of the Twirp
    /// data-channel RPC.
    pub data: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination_identities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRoomMetadataRequest {
    pub room: String,
    pub metadata: String,
}
