//! Game-lifecycle event push.
//!
//! Each event is one POST to the platform's `push_event` operation carrying
//! an [`EventEnvelope`]: the event name, the target game id, a millisecond
//! timestamp, and an event-specific `data` object. Callers are responsible
//! for sequencing dependent events (`user_in` before `game_start` and so
//! on); this layer offers no ordering guarantees between independent calls.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::SudClient;
use crate::endpoints::ApiOperation;
use crate::errors::{Error, Result};

/// Fee charged per game round when the caller passes zero
const DEFAULT_PER_GAME_DIAMOND: u64 = 1000;

/// Game-lifecycle events understood by the platform's game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A user joined the game area
    UserIn,
    /// A user left the game area
    UserOut,
    /// A user toggled readiness
    UserReady,
    /// The round begins
    GameStart,
    /// The room captain changed
    CaptainChange,
    /// A user was kicked from the game
    UserKick,
    /// The round is force-ended
    GameEnd,
    /// AI players join the room
    AiAdd,
    /// Request the room's seat list
    RoomInfo,
    /// Clear all game state for the room
    RoomClear,
    /// The room's game instance is created
    GameCreate,
    /// The room's game instance is deleted
    GameDelete,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UserIn => "user_in",
            Self::UserOut => "user_out",
            Self::UserReady => "user_ready",
            Self::GameStart => "game_start",
            Self::CaptainChange => "captain_change",
            Self::UserKick => "user_kick",
            Self::GameEnd => "game_end",
            Self::AiAdd => "ai_add",
            Self::RoomInfo => "room_info",
            Self::RoomClear => "room_clear",
            Self::GameCreate => "game_create",
            Self::GameDelete => "game_delete",
        };
        f.write_str(name)
    }
}

/// One push notification to the platform's game server.
///
/// The timestamp travels as a string of epoch milliseconds; that is the
/// platform's wire format, not ours to normalize.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event: EventKind,
    pub mg_id: String,
    pub timestamp: String,
    pub data: Value,
}

impl EventEnvelope {
    pub fn now(event: EventKind, mg_id: &str, data: Value) -> Self {
        Self {
            event,
            mg_id: mg_id.to_string(),
            timestamp: Utc::now().timestamp_millis().to_string(),
            data,
        }
    }
}

/// `user_in` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIn {
    /// Short-lived user token minted by the host application
    pub code: String,
    pub room_id: String,
    /// Game mode, platform default 1
    pub mode: i32,
    /// Platform locale tag, see [`crate::language::normalize_language`]
    pub language: String,
    pub is_ready: bool,
    /// Seat to occupy; -1 lets the platform pick
    pub seat_index: i32,
    pub is_seat_random: bool,
    /// 1 for games without teams; 1 or 2 for two-team games
    pub team_id: i32,
}

impl UserIn {
    /// Join with a random seat on team 1, not ready.
    pub fn new(user_token: impl Into<String>, language: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            code: user_token.into(),
            room_id: room_id.into(),
            mode: 1,
            language: language.into(),
            is_ready: false,
            seat_index: -1,
            is_seat_random: true,
            team_id: 1,
        }
    }

    /// Occupy a specific seat instead of a random one.
    pub fn seated_at(mut self, seat_index: i32) -> Self {
        self.seat_index = seat_index;
        self.is_seat_random = seat_index == -1;
        self
    }

    pub fn on_team(mut self, team_id: i32) -> Self {
        self.team_id = team_id;
        self
    }
}

/// `user_out` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub uid: String,
    /// Leaving also cancels readiness instead of erroring on a ready user
    pub is_cancel_ready: bool,
}

/// `user_ready` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReady {
    pub uid: String,
    pub is_ready: bool,
}

/// `game_start` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStart {
    pub room_id: String,
    /// Pass-through blob echoed in game reports, truncated by the platform
    /// beyond 1024 bytes
    pub report_game_info_extras: String,
    /// Key the host can later query one round's report data by, max 64 bytes
    pub report_game_info_key: String,
}

impl GameStart {
    /// Build the start payload with the round-fee extras blob. A zero
    /// `per_game_diamond` falls back to the platform default fee.
    pub fn new(room_id: impl Into<String>, mg_id: &str, per_game_diamond: u64) -> Self {
        let per_game_diamond = if per_game_diamond == 0 { DEFAULT_PER_GAME_DIAMOND } else { per_game_diamond };
        let extras = serde_json::json!({
            "mg_id": mg_id,
            "per_game_diamond": per_game_diamond,
        })
        .to_string();

        Self {
            room_id: room_id.into(),
            report_game_info_extras: extras.clone(),
            report_game_info_key: extras,
        }
    }
}

/// `captain_change` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptainChange {
    pub captain_uid: String,
}

/// `user_kick` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserKick {
    pub kicked_uid: String,
}

/// `game_end` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEnd {
    pub kicked_uid: String,
    pub room_id: String,
}

/// AI player descriptor for [`AiAdd`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiPlayer {
    pub uid: String,
    /// Avatar image URL
    pub avatar: String,
    pub name: String,
    pub gender: Gender,
    /// 0 or 1: easy, 2: intermediate, 3: advanced
    pub ai_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// `ai_add` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAdd {
    pub room_id: String,
    pub ai_players: Vec<AiPlayer>,
    /// 1 marks the AI players as automatically ready
    pub is_ready: u8,
}

/// `room_info` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: String,
}

/// `room_clear` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClear {
    pub room_id: String,
}

/// `game_create` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreate {
    pub mode: i32,
}

/// `game_delete` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDelete {
    pub mode: i32,
}

/// Reject an absent room identifier before building a payload. The platform
/// treats `0` as "no room", same as empty.
fn require_room_id(room_id: &str) -> Result<()> {
    if room_id.trim().is_empty() || room_id == "0" {
        return Err(Error::InvalidArgument {
            message: "room_id must not be empty".to_string(),
        });
    }
    Ok(())
}

impl SudClient {
    /// Push one event envelope to the game server.
    ///
    /// The typed wrappers below cover the documented events; this is the
    /// generic entry point for anything else.
    pub async fn push_event(&self, event: EventKind, mg_id: &str, data: impl Serialize) -> Result<Value> {
        let data = serde_json::to_value(data).map_err(|e| Error::InvalidArgument {
            message: format!("unserializable event data: {e}"),
        })?;

        let url = self.api_url(ApiOperation::PushEvent).await?;
        let envelope = EventEnvelope::now(event, mg_id, data);

        tracing::debug!(event = %envelope.event, mg_id, "pushing game event");
        self.post_signed(url, &envelope).await
    }

    /// Notify the game server that a user joined.
    pub async fn user_join(&self, mg_id: &str, join: UserIn) -> Result<Value> {
        self.push_event(EventKind::UserIn, mg_id, join).await
    }

    /// Notify the game server that a user left. Readiness is cancelled
    /// implicitly rather than erroring on a ready user.
    pub async fn user_leave(&self, mg_id: &str, uid: &str) -> Result<Value> {
        let data = UserOut {
            uid: uid.to_string(),
            is_cancel_ready: true,
        };
        self.push_event(EventKind::UserOut, mg_id, data).await
    }

    /// Mark a user ready (`true`) or cancel their readiness (`false`).
    pub async fn user_ready(&self, mg_id: &str, uid: &str, is_ready: bool) -> Result<Value> {
        let data = UserReady {
            uid: uid.to_string(),
            is_ready,
        };
        self.push_event(EventKind::UserReady, mg_id, data).await
    }

    /// Start the round for a room.
    pub async fn game_start(&self, mg_id: &str, room_id: &str, per_game_diamond: u64) -> Result<Value> {
        require_room_id(room_id)?;
        let data = GameStart::new(room_id, mg_id, per_game_diamond);
        self.push_event(EventKind::GameStart, mg_id, data).await
    }

    /// Hand the captain role to another user.
    pub async fn change_captain(&self, mg_id: &str, captain_uid: &str) -> Result<Value> {
        let data = CaptainChange {
            captain_uid: captain_uid.to_string(),
        };
        self.push_event(EventKind::CaptainChange, mg_id, data).await
    }

    /// Kick a user out of the game.
    pub async fn kick_user(&self, mg_id: &str, kicked_uid: &str) -> Result<Value> {
        let data = UserKick {
            kicked_uid: kicked_uid.to_string(),
        };
        self.push_event(EventKind::UserKick, mg_id, data).await
    }

    /// Force-end the current round.
    pub async fn game_end(&self, mg_id: &str, room_id: &str, uid: &str) -> Result<Value> {
        require_room_id(room_id)?;
        let data = GameEnd {
            kicked_uid: uid.to_string(),
            room_id: room_id.to_string(),
        };
        self.push_event(EventKind::GameEnd, mg_id, data).await
    }

    /// Add AI players to the room, auto-ready.
    pub async fn add_ai_players(&self, mg_id: &str, room_id: &str, ai_players: Vec<AiPlayer>) -> Result<Value> {
        require_room_id(room_id)?;
        let data = AiAdd {
            room_id: room_id.to_string(),
            ai_players,
            is_ready: 1,
        };
        self.push_event(EventKind::AiAdd, mg_id, data).await
    }

    /// Fetch the room's seat list.
    pub async fn room_info(&self, mg_id: &str, room_id: &str) -> Result<Value> {
        require_room_id(room_id)?;
        let data = RoomInfo {
            room_id: room_id.to_string(),
        };
        self.push_event(EventKind::RoomInfo, mg_id, data).await
    }

    /// Clear all game state held for the room.
    pub async fn room_clear(&self, mg_id: &str, room_id: &str) -> Result<Value> {
        require_room_id(room_id)?;
        let data = RoomClear {
            room_id: room_id.to_string(),
        };
        self.push_event(EventKind::RoomClear, mg_id, data).await
    }

    /// Create the room's game instance.
    pub async fn game_create(&self, mg_id: &str) -> Result<Value> {
        self.push_event(EventKind::GameCreate, mg_id, GameCreate { mode: 1 }).await
    }

    /// Delete the room's game instance.
    pub async fn game_delete(&self, mg_id: &str) -> Result<Value> {
        self.push_event(EventKind::GameDelete, mg_id, GameDelete { mode: 1 }).await
    }
}
