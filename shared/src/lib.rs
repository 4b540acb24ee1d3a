//! Wire protocol and world tuning shared by the tripong server and client.
//!
//! The protocol is line-oriented text: every frame is a comma-separated field
//! list behind a leading tag, terminated by a newline. Server-to-client frames
//! are parsed into [`ServerMessage`]; client-to-server frames carry key
//! transitions (`W_DOWN`, `W_UP`, ...) behind an `INPUT` tag.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

pub const BALL_SIZE: f32 = 10.0;
pub const BALL_SPAWN_X: f32 = WORLD_WIDTH / 2.0 - 30.0;
pub const BALL_SPAWN_Y: f32 = 0.0;
pub const BALL_SERVE_VX: f32 = 300.0;
pub const BALL_SERVE_VY: f32 = -300.0;

pub const PADDLE_SPEED: f32 = 420.0;
pub const SIDE_PADDLE_WIDTH: f32 = 20.0;
pub const SIDE_PADDLE_HEIGHT: f32 = 100.0;
pub const BOTTOM_PADDLE_WIDTH: f32 = 100.0;
pub const BOTTOM_PADDLE_HEIGHT: f32 = 20.0;

pub const PADDLE1_X: f32 = WORLD_WIDTH / 4.0;
pub const PADDLE2_X: f32 = 3.0 * WORLD_WIDTH / 4.0 - 20.0;
pub const SIDE_PADDLE_SPAWN_Y: f32 = WORLD_HEIGHT / 2.0 - 30.0;
pub const PADDLE3_Y: f32 = WORLD_HEIGHT - 50.0 - 30.0;
pub const BOTTOM_PADDLE_SPAWN_X: f32 = WORLD_WIDTH / 2.0 - 30.0;

pub const POWER_UP_SIZE: f32 = 40.0;
pub const POWER_UP_X: f32 = WORLD_WIDTH / 2.0;
pub const POWER_UP_Y: f32 = WORLD_HEIGHT / 2.0;

/// Horizontal ball speed is clamped up to this magnitude every tick.
pub const MIN_BALL_SPEED_X: f32 = 300.0;
/// Vertical ball speed above this magnitude triggers a reset.
pub const MAX_BALL_SPEED_Y: f32 = 600.0;
pub const SLOW_DOWN_FACTOR: f32 = 0.25;
pub const SLOW_DOWN_SECS: f32 = 5.0;
pub const WIN_SCORE: u32 = 10;

/// Tag prefixing every client-to-server input frame.
pub const INPUT_TAG: &str = "INPUT";

/// Errors produced while parsing a protocol frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown message tag: {0}")]
    UnknownTag(String),
    #[error("message is missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid numeric field `{0}`")]
    InvalidNumber(&'static str),
    #[error("invalid player id: {0}")]
    InvalidPlayerId(String),
    #[error("unknown player slot: {0}")]
    UnknownPlayerSlot(u32),
}

/// One of the exactly three paddle slots in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
    Three,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 3] = [PlayerSlot::One, PlayerSlot::Two, PlayerSlot::Three];

    /// Zero-based index into per-player arrays.
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
            PlayerSlot::Three => 2,
        }
    }

    /// One-based slot number as it appears on the wire.
    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }
}

impl TryFrom<u32> for PlayerSlot {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerSlot::One),
            2 => Ok(PlayerSlot::Two),
            3 => Ok(PlayerSlot::Three),
            other => Err(ProtocolError::UnknownPlayerSlot(other)),
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Direction a paddle can be driven in; side paddles move up/down, the
/// bottom paddle moves left/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Maps a key character to the paddle it drives.
///
/// `W`/`S` control player 1, `I`/`K` player 2, `F`/`G` player 3. Unbound keys
/// return `None` and are ignored by the input relay.
pub fn binding_for(key: char) -> Option<(PlayerSlot, PaddleDirection)> {
    match key.to_ascii_uppercase() {
        'W' => Some((PlayerSlot::One, PaddleDirection::Up)),
        'S' => Some((PlayerSlot::One, PaddleDirection::Down)),
        'I' => Some((PlayerSlot::Two, PaddleDirection::Up)),
        'K' => Some((PlayerSlot::Two, PaddleDirection::Down)),
        'F' => Some((PlayerSlot::Three, PaddleDirection::Left)),
        'G' => Some((PlayerSlot::Three, PaddleDirection::Right)),
        _ => None,
    }
}

/// A discrete key press or release as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub key: char,
    pub pressed: bool,
}

impl KeyTransition {
    pub fn pressed(key: char) -> Self {
        Self { key, pressed: true }
    }

    pub fn released(key: char) -> Self {
        Self { key, pressed: false }
    }

    /// Wire token, e.g. `W_DOWN` or `W_UP`.
    pub fn token(&self) -> String {
        let suffix = if self.pressed { "DOWN" } else { "UP" };
        format!("{}_{}", self.key.to_ascii_uppercase(), suffix)
    }

    /// Parses a single token. The key is the first character of the token;
    /// tokens without a `_DOWN`/`_UP` suffix yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let pressed = if token.ends_with("_DOWN") {
            true
        } else if token.ends_with("_UP") {
            false
        } else {
            return None;
        };

        token.chars().next().map(|key| Self { key, pressed })
    }
}

/// Encodes one or more key transitions as a single input frame.
pub fn encode_input_line(transitions: &[KeyTransition]) -> String {
    let mut line = String::from(INPUT_TAG);
    for transition in transitions {
        line.push(',');
        line.push_str(&transition.token());
    }
    line
}

/// Server-to-client protocol frames.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Sent once per connection, immediately after accept.
    PlayerId(Uuid),
    /// Broadcast after a scoring wall hit.
    Scores { p1: u32, p2: u32, p3: u32 },
    /// Full authoritative snapshot, broadcast every tick while at least one
    /// connection is live. `power_up` carries the position while active.
    GameData {
        p1_y: f32,
        p2_y: f32,
        p3_x: f32,
        ball_x: f32,
        ball_y: f32,
        power_up: Option<(f32, f32)>,
    },
    /// The ball started overlapping the given player's paddle.
    BallHitBat(PlayerSlot),
    /// The ball consumed the power-up.
    BallHitPowerUp,
}

impl ServerMessage {
    /// Encodes the frame body. Framing (the trailing newline) is added by the
    /// transport.
    pub fn encode(&self) -> String {
        match self {
            ServerMessage::PlayerId(id) => format!("PLAYER_ID,{}", id),
            ServerMessage::Scores { p1, p2, p3 } => format!("SCORES,{},{},{}", p1, p2, p3),
            ServerMessage::GameData {
                p1_y,
                p2_y,
                p3_x,
                ball_x,
                ball_y,
                power_up,
            } => {
                let power_up_field = match power_up {
                    Some((x, y)) => format!("{},{},1", x, y),
                    None => "0,0,0".to_string(),
                };
                format!(
                    "GAME_DATA,{},{},{},{},{},{}",
                    p1_y, p2_y, p3_x, ball_x, ball_y, power_up_field
                )
            }
            ServerMessage::BallHitBat(slot) => format!("BALL_HIT_BAT{}", slot.number()),
            ServerMessage::BallHitPowerUp => "BALL_HIT_powerUp".to_string(),
        }
    }

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut fields = line.trim_end().split(',');
        let tag = fields.next().unwrap_or("");

        match tag {
            "PLAYER_ID" => {
                let raw = fields.next().ok_or(ProtocolError::MissingField("uuid"))?;
                let id = Uuid::parse_str(raw)
                    .map_err(|_| ProtocolError::InvalidPlayerId(raw.to_string()))?;
                Ok(ServerMessage::PlayerId(id))
            }
            "SCORES" => Ok(ServerMessage::Scores {
                p1: next_u32(&mut fields, "p1")?,
                p2: next_u32(&mut fields, "p2")?,
                p3: next_u32(&mut fields, "p3")?,
            }),
            "GAME_DATA" => {
                let p1_y = next_f32(&mut fields, "p1_y")?;
                let p2_y = next_f32(&mut fields, "p2_y")?;
                let p3_x = next_f32(&mut fields, "p3_x")?;
                let ball_x = next_f32(&mut fields, "ball_x")?;
                let ball_y = next_f32(&mut fields, "ball_y")?;
                let pu_x = next_f32(&mut fields, "power_up_x")?;
                let pu_y = next_f32(&mut fields, "power_up_y")?;
                let active = next_u32(&mut fields, "power_up_active")?;
                Ok(ServerMessage::GameData {
                    p1_y,
                    p2_y,
                    p3_x,
                    ball_x,
                    ball_y,
                    power_up: (active != 0).then_some((pu_x, pu_y)),
                })
            }
            "BALL_HIT_BAT1" => Ok(ServerMessage::BallHitBat(PlayerSlot::One)),
            "BALL_HIT_BAT2" => Ok(ServerMessage::BallHitBat(PlayerSlot::Two)),
            "BALL_HIT_BAT3" => Ok(ServerMessage::BallHitBat(PlayerSlot::Three)),
            "BALL_HIT_powerUp" => Ok(ServerMessage::BallHitPowerUp),
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }
}

fn next_u32<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<u32, ProtocolError> {
    fields
        .next()
        .ok_or(ProtocolError::MissingField(name))?
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(name))
}

fn next_f32<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<f32, ProtocolError> {
    fields
        .next()
        .ok_or(ProtocolError::MissingField(name))?
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(name))
}
