//! Local view of the authoritative match state.
//!
//! The view is rebuilt from every full-state snapshot, so a dropped frame is
//! corrected by the next one. Consumers (a renderer, the terminal UI) read
//! this struct; nothing here feeds back into the simulation.

use shared::{
    PlayerSlot, ServerMessage, BALL_SPAWN_X, BALL_SPAWN_Y, BOTTOM_PADDLE_SPAWN_X,
    SIDE_PADDLE_SPAWN_Y,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClientGameState {
    /// Identity assigned by the server on connect.
    pub player_id: Option<Uuid>,
    pub paddle1_y: f32,
    pub paddle2_y: f32,
    pub paddle3_x: f32,
    pub ball: (f32, f32),
    /// Power-up position while it is active on the field.
    pub power_up: Option<(f32, f32)>,
    pub scores: [u32; 3],
    /// Most recent paddle-contact event, for hit feedback.
    pub last_bat_hit: Option<PlayerSlot>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            player_id: None,
            paddle1_y: SIDE_PADDLE_SPAWN_Y,
            paddle2_y: SIDE_PADDLE_SPAWN_Y,
            paddle3_x: BOTTOM_PADDLE_SPAWN_X,
            ball: (BALL_SPAWN_X, BALL_SPAWN_Y),
            power_up: None,
            scores: [0; 3],
            last_bat_hit: None,
        }
    }

    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::PlayerId(id) => {
                self.player_id = Some(*id);
            }
            ServerMessage::Scores { p1, p2, p3 } => {
                self.scores = [*p1, *p2, *p3];
            }
            ServerMessage::GameData {
                p1_y,
                p2_y,
                p3_x,
                ball_x,
                ball_y,
                power_up,
            } => {
                self.paddle1_y = *p1_y;
                self.paddle2_y = *p2_y;
                self.paddle3_x = *p3_x;
                self.ball = (*ball_x, *ball_y);
                self.power_up = *power_up;
            }
            ServerMessage::BallHitBat(slot) => {
                self.last_bat_hit = Some(*slot);
            }
            ServerMessage::BallHitPowerUp => {
                self.power_up = None;
            }
        }
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}
