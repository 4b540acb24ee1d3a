//! Authoritative game state: scores, the last-paddle-touched relation, the
//! power-up lifecycle, and the ball tuning applied every tick.

use crate::input::PaddleCommand;
use crate::physics::{CollisionEvent, PaddleMotion, WallRegion, World};
use log::debug;
use shared::{
    PaddleDirection, PlayerSlot, ServerMessage, MAX_BALL_SPEED_Y, MIN_BALL_SPEED_X,
    SLOW_DOWN_FACTOR, SLOW_DOWN_SECS, WIN_SCORE, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Observable outcome of one tick, broadcast to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoresChanged { p1: u32, p2: u32, p3: u32 },
    BatHit(PlayerSlot),
    PowerUpConsumed,
}

impl GameEvent {
    pub fn to_message(self) -> ServerMessage {
        match self {
            GameEvent::ScoresChanged { p1, p2, p3 } => ServerMessage::Scores { p1, p2, p3 },
            GameEvent::BatHit(slot) => ServerMessage::BallHitBat(slot),
            GameEvent::PowerUpConsumed => ServerMessage::BallHitPowerUp,
        }
    }
}

/// Authoritative match state, owned exclusively by the simulation loop.
#[derive(Debug, Clone)]
pub struct GameState {
    pub world: World,
    scores: [u32; 3],
    last_paddle_touched: Option<PlayerSlot>,
    /// Remaining slow-down seconds; `Some` suspends velocity limiting.
    slow_down_remaining: Option<f32>,
    match_point_logged: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            scores: [0; 3],
            last_paddle_touched: None,
            slow_down_remaining: None,
            match_point_logged: false,
        }
    }

    pub fn scores(&self) -> [u32; 3] {
        self.scores
    }

    pub fn last_paddle_touched(&self) -> Option<PlayerSlot> {
        self.last_paddle_touched
    }

    pub fn is_slowed(&self) -> bool {
        self.slow_down_remaining.is_some()
    }

    /// Applies a relayed paddle command. Up/Left drive the paddle toward the
    /// negative axis direction, Down/Right toward the positive one.
    pub fn apply_command(&mut self, command: PaddleCommand) {
        match command {
            PaddleCommand::Begin { slot, direction } => {
                let motion = match direction {
                    PaddleDirection::Up | PaddleDirection::Left => PaddleMotion::MovingNegative,
                    PaddleDirection::Down | PaddleDirection::Right => PaddleMotion::MovingPositive,
                };
                self.world.paddle_mut(slot).motion = motion;
            }
            PaddleCommand::Stop { slot } => {
                self.world.paddle_mut(slot).motion = PaddleMotion::Stationary;
            }
        }
    }

    /// Advances the simulation by `dt` seconds and returns the events to
    /// broadcast, in the order they occurred.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for collision in self.world.step(dt) {
            match collision {
                CollisionEvent::BallPaddle { slot } => {
                    self.last_paddle_touched = Some(slot);
                    events.push(GameEvent::BatHit(slot));
                }
                CollisionEvent::BallPowerUp => {
                    self.world.power_up.active = false;
                    self.slow_down();
                    events.push(GameEvent::PowerUpConsumed);
                }
                CollisionEvent::BallWall { region } => {
                    self.handle_wall_contact(region, &mut events);
                }
            }
        }

        if let Some(remaining) = self.slow_down_remaining {
            let remaining = remaining - dt;
            // Restoration is effect-only: clearing the toggle resumes normal
            // velocity limiting on the next pass.
            self.slow_down_remaining = (remaining > 0.0).then_some(remaining);
        }

        if self.slow_down_remaining.is_none() {
            self.limit_ball_velocity();
        }

        // The physics integration can tunnel the ball through a wall; pull it
        // back to the center instead of losing it.
        if self.world.ball_fully_outside() {
            self.world
                .overwrite_ball_position(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
        }

        self.check_match_point();

        events
    }

    /// Full-state snapshot for the per-tick broadcast.
    pub fn snapshot(&self) -> ServerMessage {
        let power_up = &self.world.power_up;
        ServerMessage::GameData {
            p1_y: self.world.paddle(PlayerSlot::One).y,
            p2_y: self.world.paddle(PlayerSlot::Two).y,
            p3_x: self.world.paddle(PlayerSlot::Three).x,
            ball_x: self.world.ball.x,
            ball_y: self.world.ball.y,
            power_up: power_up.active.then_some((power_up.x, power_up.y)),
        }
    }

    fn handle_wall_contact(&mut self, region: WallRegion, events: &mut Vec<GameEvent>) {
        if let Some(slot) = self.last_paddle_touched.take() {
            self.scores[slot.index()] += 1;
            events.push(GameEvent::ScoresChanged {
                p1: self.scores[0],
                p2: self.scores[1],
                p3: self.scores[2],
            });
        }

        // Side and top/bottom walls are distinguished here but currently
        // carry no differentiated behavior; the screen shake that accompanies
        // a wall hit belongs to the renderer.
        match region {
            WallRegion::Left | WallRegion::Right => {}
            WallRegion::Top | WallRegion::Bottom => {}
        }
        debug!("Ball hit {:?} wall", region);
    }

    /// One-shot ball slow-down: scales the current velocity once and
    /// schedules the restore. A second trigger while active is a no-op.
    fn slow_down(&mut self) {
        if self.slow_down_remaining.is_some() {
            return;
        }

        let (vx, vy) = self.world.ball_velocity();
        self.world
            .set_ball_velocity(vx * SLOW_DOWN_FACTOR, vy * SLOW_DOWN_FACTOR);
        self.slow_down_remaining = Some(SLOW_DOWN_SECS);
    }

    fn limit_ball_velocity(&mut self) {
        let (mut vx, mut vy) = self.world.ball_velocity();

        // Keep the ball from crawling horizontally. A dead-zero velocity has
        // no sign to preserve and stays untouched.
        if vx != 0.0 && vx.abs() < MIN_BALL_SPEED_X {
            vx = vx.signum() * MIN_BALL_SPEED_X;
        }

        // An over-fast vertical ball is reset to the base speed, not to the
        // cap itself.
        if vy.abs() > MAX_BALL_SPEED_Y {
            vy = vy.signum() * MIN_BALL_SPEED_X;
        }

        self.world.set_ball_velocity(vx, vy);
    }

    /// Match point is evaluated every tick but intentionally has no
    /// terminating effect on the loop.
    fn check_match_point(&mut self) {
        if self.match_point_logged {
            return;
        }
        if self.scores.iter().any(|score| *score >= WIN_SCORE) {
            debug!("Match point reached: {:?}", self.scores);
            self.match_point_logged = true;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
