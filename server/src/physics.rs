//! Minimal physics oracle for the tripong world.
//!
//! Integrates ball and paddle motion, reflects the ball off the play-area
//! walls, and reports begin-of-overlap contacts for paddles and the power-up.
//! The game state machine consumes the reported [`CollisionEvent`]s; nothing
//! in here touches scores or protocol state.

use shared::{
    PlayerSlot, BALL_SERVE_VX, BALL_SERVE_VY, BALL_SIZE, BALL_SPAWN_X, BALL_SPAWN_Y,
    BOTTOM_PADDLE_HEIGHT, BOTTOM_PADDLE_SPAWN_X, BOTTOM_PADDLE_WIDTH, PADDLE1_X, PADDLE2_X,
    PADDLE3_Y, PADDLE_SPEED, POWER_UP_SIZE, POWER_UP_X, POWER_UP_Y, SIDE_PADDLE_HEIGHT,
    SIDE_PADDLE_SPAWN_Y, SIDE_PADDLE_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Named contact region of the play-area boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallRegion {
    Left,
    Right,
    Top,
    Bottom,
}

/// Contact reported by one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    BallWall { region: WallRegion },
    BallPaddle { slot: PlayerSlot },
    BallPowerUp,
}

/// Discrete paddle velocity states; the sign is along the paddle's axis
/// (y for the side paddles, x for the bottom paddle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleMotion {
    Stationary,
    MovingPositive,
    MovingNegative,
}

#[derive(Debug, Clone)]
pub struct Paddle {
    pub slot: PlayerSlot,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub motion: PaddleMotion,
}

impl Paddle {
    pub fn spawn(slot: PlayerSlot) -> Self {
        let (x, y, width, height) = match slot {
            PlayerSlot::One => (
                PADDLE1_X,
                SIDE_PADDLE_SPAWN_Y,
                SIDE_PADDLE_WIDTH,
                SIDE_PADDLE_HEIGHT,
            ),
            PlayerSlot::Two => (
                PADDLE2_X,
                SIDE_PADDLE_SPAWN_Y,
                SIDE_PADDLE_WIDTH,
                SIDE_PADDLE_HEIGHT,
            ),
            PlayerSlot::Three => (
                BOTTOM_PADDLE_SPAWN_X,
                PADDLE3_Y,
                BOTTOM_PADDLE_WIDTH,
                BOTTOM_PADDLE_HEIGHT,
            ),
        };

        Self {
            slot,
            x,
            y,
            width,
            height,
            motion: PaddleMotion::Stationary,
        }
    }

    /// The bottom paddle slides horizontally, the other two vertically.
    pub fn is_horizontal(&self) -> bool {
        self.slot == PlayerSlot::Three
    }

    fn step(&mut self, dt: f32) {
        let delta = match self.motion {
            PaddleMotion::Stationary => return,
            PaddleMotion::MovingPositive => PADDLE_SPEED * dt,
            PaddleMotion::MovingNegative => -PADDLE_SPEED * dt,
        };

        if self.is_horizontal() {
            self.x = (self.x + delta).clamp(0.0, WORLD_WIDTH - self.width);
        } else {
            self.y = (self.y + delta).clamp(0.0, WORLD_HEIGHT - self.height);
        }
    }

    fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Ball {
    fn serve() -> Self {
        Self {
            x: BALL_SPAWN_X,
            y: BALL_SPAWN_Y,
            vx: BALL_SERVE_VX,
            vy: BALL_SERVE_VY,
        }
    }

    fn center(&self) -> (f32, f32) {
        (self.x + BALL_SIZE / 2.0, self.y + BALL_SIZE / 2.0)
    }
}

/// Single consumable world object; consumption deactivates it, the slot is
/// never respawned within a match.
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

/// The simulated play area: one ball, three paddles, one power-up.
#[derive(Debug, Clone)]
pub struct World {
    pub ball: Ball,
    pub paddles: [Paddle; 3],
    pub power_up: PowerUp,
    // Begin-of-overlap tracking so a sustained paddle contact fires once.
    paddle_contact: [bool; 3],
}

impl World {
    pub fn new() -> Self {
        Self {
            ball: Ball::serve(),
            paddles: [
                Paddle::spawn(PlayerSlot::One),
                Paddle::spawn(PlayerSlot::Two),
                Paddle::spawn(PlayerSlot::Three),
            ],
            power_up: PowerUp {
                x: POWER_UP_X,
                y: POWER_UP_Y,
                active: true,
            },
            paddle_contact: [false; 3],
        }
    }

    pub fn paddle(&self, slot: PlayerSlot) -> &Paddle {
        &self.paddles[slot.index()]
    }

    pub fn paddle_mut(&mut self, slot: PlayerSlot) -> &mut Paddle {
        &mut self.paddles[slot.index()]
    }

    pub fn ball_velocity(&self) -> (f32, f32) {
        (self.ball.vx, self.ball.vy)
    }

    pub fn set_ball_velocity(&mut self, vx: f32, vy: f32) {
        self.ball.vx = vx;
        self.ball.vy = vy;
    }

    /// Teleports the ball, bypassing integration for this write.
    pub fn overwrite_ball_position(&mut self, x: f32, y: f32) {
        self.ball.x = x;
        self.ball.y = y;
    }

    /// True when the ball's bounding box lies fully outside the play area.
    pub fn ball_fully_outside(&self) -> bool {
        self.ball.x + BALL_SIZE < 0.0
            || self.ball.x > WORLD_WIDTH
            || self.ball.y + BALL_SIZE < 0.0
            || self.ball.y > WORLD_HEIGHT
    }

    /// Advances the world by `dt` seconds and reports contacts in order:
    /// walls, paddles, power-up.
    pub fn step(&mut self, dt: f32) -> Vec<CollisionEvent> {
        let mut events = Vec::new();

        for paddle in &mut self.paddles {
            paddle.step(dt);
        }

        self.ball.x += self.ball.vx * dt;
        self.ball.y += self.ball.vy * dt;

        // A ball that tunneled fully past the walls is out of reach of the
        // contact handlers; the off-screen recovery owns that case.
        if self.ball_fully_outside() {
            return events;
        }

        self.reflect_off_walls(&mut events);
        self.detect_paddle_contacts(&mut events);

        if self.power_up.active
            && aabb_overlap(
                self.ball.x,
                self.ball.y,
                BALL_SIZE,
                BALL_SIZE,
                self.power_up.x,
                self.power_up.y,
                POWER_UP_SIZE,
                POWER_UP_SIZE,
            )
        {
            events.push(CollisionEvent::BallPowerUp);
        }

        events
    }

    fn reflect_off_walls(&mut self, events: &mut Vec<CollisionEvent>) {
        let ball = &mut self.ball;

        if ball.x <= 0.0 {
            ball.x = 0.0;
            ball.vx = ball.vx.abs();
            events.push(CollisionEvent::BallWall {
                region: WallRegion::Left,
            });
        } else if ball.x + BALL_SIZE >= WORLD_WIDTH {
            ball.x = WORLD_WIDTH - BALL_SIZE;
            ball.vx = -ball.vx.abs();
            events.push(CollisionEvent::BallWall {
                region: WallRegion::Right,
            });
        }

        if ball.y <= 0.0 {
            ball.y = 0.0;
            ball.vy = ball.vy.abs();
            events.push(CollisionEvent::BallWall {
                region: WallRegion::Top,
            });
        } else if ball.y + BALL_SIZE >= WORLD_HEIGHT {
            ball.y = WORLD_HEIGHT - BALL_SIZE;
            ball.vy = -ball.vy.abs();
            events.push(CollisionEvent::BallWall {
                region: WallRegion::Bottom,
            });
        }
    }

    fn detect_paddle_contacts(&mut self, events: &mut Vec<CollisionEvent>) {
        for (i, paddle) in self.paddles.iter().enumerate() {
            let overlapping = aabb_overlap(
                self.ball.x,
                self.ball.y,
                BALL_SIZE,
                BALL_SIZE,
                paddle.x,
                paddle.y,
                paddle.width,
                paddle.height,
            );

            if overlapping && !self.paddle_contact[i] {
                let (ball_cx, _) = self.ball.center();
                let (paddle_cx, _) = paddle.center();

                if paddle.is_horizontal() {
                    self.ball.vy = -self.ball.vy.abs();
                } else if ball_cx >= paddle_cx {
                    self.ball.vx = self.ball.vx.abs();
                } else {
                    self.ball.vx = -self.ball.vx.abs();
                }

                events.push(CollisionEvent::BallPaddle { slot: paddle.slot });
            }

            self.paddle_contact[i] = overlapping;
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn aabb_overlap(ax: f32, ay: f32, aw: f32, ah: f32, bx: f32, by: f32, bw: f32, bh: f32) -> bool {
    ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah
}
