//! Authoritative host for the three-paddle pong variant.
//!
//! The server owns the canonical match state and streams it to every
//! connected client over a persistent TCP connection while relaying client
//! key transitions back into paddle state.
//!
//! ## Architecture
//!
//! Three kinds of execution context cooperate:
//!
//! - the **simulation loop** ([`net::Server::run`]): fixed-rate, sole owner
//!   of all mutable game state (paddles, ball, scores, power-up);
//! - one **accept loop**, which registers connections and hands out the
//!   one-time `PLAYER_ID` frame;
//! - one **reader task and one writer task per connection**: newline-framed
//!   text protocol in both directions, bridged to the simulation loop by
//!   bounded queues.
//!
//! Inbound frames cross a bounded handoff (blocking the sending reader when
//! full); outbound broadcasts never wait, and a connection whose queue is
//! full or closed is dropped from the live set.
//!
//! ## Modules
//!
//! - [`connection`]: live connection set and broadcast fan-out
//! - [`input`]: key-token decoding into paddle commands
//! - [`physics`]: integration, wall reflection, begin-of-overlap detection
//! - [`game`]: scores, last-paddle-touched, power-up and slow-down rules
//! - [`net`]: TCP transport and the tick loop tying it all together

pub mod connection;
pub mod game;
pub mod input;
pub mod net;
pub mod physics;
