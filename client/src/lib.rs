//! Protocol client for the three-paddle pong server.
//!
//! Maintains a local view of the authoritative state from the server's
//! snapshot stream and relays discrete key transitions back. Rendering is a
//! consumer of [`game::ClientGameState`] and lives outside this crate.

pub mod game;
pub mod input;
pub mod network;
