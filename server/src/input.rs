//! Input relay: decodes inbound client frames into paddle commands.
//!
//! Runs on the simulation task only; queued frames are drained once per tick
//! so paddle velocity is never mutated concurrently.

use shared::{binding_for, KeyTransition, PaddleDirection, PlayerSlot};

/// A discrete control applied to one paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleCommand {
    Begin {
        slot: PlayerSlot,
        direction: PaddleDirection,
    },
    Stop {
        slot: PlayerSlot,
    },
}

/// Decodes one inbound frame into paddle commands.
///
/// The first token is an opaque tag and skipped. Each remaining token ending
/// in `_DOWN` begins movement for the paddle its first character is bound to;
/// `_UP` stops it. Tokens with an unrecognized suffix or an unbound key are
/// ignored without error.
pub fn relay_line(line: &str) -> Vec<PaddleCommand> {
    line.trim_end()
        .split(',')
        .skip(1)
        .filter_map(|token| {
            let transition = KeyTransition::from_token(token)?;
            let (slot, direction) = binding_for(transition.key)?;
            Some(if transition.pressed {
                PaddleCommand::Begin { slot, direction }
            } else {
                PaddleCommand::Stop { slot }
            })
        })
        .collect()
}
