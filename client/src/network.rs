//! Client side of the TCP protocol: connect, parse the server stream into
//! the local view, and relay key transitions back.

use crate::game::ClientGameState;
use crate::input::InputManager;
use log::{info, warn};
use shared::{encode_input_line, KeyTransition, ProtocolError, ServerMessage};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

pub struct Client {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    pub state: ClientGameState,
    pub input: InputManager,
}

impl Client {
    pub async fn connect(server_addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(server_addr).await?;
        info!("Connected to {}", server_addr);

        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half).lines(),
            writer: write_half,
            state: ClientGameState::new(),
            input: InputManager::new(),
        })
    }

    /// Applies one received frame to the view. Malformed frames are logged
    /// and skipped; the next snapshot restores consistency.
    pub fn handle_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        match ServerMessage::parse(line) {
            Ok(message) => {
                if let ServerMessage::PlayerId(id) = &message {
                    info!("Assigned player id {}", id);
                }
                self.state.apply(&message);
                Ok(())
            }
            Err(e) => {
                warn!("Ignoring malformed frame {:?}: {}", line, e);
                Err(e)
            }
        }
    }

    /// Sends one key event to the server, if the key is bound.
    pub async fn send_key(&mut self, key: char) -> io::Result<()> {
        if let Some(transition) = self.input.toggle(key) {
            self.send_transitions(&[transition]).await?;
        }
        Ok(())
    }

    async fn send_transitions(&mut self, transitions: &[KeyTransition]) -> io::Result<()> {
        if transitions.is_empty() {
            return Ok(());
        }
        let mut frame = encode_input_line(transitions).into_bytes();
        frame.push(b'\n');
        self.writer.write_all(&frame).await?;
        Ok(())
    }

    /// Reads server frames and local key events until either side ends.
    /// `key_events` delivers one character per local key press.
    pub async fn run(
        &mut self,
        mut key_events: tokio::sync::mpsc::Receiver<char>,
    ) -> io::Result<()> {
        loop {
            tokio::select! {
                line = self.reader.next_line() => {
                    match line? {
                        Some(line) => {
                            let _ = self.handle_line(&line);
                        }
                        None => {
                            info!("Server closed the connection");
                            return Ok(());
                        }
                    }
                }
                key = key_events.recv() => {
                    match key {
                        Some(key) => self.send_key(key).await?,
                        None => {
                            // Input source gone: release held keys and leave.
                            let pending = self.input.release_all();
                            self.send_transitions(&pending).await?;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
