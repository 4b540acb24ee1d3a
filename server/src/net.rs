//! TCP transport and the authoritative simulation loop.
//!
//! One task accepts connections, one reader task per connection feeds decoded
//! lines into a bounded handoff queue, and the simulation loop drains that
//! queue once per tick. Outbound frames go through a bounded per-connection
//! queue drained by a writer task, so a slow client can never stall a tick.

use crate::connection::{Connection, ConnectionManager};
use crate::game::GameState;
use crate::input;
use log::{debug, error, info};
use shared::ServerMessage;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use uuid::Uuid;

/// Capacity of the inbound handoff between reader tasks and the simulation
/// loop. Policy at capacity is bounded-block: the reader task waits for room,
/// applying backpressure to its own socket only. Inputs are never silently
/// dropped and the simulation loop never waits on the queue.
const INBOUND_QUEUE_CAPACITY: usize = 50;

/// Per-connection outbound queue between the simulation loop and the writer
/// task. Broadcasts never wait on it; a connection whose queue is full or
/// closed is dropped instead.
const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Upper bound on per-tick delta time, matching a 20Hz floor.
const MAX_DELTA_TIME: f32 = 1.0 / 20.0;

/// Events handed from the network tasks to the simulation loop.
#[derive(Debug)]
enum ServerEvent {
    Connected {
        id: Uuid,
        outbound: mpsc::Sender<String>,
    },
    LineReceived {
        id: Uuid,
        line: String,
    },
    Disconnected {
        id: Uuid,
    },
}

/// Authoritative host: owns the game state, the live connection set, and the
/// fixed-rate tick loop.
pub struct Server {
    listener: Arc<TcpListener>,
    game: GameState,
    connections: ConnectionManager,
    tick_duration: Duration,
    event_tx: mpsc::Sender<ServerEvent>,
    event_rx: mpsc::Receiver<ServerEvent>,
}

impl Server {
    /// Binds the TCP listener. The accept loop starts when [`Server::run`]
    /// is called.
    pub async fn bind(addr: &str, tick_rate: u32) -> io::Result<Self> {
        let listener = Arc::new(TcpListener::bind(addr).await?);
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);

        Ok(Self {
            listener,
            game: GameState::new(),
            connections: ConnectionManager::new(),
            tick_duration: Duration::from_secs_f32(1.0 / tick_rate as f32),
            event_tx,
            event_rx,
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop and the simulation loop until the task is
    /// cancelled (the binary races this against ctrl-c).
    pub async fn run(mut self) -> io::Result<()> {
        tokio::spawn(accept_loop(
            Arc::clone(&self.listener),
            self.event_tx.clone(),
        ));

        let mut ticker = interval(self.tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick fires immediately.
        ticker.tick().await;
        let mut last_tick = Instant::now();

        info!("Simulation loop started");

        loop {
            ticker.tick().await;

            let now = Instant::now();
            let dt = (now - last_tick).as_secs_f32().min(MAX_DELTA_TIME);
            last_tick = now;

            self.tick_once(dt);
        }
    }

    /// One simulation step: drains queued network events, advances the game,
    /// and broadcasts the resulting frames. Snapshots are only composed while
    /// at least one connection is live.
    fn tick_once(&mut self, dt: f32) {
        self.drain_events();

        let events = self.game.tick(dt);
        for event in events {
            self.broadcast(&event.to_message().encode());
        }

        if !self.connections.is_empty() {
            self.broadcast(&self.game.snapshot().encode());
        }
    }

    /// Applies every queued network event on the simulation task. Input
    /// frames are relayed to paddle state here and nowhere else.
    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                ServerEvent::Connected { id, outbound } => {
                    self.connections.insert(Connection::new(id, outbound));
                }
                ServerEvent::LineReceived { id, line } => {
                    debug!("Connection {} sent: {}", id, line);
                    for command in input::relay_line(&line) {
                        self.game.apply_command(command);
                    }
                }
                ServerEvent::Disconnected { id } => {
                    self.connections.remove(&id);
                }
            }
        }
    }

    fn broadcast(&mut self, frame: &str) {
        for id in self.connections.broadcast(frame) {
            info!("Dropping unresponsive connection {}", id);
            self.connections.remove(&id);
        }
    }
}

async fn accept_loop(listener: Arc<TcpListener>, event_tx: mpsc::Sender<ServerEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let id = Uuid::new_v4();
                info!("Connection {} accepted from {}", id, addr);

                let (read_half, write_half) = stream.into_split();
                let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);

                tokio::spawn(writer_task(id, write_half, outbound_rx));

                // One-time identity frame, queued before the connection joins
                // the broadcast set.
                if outbound_tx
                    .send(ServerMessage::PlayerId(id).encode())
                    .await
                    .is_err()
                {
                    continue;
                }

                tokio::spawn(reader_task(id, read_half, event_tx.clone()));

                if event_tx
                    .send(ServerEvent::Connected {
                        id,
                        outbound: outbound_tx,
                    })
                    .await
                    .is_err()
                {
                    // Simulation loop is gone; stop accepting.
                    return;
                }
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

/// Forwards each received line to the simulation loop. Waits for queue room
/// when the handoff is full (bounded-block policy). EOF and read errors both
/// end the connection.
async fn reader_task(id: Uuid, read_half: OwnedReadHalf, event_tx: mpsc::Sender<ServerEvent>) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if event_tx
                    .send(ServerEvent::LineReceived { id, line })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Ok(None) => {
                debug!("Connection {} closed by peer", id);
                break;
            }
            Err(e) => {
                debug!("Connection {} read error: {}", id, e);
                break;
            }
        }
    }

    let _ = event_tx.send(ServerEvent::Disconnected { id }).await;
}

/// Drains the outbound queue into the socket with newline framing. Any write
/// error ends the task; the next broadcast then reports the connection dead.
async fn writer_task(id: Uuid, mut write_half: OwnedWriteHalf, mut rx: mpsc::Receiver<String>) {
    while let Some(line) = rx.recv().await {
        let mut frame = line.into_bytes();
        frame.push(b'\n');

        if let Err(e) = write_half.write_all(&frame).await {
            debug!("Connection {} write error: {}", id, e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_to_ephemeral_port() {
        let server = Server::bind("127.0.0.1:0", 60).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_connected_event_registers_connection() {
        let mut server = Server::bind("127.0.0.1:0", 60).await.unwrap();
        let (outbound, _rx) = mpsc::channel(4);
        let id = Uuid::new_v4();

        server
            .event_tx
            .clone()
            .send(ServerEvent::Connected { id, outbound })
            .await
            .unwrap();

        assert!(server.connections.is_empty());
        server.drain_events();
        assert_eq!(server.connections.len(), 1);

        server
            .event_tx
            .clone()
            .send(ServerEvent::Disconnected { id })
            .await
            .unwrap();
        server.drain_events();
        assert!(server.connections.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_broadcast_gated_on_live_connections() {
        let mut server = Server::bind("127.0.0.1:0", 60).await.unwrap();
        let dt = 1.0 / 60.0;

        // With nobody connected the tick runs but composes no snapshot.
        server.tick_once(dt);
        assert!(server.connections.is_empty());

        let (outbound, mut rx) = mpsc::channel(4);
        let id = Uuid::new_v4();
        server
            .event_tx
            .clone()
            .send(ServerEvent::Connected { id, outbound })
            .await
            .unwrap();

        // One live connection: the next tick queues exactly one frame, the
        // full-state snapshot. Nothing from the earlier empty tick leaks in.
        server.tick_once(dt);
        let frame = rx.try_recv().unwrap();
        assert!(frame.starts_with("GAME_DATA,"));
        assert!(rx.try_recv().is_err());

        // Once the last connection is gone, ticks queue nothing again.
        server
            .event_tx
            .clone()
            .send(ServerEvent::Disconnected { id })
            .await
            .unwrap();
        server.tick_once(dt);
        assert!(server.connections.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_input_line_moves_paddle_state() {
        let mut server = Server::bind("127.0.0.1:0", 60).await.unwrap();
        let id = Uuid::new_v4();

        server
            .event_tx
            .clone()
            .send(ServerEvent::LineReceived {
                id,
                line: "INPUT,W_DOWN".to_string(),
            })
            .await
            .unwrap();
        server.drain_events();

        use crate::physics::PaddleMotion;
        assert_eq!(
            server.game.world.paddle(shared::PlayerSlot::One).motion,
            PaddleMotion::MovingNegative
        );
    }
}
