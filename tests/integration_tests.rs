//! Integration tests exercising the server and client over real TCP sockets.

use server::net::Server;
use shared::ServerMessage;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};

async fn start_server() -> SocketAddr {
    let server = Server::bind("127.0.0.1:0", 60)
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("Failed to connect");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn next_message(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> ServerMessage {
    let line = timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("Timed out waiting for a frame")
        .expect("Read error")
        .expect("Server closed the connection");
    ServerMessage::parse(&line).expect("Unparsable frame")
}

/// Skips forward to the next full-state snapshot.
async fn next_game_data(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
) -> (f32, f32, f32, f32, f32, Option<(f32, f32)>) {
    loop {
        if let ServerMessage::GameData {
            p1_y,
            p2_y,
            p3_x,
            ball_x,
            ball_y,
            power_up,
        } = next_message(lines).await
        {
            return (p1_y, p2_y, p3_x, ball_x, ball_y, power_up);
        }
    }
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) {
    let mut frame = line.as_bytes().to_vec();
    frame.push(b'\n');
    writer.write_all(&frame).await.expect("Write failed");
}

#[tokio::test]
async fn player_id_is_the_first_frame_and_unique() {
    let addr = start_server().await;

    let (mut lines_a, _writer_a) = connect(addr).await;
    let (mut lines_b, _writer_b) = connect(addr).await;

    let id_a = match next_message(&mut lines_a).await {
        ServerMessage::PlayerId(id) => id,
        other => panic!("Expected PLAYER_ID first, got {:?}", other),
    };
    let id_b = match next_message(&mut lines_b).await {
        ServerMessage::PlayerId(id) => id,
        other => panic!("Expected PLAYER_ID first, got {:?}", other),
    };

    assert_ne!(id_a, id_b);
}

#[tokio::test]
async fn game_data_streams_while_connected() {
    let addr = start_server().await;
    let (mut lines, _writer) = connect(addr).await;

    // Snapshots arrive every tick; the power-up is still on the field this
    // early in the match.
    let (p1_y, p2_y, p3_x, _ball_x, _ball_y, power_up) = next_game_data(&mut lines).await;
    assert_eq!(p1_y, 270.0);
    assert_eq!(p2_y, 270.0);
    assert_eq!(p3_x, 370.0);
    assert_eq!(power_up, Some((400.0, 300.0)));

    // And they keep coming.
    next_game_data(&mut lines).await;
    next_game_data(&mut lines).await;
}

#[tokio::test]
async fn input_moves_the_bound_paddle_and_stop_halts_it() {
    let addr = start_server().await;
    let (mut lines, mut writer) = connect(addr).await;

    let (baseline, ..) = next_game_data(&mut lines).await;

    // W drives paddle 1 up (toward smaller y).
    send_line(&mut writer, "INPUT,W_DOWN").await;

    let moved = timeout(Duration::from_secs(2), async {
        loop {
            let (p1_y, ..) = next_game_data(&mut lines).await;
            if p1_y < baseline - 5.0 {
                return p1_y;
            }
        }
    })
    .await
    .expect("Paddle never moved");
    assert!(moved < baseline);

    send_line(&mut writer, "INPUT,W_UP").await;

    // After the release is processed, consecutive snapshots agree.
    timeout(Duration::from_secs(2), async {
        let mut previous = f32::NAN;
        loop {
            let (p1_y, ..) = next_game_data(&mut lines).await;
            if p1_y == previous {
                return;
            }
            previous = p1_y;
        }
    })
    .await
    .expect("Paddle never came to rest");
}

#[tokio::test]
async fn unbound_keys_and_garbage_are_ignored() {
    let addr = start_server().await;
    let (mut lines, mut writer) = connect(addr).await;

    let (baseline, ..) = next_game_data(&mut lines).await;

    send_line(&mut writer, "INPUT,X_DOWN,W_HELD,not a token").await;
    send_line(&mut writer, "complete nonsense").await;

    sleep(Duration::from_millis(100)).await;

    // The stream is still healthy and nothing moved.
    let (p1_y, ..) = next_game_data(&mut lines).await;
    assert_eq!(p1_y, baseline);
}

#[tokio::test]
async fn disconnect_leaves_other_connections_unaffected() {
    let addr = start_server().await;

    let (mut lines_a, _writer_a) = connect(addr).await;
    let (lines_b, writer_b) = connect(addr).await;

    next_game_data(&mut lines_a).await;

    drop(lines_b);
    drop(writer_b);
    sleep(Duration::from_millis(100)).await;

    // The surviving client keeps receiving snapshots.
    next_game_data(&mut lines_a).await;
    next_game_data(&mut lines_a).await;
}

#[tokio::test]
async fn client_crate_relays_input_end_to_end() {
    let addr = start_server().await;

    // Observer connection watches paddle 1 through snapshots.
    let (mut observer, _writer) = connect(addr).await;
    let (baseline, ..) = next_game_data(&mut observer).await;

    // Protocol client drives paddle 1 via the key toggle model.
    let client = client::network::Client::connect(&addr.to_string())
        .await
        .expect("Client failed to connect");
    let (key_tx, key_rx) = mpsc::channel(4);
    let client_task = tokio::spawn(async move {
        let mut client = client;
        client.run(key_rx).await.unwrap();
        client
    });

    key_tx.send('w').await.unwrap();

    timeout(Duration::from_secs(2), async {
        loop {
            let (p1_y, ..) = next_game_data(&mut observer).await;
            if p1_y < baseline - 5.0 {
                return;
            }
        }
    })
    .await
    .expect("Client input never reached the paddle");

    // Closing the key source releases held keys and ends the client loop.
    drop(key_tx);
    let client = timeout(Duration::from_secs(2), client_task)
        .await
        .expect("Client loop did not stop")
        .unwrap();

    // The client's view tracked the authoritative stream meanwhile.
    assert!(client.state.player_id.is_some());
}
