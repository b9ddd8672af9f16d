//! Happy-path session tests against in-process fake servers.
//!
//! Each test binds two `127.0.0.1:0` listeners (read port and write port),
//! runs the real engine against them, and asserts on what comes out of the
//! display/persist/status queues and what the fake server receives.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use minechat_sdk::session::{run_session, Sinks};
use minechat_sdk::{SessionConfig, StatusEvent};

/// How long to wait for a queue item before considering the test failed.
const TIMEOUT: Duration = Duration::from_secs(5);

const TOKEN: &str = "11111111-2222-3333-4444-555555555555";
const NICKNAME: &str = "Brave Rabbit";

struct Harness {
    config: SessionConfig,
    read_listener: TcpListener,
    write_listener: TcpListener,
}

async fn harness() -> Harness {
    let read_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let write_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let mut config = SessionConfig::new("127.0.0.1");
    config.read_port = read_listener.local_addr().unwrap().port();
    config.write_port = write_listener.local_addr().unwrap().port();
    // Generous window so the watchdog never interferes with a test that
    // is not about liveness.
    config.watchdog_window = Duration::from_secs(10);
    config.keep_alive_interval = None;

    Harness {
        config,
        read_listener,
        write_listener,
    }
}

/// Feed `lines` to the first client that connects to the read port, then
/// hold the connection open.
fn spawn_read_server(listener: TcpListener, lines: &'static [&'static str]) {
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        for line in lines {
            socket.write_all(line.as_bytes()).await.unwrap();
        }
        // Keep the socket open so the read channel stays parked in its
        // blocking read instead of faulting with EOF.
        std::future::pending::<()>().await;
    });
}

/// Accept write-port clients forever: run the auth handshake, then forward
/// every submission (message line or bare keep-alive) to `seen`, one ack
/// per submission.
fn spawn_write_server(listener: TcpListener) -> mpsc::UnboundedReceiver<String> {
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let seen = seen_tx.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = socket.into_split();
                let mut lines = BufReader::new(read_half);

                write_half
                    .write_all(b"Hello! Enter your personal hash.\n")
                    .await
                    .ok();
                let mut token = String::new();
                if lines.read_line(&mut token).await.unwrap_or(0) == 0 {
                    return;
                }
                assert_eq!(token.trim_end(), TOKEN);
                write_half
                    .write_all(
                        format!(
                            "{{\"nickname\": \"{NICKNAME}\", \"account_hash\": \"{TOKEN}\"}}\n"
                        )
                        .as_bytes(),
                    )
                    .await
                    .ok();
                write_half
                    .write_all(b"Welcome to chat! Post your message below.\n")
                    .await
                    .ok();

                loop {
                    let mut line = String::new();
                    match lines.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            // A non-empty message line is followed by a
                            // blank terminator line.
                            if line != "\n" {
                                let mut terminator = String::new();
                                if lines.read_line(&mut terminator).await.unwrap_or(0) == 0 {
                                    break;
                                }
                            }
                            let _ = seen.send(line);
                            write_half
                                .write_all(b"Message send. Write more, when you're ready.\n")
                                .await
                                .ok();
                        }
                    }
                }
            });
        }
    });
    seen_rx
}

struct Session {
    display: mpsc::UnboundedReceiver<String>,
    persist: mpsc::UnboundedReceiver<String>,
    status: mpsc::UnboundedReceiver<StatusEvent>,
    outbound: mpsc::UnboundedSender<String>,
    task: tokio::task::JoinHandle<minechat_sdk::Result<()>>,
}

fn spawn_session(config: SessionConfig) -> Session {
    let (display_tx, display) = mpsc::unbounded_channel();
    let (persist_tx, persist) = mpsc::unbounded_channel();
    let (status_tx, status) = mpsc::unbounded_channel();
    let (outbound, outbound_rx) = mpsc::unbounded_channel();

    let sinks = Sinks {
        display: display_tx,
        persist: persist_tx,
        status: status_tx,
    };
    let task = tokio::spawn(run_session(config, TOKEN.to_string(), sinks, outbound_rx));

    Session {
        display,
        persist,
        status,
        outbound,
        task,
    }
}

async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>, desc: &str) -> T {
    timeout(TIMEOUT, rx.recv())
        .await
        .unwrap_or_else(|_| panic!("timeout waiting for: {desc}"))
        .unwrap_or_else(|| panic!("queue closed while waiting for: {desc}"))
}

#[tokio::test]
async fn feed_lines_reach_both_sinks_in_order() {
    let h = harness().await;
    spawn_read_server(h.read_listener, &["Hello\n", "Second message\n"]);
    let _seen = spawn_write_server(h.write_listener);

    let mut session = spawn_session(h.config);

    assert_eq!(recv(&mut session.display, "first display line").await, "Hello");
    assert_eq!(
        recv(&mut session.display, "second display line").await,
        "Second message"
    );

    assert_eq!(recv(&mut session.persist, "first raw line").await, "Hello\n");
    assert_eq!(
        recv(&mut session.persist, "second raw line").await,
        "Second message\n"
    );

    session.task.abort();
}

#[tokio::test]
async fn nickname_announced_once_before_first_send() {
    let h = harness().await;
    spawn_read_server(h.read_listener, &[]);
    let mut seen = spawn_write_server(h.write_listener);

    let mut session = spawn_session(h.config);
    // Queued before the session even connects; it must not hit the wire
    // until the handshake is done.
    session.outbound.send("hi everyone".to_string()).unwrap();

    let event = loop {
        match recv(&mut session.status, "NicknameReceived").await {
            StatusEvent::NicknameReceived(nick) => break nick,
            _ => continue,
        }
    };
    assert_eq!(event, NICKNAME);

    assert_eq!(
        recv(&mut seen, "message on the server side").await,
        "hi everyone\n"
    );

    // Exactly one nickname announcement for the whole attempt.
    let mut announcements = 0;
    while let Ok(event) = session.status.try_recv() {
        if matches!(event, StatusEvent::NicknameReceived(_)) {
            announcements += 1;
        }
    }
    assert_eq!(announcements, 0);

    session.task.abort();
}

#[tokio::test]
async fn keep_alive_pings_flow_on_idle_queue() {
    let mut h = harness().await;
    h.config.keep_alive_interval = Some(Duration::from_millis(100));
    spawn_read_server(h.read_listener, &[]);
    let mut seen = spawn_write_server(h.write_listener);

    let session = spawn_session(h.config);

    // No user traffic at all; the merged sender must still produce
    // periodic bare newlines.
    for i in 0..3 {
        let line = recv(&mut seen, "keep-alive ping").await;
        assert_eq!(line, "\n", "ping {i} was not a bare newline");
    }

    session.task.abort();
}

#[tokio::test]
async fn empty_outbound_message_is_framed_not_dropped() {
    let h = harness().await;
    spawn_read_server(h.read_listener, &[]);
    let mut seen = spawn_write_server(h.write_listener);

    let session = spawn_session(h.config);
    session.outbound.send(String::new()).unwrap();
    session.outbound.send("after the ping".to_string()).unwrap();

    // The empty message reaches the wire as a bare newline, in queue
    // order, ahead of the message sent after it.
    assert_eq!(recv(&mut seen, "bare newline frame").await, "\n");
    assert_eq!(
        recv(&mut seen, "following message").await,
        "after the ping\n"
    );

    session.task.abort();
}
