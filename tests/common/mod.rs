#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, Utf8Bytes, WebSocket},
    },
    response::Response,
    routing::any,
};
use futures::FutureExt;
use serde_json::Value;
use team_battle::{
    BattleState, ClientConfig, Viewer,
    game::battle::Notice,
    net::ws::{
        handler::{ClientUpdate, Intent, connect},
        session::setup_session,
    },
};
use tokio::{select, task::JoinHandle, time::timeout};
use tokio_mpmc::{Receiver, Sender, channel};

const WAIT: Duration = Duration::from_secs(5);

/// Stand-in for the battle server: whatever the test pushes on `script` goes
/// to the client, whatever the client sends shows up on `commands`.
pub struct MockServer {
    pub port: u16,
    pub script: Sender<String>,
    pub commands: Receiver<Value>,
    _server: JoinHandle<()>,
}

struct MockState {
    script: Receiver<String>,
    commands: Sender<Value>,
}

pub async fn start_mock_server() -> MockServer {
    let (script_tx, script_rx) = channel(64);
    let (commands_tx, commands_rx) = channel(64);
    let state = Arc::new(MockState {
        script: script_rx,
        commands: commands_tx,
    });

    let app = Router::new()
        .route("/ws", any(mock_upgrade_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener
        .local_addr()
        .expect("Failed to read local addr")
        .port();

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Mock server failed");
    });

    MockServer {
        port,
        script: script_tx,
        commands: commands_rx,
        _server: server,
    }
}

async fn mock_upgrade_handler(
    State(state): State<Arc<MockState>>,
    ws_upgrade: WebSocketUpgrade,
) -> Response {
    ws_upgrade.on_upgrade(async move |ws| mock_socket(ws, state).await)
}

async fn mock_socket(mut ws: WebSocket, state: Arc<MockState>) {
    loop {
        select! {
            res = state.script.recv().fuse() => {
                match res {
                    Ok(Some(text)) if text == "__close__" => {
                        let _ = ws.send(Message::Close(None)).await;
                        break;
                    }
                    Ok(Some(text)) => {
                        if ws.send(Message::Text(Utf8Bytes::from(text))).await.is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            },
            msg = ws.recv().fuse() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let value: Value = serde_json::from_str(text.as_str())
                            .expect("Client sent invalid JSON");
                        let _ = state.commands.send(value).await;
                    }
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
        }
    }
}

impl MockServer {
    pub async fn push(&self, event: Value) {
        self.script
            .send(event.to_string())
            .await
            .expect("Failed to script event");
    }

    pub async fn push_raw(&self, raw: &str) {
        self.script
            .send(raw.to_string())
            .await
            .expect("Failed to script raw message");
    }

    pub async fn close(&self) {
        self.push_raw("__close__").await;
    }

    pub async fn next_command(&self) -> Value {
        timeout(WAIT, self.commands.recv())
            .await
            .expect("Timed out waiting for a client command")
            .expect("Command channel failed")
            .expect("Command channel closed")
    }

    pub async fn no_command_within(&self, wait: Duration) -> bool {
        timeout(wait, self.commands.recv()).await.is_err()
    }
}

pub struct TestClient {
    pub intents: Sender<Intent>,
    pub updates: Receiver<ClientUpdate>,
    pub session: JoinHandle<anyhow::Result<BattleState>>,
}

pub async fn start_client(port: u16, viewer: Viewer) -> TestClient {
    let config = ClientConfig::new(format!("ws://127.0.0.1:{port}/ws"))
        .with_user(viewer)
        .with_page_url("/team-battle?session=s1")
        .with_tick_interval(Duration::from_secs(3600));

    let ctx = setup_session(config.user.as_ref(), config.page_url.as_deref())
        .expect("Session prerequisites should be met");

    let (intent_tx, intent_rx) = channel(64);
    let (update_tx, update_rx) = channel(256);

    let session = tokio::spawn(async move { connect(&config, ctx, intent_rx, update_tx).await });

    TestClient {
        intents: intent_tx,
        updates: update_rx,
        session,
    }
}

impl TestClient {
    pub async fn send(&self, intent: Intent) {
        self.intents
            .send(intent)
            .await
            .expect("Failed to send intent");
    }

    pub async fn wait_for_state(&self, pred: impl Fn(&BattleState) -> bool) -> BattleState {
        timeout(WAIT, async {
            loop {
                match self.updates.recv().await {
                    Ok(Some(ClientUpdate::State(state))) if pred(&*state) => return *state,
                    Ok(Some(_)) => continue,
                    _ => panic!("Update channel closed"),
                }
            }
        })
        .await
        .expect("Timed out waiting for state")
    }

    pub async fn wait_for_notice(&self) -> Notice {
        timeout(WAIT, async {
            loop {
                match self.updates.recv().await {
                    Ok(Some(ClientUpdate::Notice(notice))) => return notice,
                    Ok(Some(_)) => continue,
                    _ => panic!("Update channel closed"),
                }
            }
        })
        .await
        .expect("Timed out waiting for notice")
    }

    pub async fn finish(self) -> BattleState {
        let updates = self.updates;
        let drain = tokio::spawn(async move { while let Ok(Some(_)) = updates.recv().await {} });
        let state = timeout(WAIT, self.session)
            .await
            .expect("Timed out waiting for session to end")
            .expect("Session task panicked")
            .expect("Session failed");
        drain.abort();
        state
    }
}
