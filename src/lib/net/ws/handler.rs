use std::time::Duration;

use anyhow::anyhow;

use futures::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use tokio::{select, time::MissedTickBehavior};
use tokio_mpmc::{Receiver, Sender};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
};

use crate::{
    AnswerId, ClientConfig,
    api::messages::{ClientCommand, ServerEvent},
    error::IntentError,
    game::battle::{BattleState, Notice},
    net::{connection::ConnectionStatus, ws::session::SessionContext},
};

/// What the viewer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectAnswer(AnswerId),
    FinalizeAnswer,
    DismissFeedback,
    Leave,
}

/// Published after every change so a front end can redraw.
#[derive(Debug, Clone)]
pub enum ClientUpdate {
    State(Box<BattleState>),
    Notice(Notice),
}

/// Connects to the battle server and runs the session until either side stops.
pub async fn connect(
    config: &ClientConfig,
    ctx: SessionContext,
    intents: Receiver<Intent>,
    updates: Sender<ClientUpdate>,
) -> anyhow::Result<BattleState> {
    tracing::info!(url = %config.server_url, "Connecting to battle server");
    let (ws, _response) = connect_async(config.server_url.as_str()).await?;
    run_session(ws, ctx, intents, updates, config.tick_interval).await
}

/// Main client loop. Owns the battle state; server events, intents and timer
/// ticks are applied one at a time in the order they arrive.
#[tracing::instrument(
    name = "battle_session",
    skip_all,
    fields(session_id = %ctx.session_id, user_id = ctx.viewer.user_id)
)]
pub async fn run_session<S>(
    mut ws: S,
    ctx: SessionContext,
    intents: Receiver<Intent>,
    updates: Sender<ClientUpdate>,
    tick_interval: Duration,
) -> anyhow::Result<BattleState>
where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    let SessionContext { session_id, viewer } = ctx;
    let mut state = BattleState::new(viewer);

    send_command(&mut ws, &state.snapshot_request(&session_id)).await?;

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let mut failure: Option<anyhow::Error> = None;

    loop {
        select! {
            msg = ws.next() => {
                let msg = match msg {
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Server closed the connection");
                        break;
                    }
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket read failed");
                        failure = Some(e.into());
                        break;
                    }
                    None => {
                        tracing::warn!("WebSocket ended without a close frame");
                        failure = Some(anyhow!("connection ended without a close frame"));
                        break;
                    }
                };

                let Some(event) = parse_message(msg, &mut ws).await? else {
                    continue;
                };

                let kind = event.kind();
                let notice = state.apply(event);
                tracing::debug!(kind, phase = ?state.phase, "Applied server event");
                publish(&updates, &state, notice).await;
            },
            res = intents.recv().fuse() => {
                let intent = match res {
                    Ok(Some(intent)) => intent,
                    _ => break, // Channel closed, exit loop
                };
                if !handle_intent(&mut state, intent, &mut ws, &updates).await? {
                    break;
                }
            },
            _ = ticker.tick() => {
                if state.tick() {
                    publish(&updates, &state, None).await;
                }
            }
        }
    }

    state.connection = ConnectionStatus::Disconnected;
    publish(&updates, &state, None).await;

    if let Some(e) = failure {
        return Err(e);
    }
    tracing::info!("Battle session ending");
    Ok(state)
}

/// Parse a WebSocket message into a ServerEvent. Anything unreadable is
/// logged and skipped.
async fn parse_message<S>(msg: Message, ws: &mut S) -> anyhow::Result<Option<ServerEvent>>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    match msg {
        Message::Text(text) => match serde_json::from_str::<ServerEvent>(text.as_str()) {
            Ok(event) => Ok(Some(event)),
            Err(e) => {
                tracing::warn!(error = %e, payload = %text.as_str(), "Failed to parse ServerEvent");
                Ok(None)
            }
        },
        Message::Ping(data) => {
            ws.send(Message::Pong(data)).await?;
            Ok(None)
        }
        Message::Pong(_) | Message::Close(_) | Message::Frame(_) => Ok(None),
        Message::Binary(_) => {
            tracing::warn!("Unexpected binary message");
            Ok(None)
        }
    }
}

/// Applies one intent. Returns `false` when the viewer is leaving.
async fn handle_intent<S>(
    state: &mut BattleState,
    intent: Intent,
    ws: &mut S,
    updates: &Sender<ClientUpdate>,
) -> anyhow::Result<bool>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    let outcome: Result<Option<ClientCommand>, IntentError> = match intent {
        Intent::SelectAnswer(answer_id) => state.select_answer(&answer_id).map(Some),
        Intent::FinalizeAnswer => state.finalize_answer().map(Some),
        Intent::DismissFeedback => {
            state.dismiss_feedback();
            Ok(None)
        }
        Intent::Leave => return Ok(false),
    };

    match outcome {
        Ok(Some(cmd)) => {
            send_command(ws, &cmd).await?;
            publish(updates, state, None).await;
        }
        Ok(None) => publish(updates, state, None).await,
        Err(e) => {
            tracing::info!(error = %e, "Intent rejected locally");
            publish(updates, state, Some(Notice::Rejected(e))).await;
        }
    }
    Ok(true)
}

async fn send_command<S>(ws: &mut S, cmd: &ClientCommand) -> anyhow::Result<()>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    let text = serde_json::to_string(cmd)?;
    tracing::debug!(%text, "Sending command");
    ws.send(Message::text(text)).await?;
    Ok(())
}

async fn publish(updates: &Sender<ClientUpdate>, state: &BattleState, notice: Option<Notice>) {
    if let Some(notice) = notice {
        let _ = updates.send(ClientUpdate::Notice(notice)).await;
    }
    let _ = updates
        .send(ClientUpdate::State(Box::new(state.clone())))
        .await;
}
