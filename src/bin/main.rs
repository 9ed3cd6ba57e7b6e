use anyhow::Result;
use team_battle::{
    BattleState, ClientConfig,
    net::ws::{
        handler::{ClientUpdate, Intent, connect},
        session::setup_session,
    },
    view::screen::Screen,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    select,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "team_battle=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;

    let ctx = match setup_session(config.user.as_ref(), config.page_url.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!(error = %e, redirect = e.redirect_to(), "Cannot join battle");
            println!("Cannot join the battle ({e}). Returning to {}", e.redirect_to());
            return Ok(());
        }
    };

    let (intent_tx, intent_rx) = tokio_mpmc::channel(config.channel_capacity);
    let (update_tx, update_rx) = tokio_mpmc::channel(config.channel_capacity);

    let mut session = tokio::spawn(async move {
        connect(&config, ctx, intent_rx, update_tx).await
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut latest: Option<BattleState> = None;
    let mut stdin_open = true;

    loop {
        select! {
            res = update_rx.recv() => {
                match res {
                    Ok(Some(ClientUpdate::State(state))) => {
                        println!("\n{}", Screen::new(&state));
                        latest = Some(*state);
                    }
                    Ok(Some(ClientUpdate::Notice(notice))) => println!(">> {notice}"),
                    _ => break,
                }
            },
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    let _ = intent_tx.send(Intent::Leave).await;
                    continue;
                };
                match read_intent(line.trim(), latest.as_ref()) {
                    Some(intent) => {
                        let _ = intent_tx.send(intent).await;
                    }
                    None => println!("Commands: <answer number>, finalize, <enter> to dismiss, home"),
                }
            },
            res = &mut session => {
                let state = res??;
                tracing::info!(phase = ?state.phase, "Session finished");
                return Ok(());
            }
        }
    }

    let state = session.await??;
    tracing::info!(phase = ?state.phase, "Session finished");
    Ok(())
}

fn read_intent(input: &str, state: Option<&BattleState>) -> Option<Intent> {
    match input {
        "" => Some(Intent::DismissFeedback),
        "f" | "finalize" => Some(Intent::FinalizeAnswer),
        "home" | "q" | "quit" => Some(Intent::Leave),
        _ => {
            let index: usize = input.parse().ok()?;
            let question = state?.current_question.as_ref()?;
            let answer = question.answers.get(index.checked_sub(1)?)?;
            Some(Intent::SelectAnswer(answer.id.clone()))
        }
    }
}
