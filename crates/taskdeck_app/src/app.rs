use std::io::{self, Stdout};

use anyhow::Context;
use sync_logging::{sync_debug, sync_info, sync_trace, sync_warn};
use taskdeck_core::{apply_view_changes, update, AppState, Msg};
use taskdeck_engine::EngineHandle;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, Command, HELP};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

/// Runs the console until the user quits, stdin closes or the engine stops.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = runtime.block_on(run_loop(config));
    // A pending stdin read would otherwise hold shutdown hostage.
    runtime.shutdown_background();
    result
}

async fn run_loop(config: AppConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::spawn(config.transport_settings())
        .with_context(|| format!("failed to set up HTTP client for {}", config.base_url))?;
    let mut session = Session {
        state: AppState::with_settings(config.sync_settings()),
        runner: EffectRunner::new(engine),
        renderer: TerminalRenderer::new(io::stdout()),
        malformed_seen: 0,
    };
    session.renderer.print_help(HELP);
    session.dispatch(Msg::Started);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            msg = session.runner.next_msg() => match msg {
                Some(msg) => session.dispatch(msg),
                None => {
                    sync_warn!("engine channel closed; exiting");
                    break;
                }
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    sync_info!("stdin closed; exiting");
                    break;
                };
                match commands::parse(&line) {
                    Ok(Some(Command::Dispatch(msg))) => session.dispatch(msg),
                    Ok(Some(Command::Help)) => session.renderer.print_help(HELP),
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(err) => session.renderer.print_help(&err.to_string()),
                }
            }
        }
    }
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer<Stdout>,
    malformed_seen: u64,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        sync_trace!("dispatch {msg:?}");
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        let changes = state.take_view_changes();
        apply_view_changes(&mut self.renderer, &changes);
        if state.consume_dirty() {
            sync_trace!("rendered {} view changes", changes.len());
        }

        let malformed = state.malformed_events();
        if malformed > self.malformed_seen {
            sync_debug!(
                "dropped malformed stream payload(s): {} new, {malformed} total",
                malformed - self.malformed_seen
            );
            self.malformed_seen = malformed;
        }
        self.state = state;

        for effect in effects {
            if let Some(url) = self.runner.run(effect) {
                self.renderer.open_external(&url);
            }
        }
    }
}
