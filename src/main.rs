use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::Mutex;

use medmusic::api::{SpotifyApi, TextGenClient};
use medmusic::auth;
use medmusic::config::AppConfig;
use medmusic::controller::AppController;
use medmusic::logging;
use medmusic::model::AppModel;
use medmusic::playback::LibrespotProvider;
use medmusic::session::{LocalStorage, SessionStore};
use medmusic::view::{AppView, Snapshot};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== MedMusic Starting ===");

    let config = AppConfig::from_env();
    tracing::debug!(api_url = %config.api_url, storage = %config.storage_path.display(), "Configuration loaded");

    let session = SessionStore::restore(LocalStorage::open(&config.storage_path));
    let app_model = AppModel::new(session, auth::authorize_url(&config));
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(
        model.clone(),
        SpotifyApi::new(config.api_url.clone()),
        TextGenClient::new(config.text_gen.clone()),
        Arc::new(LibrespotProvider::new()),
    );

    // An optional first argument is the address the app landed on, e.g. a
    // redirect URL carrying the token fragment.
    let landed = match std::env::args().nth(1) {
        Some(href) => controller.land_on(&href).await,
        None => false,
    };
    if !landed && model.lock().await.is_logged_in().await {
        controller.mount_dashboard();
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller.clone()).await;

    controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("MedMusic shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let (snapshot, should_quit) = {
            let model_guard = model.lock().await;
            let snapshot = Snapshot {
                screen: model_guard.screen().await,
                playback: model_guard.get_playback_info().await,
                ui_state: model_guard.get_ui_state().await,
                content_state: model_guard.get_content_state().await,
                accent: model_guard.tick_accent().await,
            };
            (snapshot, model_guard.should_quit().await)
        };

        terminal.draw(|f| AppView::render(f, &snapshot))?;

        if should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = controller.handle_key_event(key).await {
                        tracing::warn!(error = %e, "Key handling failed");
                    }
                }
                Event::Paste(text) => controller.handle_paste(&text).await,
                _ => {}
            }
        }
    }

    Ok(())
}
