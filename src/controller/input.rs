//! Key event handling

use std::future::Future;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{DashboardFocus, Screen};
use super::AppController;
use super::playback::SEEK_STEP_MS;

impl AppController {
    /// Run a network-bound action in the background so input stays responsive.
    fn spawn_task<F, Fut>(&self, task: F)
    where
        F: FnOnce(AppController) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(task(self.clone()));
    }

    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.model.lock().await.set_should_quit(true).await;
            return Ok(());
        }

        let model = self.model.lock().await;

        // The alert dialog blocks all other interactions
        if model.has_alert().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_alert().await;
            }
            return Ok(());
        }

        let screen = model.screen().await;
        drop(model);

        match screen {
            Screen::Login => self.handle_login_key(key).await,
            Screen::Dashboard => self.handle_dashboard_key(key).await,
            Screen::Playlist { .. } => self.handle_playlist_key(key).await,
        }
    }

    /// Bracketed paste; only the login input takes pasted text.
    pub async fn handle_paste(&self, text: &str) {
        let model = self.model.lock().await;
        if model.screen().await == Screen::Login && !model.has_alert().await {
            model.append_str_to_login_input(text).await;
        }
    }

    async fn handle_login_key(&self, key: KeyEvent) -> Result<()> {
        let model = self.model.lock().await;
        match key.code {
            KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                drop(model);
                self.open_login_page().await;
            }
            KeyCode::Char(c) => model.append_to_login_input(c).await,
            KeyCode::Backspace => model.backspace_login_input().await,
            KeyCode::Enter => {
                drop(model);
                self.submit_login().await;
            }
            KeyCode::Esc => model.set_should_quit(true).await,
            _ => {}
        }
        Ok(())
    }

    async fn handle_dashboard_key(&self, key: KeyEvent) -> Result<()> {
        let model = self.model.lock().await;
        let ui_state = model.get_ui_state().await;

        match key.code {
            KeyCode::Tab => {
                model.cycle_focus_forward().await;
                return Ok(());
            }
            KeyCode::BackTab => {
                model.cycle_focus_backward().await;
                return Ok(());
            }
            _ => {}
        }

        if ui_state.focus == DashboardFocus::Search {
            match key.code {
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    model.set_focus(DashboardFocus::Results).await;
                    drop(model);
                    self.spawn_task(|c| async move { c.perform_search(&query).await });
                }
                KeyCode::Esc => model.clear_search().await,
                KeyCode::Backspace => model.backspace_search().await,
                KeyCode::Char(c) => model.append_to_search(c).await,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Up => model.move_selection_up().await,
            KeyCode::Down => model.move_selection_down().await,
            KeyCode::Enter => {
                drop(model);
                match ui_state.focus {
                    DashboardFocus::Playlists => {
                        self.spawn_task(|c| async move { c.open_selected_playlist().await })
                    }
                    DashboardFocus::Results => {
                        self.spawn_task(|c| async move { c.play_selected_result().await })
                    }
                    DashboardFocus::Search => {}
                }
            }
            KeyCode::Char('/') => model.set_focus(DashboardFocus::Search).await,
            KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true).await,
            _ => {
                drop(model);
                self.handle_transport_key(key);
            }
        }
        Ok(())
    }

    async fn handle_playlist_key(&self, key: KeyEvent) -> Result<()> {
        let model = self.model.lock().await;
        match key.code {
            KeyCode::Up => model.move_selection_up().await,
            KeyCode::Down => model.move_selection_down().await,
            KeyCode::Enter => {
                drop(model);
                self.spawn_task(|c| async move { c.play_selected_page_track().await });
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('B') => {
                drop(model);
                self.back_to_library().await;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true).await,
            _ => {
                drop(model);
                self.handle_transport_key(key);
            }
        }
        Ok(())
    }

    fn handle_transport_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.spawn_task(|c| async move { c.toggle_playback().await }),
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.spawn_task(|c| async move { c.next_track().await })
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.spawn_task(|c| async move { c.previous_track().await })
            }
            KeyCode::Right => self.spawn_task(|c| async move { c.seek_relative(SEEK_STEP_MS).await }),
            KeyCode::Left => self.spawn_task(|c| async move { c.seek_relative(-SEEK_STEP_MS).await }),
            _ => {}
        }
    }
}
