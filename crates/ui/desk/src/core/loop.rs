use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, warn};

use crate::{
    action::Action,
    components::Component,
    core::{
        app::DeskApp,
        effects::InternalEvent,
        executor::TaskExecutor,
        reducer::{reduce, reduce_internal},
        state::PageId,
    },
    tui::{Event, EventResponse, Tui},
};

/// The application event loop.
///
/// Responsibilities:
/// - Event polling (input + tick + render scheduling)
/// - Event → Action dispatch (active page first, then global keys)
/// - Action processing: wizard intents are reduced on `DeskState`, effects
///   go to the `TaskExecutor`, executor results come back as actions
/// - Page lifecycle (`on_exit` / `on_enter`) on navigation
/// - Rendering, resize and suspend/resume
///
/// Owns the TUI resources and borrows the `DeskApp` state mutably.
pub struct AppLoop<'a> {
    app: &'a mut DeskApp,
    tui: Tui,
}

impl<'a> AppLoop<'a> {
    pub fn new(app: &'a mut DeskApp) -> Result<Self> {
        let tui = Self::build_tui(app)?;
        Ok(Self { app, tui })
    }

    fn build_tui(app: &DeskApp) -> Result<Tui> {
        Ok(Tui::new()?
            .tick_rate(app.config.ui.tick_rate)
            .frame_rate(app.config.ui.frame_rate))
    }

    /// Run until the application requests quit.
    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let executor = TaskExecutor::new(
            self.app.api.clone(),
            self.app.download_dir.clone(),
            action_tx.clone(),
        );

        self.tui.enter()?;

        for page in self.app.pages.iter_mut() {
            page.register_action_handler(action_tx.clone())?;
        }
        let start = self.app.state.active_page;
        if let Some(page) = self.app.pages.get_mut(start.index()) {
            page.on_enter(&self.app.state)?;
        }

        loop {
            // 1. Input / system events → Actions
            if let Some(ev) = self.tui.next().await {
                self.handle_event(ev, &action_tx)?;
            }

            // 2. Actions → state, effects, pages
            while let Ok(action) = action_rx.try_recv() {
                self.handle_action(action, &action_tx, &executor)?;
            }

            // 3. Lifecycle
            if self.app.should_suspend {
                self.tui.suspend()?;
                action_tx.send(Action::Resume).ok();
                action_tx.send(Action::Render).ok();
                self.tui = Self::build_tui(self.app)?;
                self.tui.resume()?;
            } else if self.app.should_quit {
                self.tui.stop()?;
                break;
            }
        }
        self.tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, ev: Event, action_tx: &UnboundedSender<Action>) -> Result<()> {
        match ev {
            Event::Quit => {
                action_tx.send(Action::Quit).ok();
            }
            Event::Tick => {
                action_tx.send(Action::Tick).ok();
            }
            Event::Render => {
                action_tx.send(Action::Render).ok();
            }
            Event::Resize(w, h) => {
                action_tx.send(Action::Resize(w, h)).ok();
            }
            Event::Key(key) => {
                let app = &mut *self.app;
                let response = match app.pages.get_mut(app.state.active_page.index()) {
                    Some(page) => page.handle_key_events(key, &app.state)?,
                    None => None,
                };
                match response {
                    Some(EventResponse::Stop(action)) => {
                        action_tx.send(action).ok();
                        return Ok(());
                    }
                    Some(EventResponse::Continue(action)) => {
                        action_tx.send(action).ok();
                    }
                    None => {}
                }
                if let Some(action) = global_key(key) {
                    action_tx.send(action).ok();
                }
            }
            Event::Error => {
                action_tx
                    .send(Action::Error("terminal event stream failed".into()))
                    .ok();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_action(
        &mut self,
        action: Action,
        action_tx: &UnboundedSender<Action>,
        executor: &TaskExecutor,
    ) -> Result<()> {
        match &action {
            Action::Tick | Action::Render => {}
            _ => debug!("{action}"),
        }

        match &action {
            Action::Quit => {
                self.app.state.quit_requested = true;
                self.app.should_quit = true;
            }
            Action::Suspend => self.app.should_suspend = true,
            Action::Resume => self.app.should_suspend = false,
            Action::Resize(w, h) => {
                self.tui.resize(Rect::new(0, 0, *w, *h))?;
                self.draw(action_tx)?;
            }
            Action::Render => self.draw(action_tx)?,
            Action::Error(msg) => error!("{msg}"),
            Action::Navigate(target) => self.navigate(*target)?,
            Action::SignupFor(_) => self.navigate(PageId::Signup)?,
            Action::Intent(intent) => {
                executor.run(reduce(&mut self.app.state.wizard, intent.clone()));
            }
            Action::Schedule(task) => {
                executor.spawn(task.clone());
            }
            Action::Internal(event) => {
                executor.run(reduce_internal(&mut self.app.state, event));
                if let Some(notice) = surface(event) {
                    action_tx.send(notice).ok();
                }
            }
            _ => {}
        }

        if let Some(next) = self.app.status_bar.update(&action)? {
            action_tx.send(next).ok();
        }
        if matches!(action, Action::SignupFor(_)) {
            // Statusleiste kennt nur Navigate
            self.app
                .status_bar
                .update(&Action::Navigate(PageId::Signup))?;
        }

        let app = &mut *self.app;
        if let Action::Internal(_) = action {
            for page in app.pages.iter_mut() {
                if let Some(next) = page.update(&action, &app.state)? {
                    action_tx.send(next).ok();
                }
            }
        } else if let Some(page) = app.pages.get_mut(app.state.active_page.index()) {
            if let Some(next) = page.update(&action, &app.state)? {
                action_tx.send(next).ok();
            }
        }
        Ok(())
    }

    fn navigate(&mut self, target: PageId) -> Result<()> {
        let app = &mut *self.app;
        let current = app.state.active_page;
        if current == target {
            return Ok(());
        }
        if let Some(page) = app.pages.get_mut(current.index()) {
            page.on_exit(&app.state)?;
        }
        app.state.active_page = target;
        if let Some(page) = app.pages.get_mut(target.index()) {
            page.on_enter(&app.state)?;
        }
        Ok(())
    }

    fn draw(&mut self, action_tx: &UnboundedSender<Action>) -> Result<()> {
        self.tui.draw(|f| {
            if let Err(err) = self.app.render(f) {
                action_tx
                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                    .ok();
            }
        })?;
        Ok(())
    }
}

/// Keys that work on every page, after the page had its chance.
pub fn global_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(Action::Quit),
        KeyCode::Char('z') if ctrl => Some(Action::Suspend),
        KeyCode::F(n) => PageId::from_index(usize::from(n).checked_sub(1)?).map(Action::Navigate),
        _ => None,
    }
}

/// Network failures outside the wizard become status-line messages.
fn surface(event: &InternalEvent) -> Option<Action> {
    match event {
        InternalEvent::CategoriesFailed(e) => {
            warn!("categories unavailable: {e}");
            Some(Action::Error(format!("Could not load categories: {e}")))
        }
        InternalEvent::OpportunitiesFailed(e) => {
            Some(Action::Error(format!("Could not load opportunities: {e}")))
        }
        InternalEvent::DashboardFailed(e) => {
            Some(Action::Error(format!("Could not load dashboard stats: {e}")))
        }
        InternalEvent::DownloadFinished { path } => {
            Some(Action::Notice(format!("Saved to {}", path.display())))
        }
        InternalEvent::DownloadFailed { error } => {
            Some(Action::Error(format!("Download failed: {error}")))
        }
        _ => None,
    }
}
