use std::path::PathBuf;
use std::sync::Arc;

use app::Application;
use color_eyre::Result;
use portal::PortalApi;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    components::{Component, StatusBar},
    config::Config,
    core::state::{DeskState, PageId},
    domain::forms::FieldValidator,
    pages::{ExportPage, FormPage, OpportunitiesPage, Page},
};

impl Application for DeskApp {
    const APP_ID: &'static str = "desk";
}

/// Root of the interactive desk: shared state, the four pages and the
/// status bar. The event loop lives in `core::loop`.
pub struct DeskApp {
    pub config: Config,
    pub state: DeskState,
    /// One page per `PageId`, in `PageId` order.
    pub pages: Vec<Box<dyn Page>>,
    pub status_bar: StatusBar,
    pub should_quit: bool,
    pub should_suspend: bool,
    pub api: Arc<dyn PortalApi>,
    pub download_dir: PathBuf,
}

impl DeskApp {
    pub fn new(
        config: Config,
        api: Arc<dyn PortalApi>,
        download_dir: PathBuf,
        start: PageId,
    ) -> Self {
        let signup = FieldValidator::new(config.signup_required()).with_age_gate(config.age_gate());
        let opportunity = FieldValidator::new(config.opportunity_required());

        let pages: Vec<Box<dyn Page>> = vec![
            Box::new(OpportunitiesPage::new()),
            Box::new(ExportPage::new()),
            Box::new(FormPage::signup(signup)),
            Box::new(FormPage::opportunity(opportunity)),
        ];

        Self {
            state: DeskState::new(config.timing(), start),
            pages,
            status_bar: StatusBar::new(start),
            should_quit: false,
            should_suspend: false,
            config,
            api,
            download_dir,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        crate::core::r#loop::AppLoop::new(self)?.run().await
    }

    pub fn active_page_mut(&mut self) -> Option<&mut Box<dyn Page>> {
        self.pages.get_mut(self.state.active_page.index())
    }

    /// Render the active page and the status bar.
    pub fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let [body, footer] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        if let Some(page) = self.pages.get_mut(self.state.active_page.index()) {
            page.draw(frame, body, &self.state)?;
        }
        self.status_bar.draw(frame, footer)?;
        Ok(())
    }
}
