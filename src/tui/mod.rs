//! Interactive conversion desk: one tab per conversion kind plus history.
mod app;
mod events;
mod form;
mod layout;
mod rendering;
mod terminal;
mod theme;

use anyhow::Result;
pub use app::App;
pub use theme::{THEME_KEY, Theme};
use tracing::info;

use crate::clipboard::SystemClipboard;
use crate::config::ClientConfig;
use crate::history::HistoryStore;
use crate::utils::default_download_dir;
use terminal::TerminalSession;

/// Run the interactive TUI until the user quits
pub fn run_tui(config: &ClientConfig) -> Result<()> {
    let history = HistoryStore::new(config.open_storage()?);
    let gateway = config.gateway()?;
    info!(server = %config.server_url, "Starting TUI");

    let mut app =
        App::new(history, gateway, Box::new(SystemClipboard::new()), default_download_dir());
    app.start_catalog_fetch();

    let mut session = TerminalSession::enter()?;
    let res = app.run(session.terminal_mut());
    session.restore()?;

    res
}
