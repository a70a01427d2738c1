//! Conversion history kept in client-local storage.
//!
//! - [`HistoryStore`]: append/list/remove/clear over a [`crate::storage::Storage`]
//! - [`view`]: projects records into rows with download/preview/delete actions
//! - [`actions`]: writes downloads and exports to disk
//! - [`RecentFormats`]: last used source and target formats

pub mod actions;
pub mod recent;
pub mod store;
pub mod view;

pub use actions::{dump_local, perform_download, save_archive};
pub use recent::{RECENT_CAP, RECENT_FORMATS_KEY, RecentFormats};
pub use store::{Answered, Confirm, HISTORY_CAP, HISTORY_KEY, HistoryStore, PromptConfirm};
pub use view::{
    DownloadAction, EMPTY_HISTORY_MESSAGE, HistoryItemView, PreviewAction, UNTITLED, project,
    render_table,
};
