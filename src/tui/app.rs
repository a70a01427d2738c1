//! Interactive conversion desk: forms, history pane and background work.
//!
//! `App` owns everything the interface shows: one form per conversion
//! tab, the history list, the last conversion result, open dialogs and
//! the status line. Nothing lives in globals; the renderer receives a
//! borrowed [`RenderState`] snapshot each frame.
//!
//! Network work never runs on the event loop. Conversions go through
//! [`spawn_submission`], downloads and exports through a background task,
//! and the loop polls their channels once per tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, warn};

use super::events::{Action, KeyContext, poll_event};
use super::form::{ConversionForm, Field, Tab};
use super::rendering::{RenderState, render_ui};
use super::theme::Theme;
use crate::clipboard::{ClipboardSink, copy_with};
use crate::error::ConvertError;
use crate::gateway::{
    ConversionGateway, HttpTransport, SimulatedProgress, Submission, SubmissionState,
    spawn_submission,
};
use crate::history::{
    Answered, DownloadAction, HistoryItemView, HistoryStore, PreviewAction, RecentFormats,
    dump_local, perform_download, project, save_archive,
};
use crate::models::{
    ConversionKind, ConversionOutcome, FormatCatalog, HistoryRecord, PendingConversionRequest,
};
use crate::preview::{PreviewContent, PreviewSlot};
use crate::storage::Storage;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;

const PAGE_SIZE: isize = 10;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Dialog drawn over the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ConfirmClear,
    Preview,
}

/// What the result pane shows after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Converted { record: HistoryRecord, outcome: ConversionOutcome },
    Failed { kind: ConversionKind, message: String },
}

/// Download or export running off the event loop.
struct BackgroundTask {
    label: &'static str,
    receiver: Receiver<Result<PathBuf>>,
}

pub struct App<S: Storage, T: HttpTransport + Clone + 'static> {
    tab: Tab,
    forms: Vec<ConversionForm>,
    history: HistoryStore<S>,
    history_items: Vec<HistoryItemView>,
    selected_idx: usize,
    recent: RecentFormats,
    catalog: FormatCatalog,
    catalog_rx: Option<Receiver<Result<FormatCatalog, ConvertError>>>,
    theme: Theme,
    gateway: ConversionGateway<T>,
    submission: Option<Submission>,
    state: SubmissionState,
    progress: Option<SimulatedProgress>,
    result: Option<ResultView>,
    task: Option<BackgroundTask>,
    overlay: Overlay,
    preview: PreviewSlot,
    preview_scroll: u16,
    clipboard: Box<dyn ClipboardSink>,
    download_dir: PathBuf,
    should_quit: bool,
    // Status message (conversion feedback, clipboard, downloads)
    status_message: Option<StatusMessage>,
    // Redraw bookkeeping
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<S: Storage, T: HttpTransport + Clone + 'static> App<S, T> {
    pub fn new(
        history: HistoryStore<S>,
        gateway: ConversionGateway<T>,
        clipboard: Box<dyn ClipboardSink>,
        download_dir: PathBuf,
    ) -> Self {
        let recent = RecentFormats::load(history.storage());
        let theme = Theme::load(history.storage());
        let catalog = FormatCatalog::default();
        let forms = Tab::ALL
            .iter()
            .filter_map(Tab::kind)
            .map(|kind| ConversionForm::new(kind, &catalog, &recent))
            .collect();

        let mut app = Self {
            tab: Tab::File,
            forms,
            history,
            history_items: Vec::new(),
            selected_idx: 0,
            recent,
            catalog,
            catalog_rx: None,
            theme,
            gateway,
            submission: None,
            state: SubmissionState::Idle,
            progress: None,
            result: None,
            task: None,
            overlay: Overlay::None,
            preview: PreviewSlot::new(),
            preview_scroll: 0,
            clipboard,
            download_dir,
            should_quit: false,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        };
        app.refresh_history();
        app
    }

    /// Fetch the server's format catalog in the background. The built-in
    /// list stays in place if the fetch fails.
    pub fn start_catalog_fetch(&mut self) {
        let gateway = self.gateway.clone();
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(gateway.fetch_formats());
        });
        self.catalog_rx = Some(receiver);
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.tick(now);

            // Draw if dirty or if it's been >100ms (progress, resize)
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                let state = self.render_state(now);
                terminal.draw(|f| render_ui(f, &state))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100), self.key_context())?;
            self.handle_action(action);
        }

        Ok(())
    }

    pub fn render_state(&self, now: Instant) -> RenderState<'_> {
        RenderState {
            tab: self.tab,
            form: self.current_form(),
            history_items: &self.history_items,
            selected_idx: self.selected_idx,
            result: self.result.as_ref(),
            progress: self.progress.filter(|p| p.is_visible(now)).map(|p| p.percent(now)),
            busy_label: self.task.as_ref().map(|t| t.label),
            overlay: self.overlay,
            preview: self.preview.current(),
            preview_scroll: self.preview_scroll,
            palette: self.theme.palette(),
            status_message: self.status_message.as_ref(),
            submitting: self.state.is_pending(),
        }
    }

    fn key_context(&self) -> KeyContext {
        if self.overlay != Overlay::None {
            KeyContext::Overlay
        } else if self.tab == Tab::History {
            KeyContext::History
        } else {
            KeyContext::Form
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType) {
        let duration_ms = match message_type {
            MessageType::Error => STATUS_ERROR_DURATION_MS,
            MessageType::Info | MessageType::Success => STATUS_SUCCESS_DURATION_MS,
        };
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Poll background channels and expire the status line.
    fn tick(&mut self, now: Instant) {
        if self.status_message.as_ref().is_some_and(|msg| now >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }

        self.poll_catalog();

        if let Some(result) = self.submission.as_ref().and_then(Submission::poll) {
            self.finish_submission(result, now);
        }

        self.poll_task();
    }

    fn poll_catalog(&mut self) {
        let Some(receiver) = &self.catalog_rx else { return };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.catalog_rx = None;
                return;
            }
        };
        self.catalog_rx = None;

        match result {
            Ok(catalog) => {
                debug!(
                    inputs = catalog.input_formats.len(),
                    outputs = catalog.output_formats.len(),
                    "Loaded format catalog"
                );
                self.catalog = catalog;
                self.refresh_pickers();
            }
            Err(e) => warn!(error = %e, "Using built-in format list"),
        }
    }

    fn poll_task(&mut self) {
        let Some(task) = &self.task else { return };
        let result = match task.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("{} was interrupted", task.label))
            }
        };
        self.task = None;

        match result {
            Ok(path) => {
                self.set_status(format!("✓ Saved {}", path.display()), MessageType::Success)
            }
            Err(e) => self.set_status(format!("✗ {:#}", e), MessageType::Error),
        }
    }

    /// Apply one action to the app state
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => self.close_overlay(),
            Action::SwitchTab(tab) => self.switch_tab(tab),
            Action::NextTab => self.switch_tab(self.tab.next()),
            Action::NextField => self.with_form(ConversionForm::focus_next),
            Action::PrevField => self.with_form(ConversionForm::focus_prev),
            Action::Left => self.with_form(|f| f.cycle_format(-1)),
            Action::Right => self.with_form(|f| f.cycle_format(1)),
            Action::MoveUp => self.scroll(-1),
            Action::MoveDown => self.scroll(1),
            Action::PageUp => self.scroll(-PAGE_SIZE),
            Action::PageDown => self.scroll(PAGE_SIZE),
            Action::Enter => self.enter(),
            Action::Backspace => self.with_form(ConversionForm::backspace),
            Action::Input(c) => self.with_form(|f| f.insert_char(c)),
            Action::Submit => self.submit(),
            Action::ToggleHelp => {
                self.overlay =
                    if self.overlay == Overlay::Help { Overlay::None } else { Overlay::Help };
                self.needs_redraw = true;
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                self.theme.save(self.history.storage_mut());
                self.set_status(format!("Theme: {}", self.theme.as_str()), MessageType::Info);
            }
            Action::CopyResult => self.copy_result(),
            Action::SaveResult => self.save_result(),
            Action::PreviewFile => self.preview_file(),
            Action::HistoryDownload => {
                match self.selected_item().and_then(|item| item.download.clone()) {
                    Some(action) => self.start_download(action),
                    None => self.set_status("✗ Nothing to download", MessageType::Error),
                }
            }
            Action::HistoryPreview => self.preview_history_item(),
            Action::HistoryDelete => self.delete_history_item(),
            Action::HistoryClear => {
                if self.history_items.is_empty() {
                    self.set_status("History is already empty", MessageType::Info);
                } else {
                    self.overlay = Overlay::ConfirmClear;
                    self.needs_redraw = true;
                }
            }
            Action::HistoryExport => self.export_history(),
            Action::HistoryDump => self.dump_history(),
            Action::Confirm => {
                if self.overlay == Overlay::ConfirmClear {
                    self.history.clear(&mut Answered(true));
                    self.refresh_history();
                    self.set_status("Conversion history cleared", MessageType::Info);
                }
                self.close_overlay();
            }
            Action::Decline => self.close_overlay(),
            Action::None => {}
        }
    }

    fn current_form(&self) -> Option<&ConversionForm> {
        let kind = self.tab.kind()?;
        self.forms.iter().find(|f| f.kind == kind)
    }

    fn current_form_mut(&mut self) -> Option<&mut ConversionForm> {
        let kind = self.tab.kind()?;
        self.forms.iter_mut().find(|f| f.kind == kind)
    }

    fn with_form(&mut self, edit: impl FnOnce(&mut ConversionForm)) {
        if let Some(form) = self.current_form_mut() {
            edit(form);
            self.needs_redraw = true;
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab == Tab::History {
            self.refresh_history();
        }
        self.tab = tab;
        self.needs_redraw = true;
    }

    fn close_overlay(&mut self) {
        if self.overlay == Overlay::Preview {
            self.preview.close();
        }
        self.overlay = Overlay::None;
        self.preview_scroll = 0;
        self.needs_redraw = true;
    }

    fn scroll(&mut self, delta: isize) {
        match self.overlay {
            Overlay::Preview => {
                let next = (self.preview_scroll as isize + delta).max(0);
                self.preview_scroll = u16::try_from(next).unwrap_or(u16::MAX);
                self.needs_redraw = true;
            }
            Overlay::None if self.tab == Tab::History => self.move_selection(delta),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.history_items.len();
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    /// Enter adds an option tag, breaks a line in text bodies, and
    /// submits everywhere else.
    fn enter(&mut self) {
        let Some(form) = self.current_form_mut() else { return };
        match form.focused() {
            Field::Options => match form.commit_option() {
                Ok(true) => self.needs_redraw = true,
                Ok(false) => self.set_status("Option already added", MessageType::Info),
                Err(e) => self.set_status(format!("✗ {}", e), MessageType::Error),
            },
            Field::Input if form.has_body_input() => {
                form.newline();
                self.needs_redraw = true;
            }
            _ => self.submit(),
        }
    }

    fn submit(&mut self) {
        if self.state.is_pending() {
            self.set_status("A conversion is already in progress", MessageType::Info);
            return;
        }
        let Some(form) = self.current_form() else {
            self.set_status("✗ Pick a conversion tab first", MessageType::Error);
            return;
        };

        // Local validation failures never reach the worker
        let request = form.build_request().and_then(|request| {
            request.validate()?;
            Ok(request)
        });
        match request {
            Ok(request) => self.begin_submission(request),
            Err(e) => {
                let kind = form.kind;
                self.show_failure(kind, e.to_string());
            }
        }
    }

    fn begin_submission(&mut self, request: PendingConversionRequest) {
        // Each submission gets a fresh state machine
        self.state = SubmissionState::Idle;
        self.state.begin();
        self.progress = Some(SimulatedProgress::start(Instant::now()));
        self.result = None;
        self.submission = Some(spawn_submission(self.gateway.clone(), request));
        self.set_status("Converting…", MessageType::Info);
    }

    fn finish_submission(&mut self, result: Result<ConversionOutcome, ConvertError>, now: Instant) {
        let Some(submission) = self.submission.take() else { return };
        let request = submission.request().clone();
        if let Some(progress) = &mut self.progress {
            progress.complete(now);
        }

        match &result {
            Ok(outcome) => {
                let record = self.history.append(HistoryRecord::from_outcome(
                    request.display_name(),
                    request.kind,
                    &request.from_format,
                    &request.to_format,
                    outcome,
                    Utc::now(),
                ));
                if request.kind != ConversionKind::Image {
                    self.recent.record(&request.from_format, &request.to_format);
                    self.recent.save(self.history.storage_mut());
                    self.refresh_pickers();
                }
                self.refresh_history();
                self.result = Some(ResultView::Converted { record, outcome: outcome.clone() });
                self.set_status("✓ Conversion completed successfully", MessageType::Success);
            }
            Err(e) => self.show_failure(request.kind, e.to_string()),
        }
        self.state.finish(result);
    }

    fn show_failure(&mut self, kind: ConversionKind, message: String) {
        self.set_status(format!("✗ {}", message), MessageType::Error);
        self.result = Some(ResultView::Failed { kind, message });
    }

    fn refresh_pickers(&mut self) {
        for form in &mut self.forms {
            form.apply_catalog(&self.catalog, &self.recent);
        }
        self.needs_redraw = true;
    }

    fn refresh_history(&mut self) {
        self.history_items = project(&self.history.list());
        if self.selected_idx >= self.history_items.len() {
            self.selected_idx = self.history_items.len().saturating_sub(1);
        }
        self.needs_redraw = true;
    }

    fn selected_item(&self) -> Option<&HistoryItemView> {
        self.history_items.get(self.selected_idx)
    }

    /// Text the copy shortcut puts on the clipboard for the current view.
    fn copyable_text(&self) -> Option<String> {
        if self.tab == Tab::History {
            let item = self.selected_item()?;
            return match (&item.preview, &item.download) {
                (Some(PreviewAction::ShowText { content, .. }), _) => Some(content.clone()),
                (_, Some(DownloadAction::Navigate { url })) => Some(self.gateway.absolute_url(url)),
                _ => None,
            };
        }

        match self.result.as_ref()? {
            ResultView::Converted { outcome, .. } => outcome
                .content
                .clone()
                .or_else(|| outcome.base64.clone())
                .or_else(|| outcome.download_url.as_deref().map(|u| self.gateway.absolute_url(u))),
            ResultView::Failed { .. } => None,
        }
    }

    fn copy_result(&mut self) {
        let Some(text) = self.copyable_text() else {
            self.set_status("✗ Nothing to copy", MessageType::Error);
            return;
        };
        match copy_with(self.clipboard.as_mut(), &text) {
            Ok(()) => self.set_status("✓ Copied to clipboard", MessageType::Success),
            Err(e) => self.set_status(format!("✗ Clipboard error: {}", e), MessageType::Error),
        }
    }

    fn save_result(&mut self) {
        let action = match (&self.tab, &self.result) {
            (Tab::History, _) => self.selected_item().and_then(|item| item.download.clone()),
            (_, Some(ResultView::Converted { record, .. })) => {
                project(std::slice::from_ref(record)).pop().and_then(|item| item.download)
            }
            _ => None,
        };
        match action {
            Some(action) => self.start_download(action),
            None => self.set_status("✗ Nothing to save", MessageType::Error),
        }
    }

    fn spawn_task(
        &mut self,
        label: &'static str,
        job: impl FnOnce() -> Result<PathBuf> + Send + 'static,
    ) {
        if self.task.is_some() {
            self.set_status("Another download is still running", MessageType::Info);
            return;
        }
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(job());
        });
        self.task = Some(BackgroundTask { label, receiver });
        self.set_status(format!("{}…", label), MessageType::Info);
    }

    fn start_download(&mut self, action: DownloadAction) {
        let gateway = self.gateway.clone();
        let dir = self.download_dir.clone();
        self.spawn_task("Downloading", move || perform_download(&action, &gateway, &dir));
    }

    fn export_history(&mut self) {
        let records = self.history.list();
        if records.is_empty() {
            self.set_status("✗ No conversion history to download", MessageType::Error);
            return;
        }
        let gateway = self.gateway.clone();
        let dir = self.download_dir.clone();
        self.spawn_task("Exporting history", move || {
            let archive = gateway.export_history(&records)?;
            save_archive(&archive, &dir)
        });
    }

    fn dump_history(&mut self) {
        let records = self.history.list();
        if records.is_empty() {
            self.set_status("✗ No conversion history to download", MessageType::Error);
            return;
        }
        match dump_local(&records, &self.download_dir) {
            Ok(path) => {
                self.set_status(format!("✓ Saved {}", path.display()), MessageType::Success)
            }
            Err(e) => self.set_status(format!("✗ {:#}", e), MessageType::Error),
        }
    }

    fn open_preview(&mut self, content: PreviewContent) {
        self.preview.open(content);
        self.preview_scroll = 0;
        self.overlay = Overlay::Preview;
        self.needs_redraw = true;
    }

    fn preview_file(&mut self) {
        let Some(form) = self.current_form() else { return };
        if form.has_body_input() {
            let content = PreviewContent::for_text(form.input_label(), &form.input);
            self.open_preview(content);
            return;
        }
        match PreviewContent::for_local_file(&form.input_path()) {
            Ok(content) => self.open_preview(content),
            Err(e) => self.set_status(format!("✗ {:#}", e), MessageType::Error),
        }
    }

    fn preview_history_item(&mut self) {
        let content = match self.selected_item().and_then(|item| item.preview.clone()) {
            Some(PreviewAction::ShowText { title, content }) => {
                PreviewContent::for_text(&title, &content)
            }
            Some(PreviewAction::Embed { url, category }) => {
                let title = self.selected_item().map(|i| i.title.clone()).unwrap_or_default();
                PreviewContent::for_reference(&title, &self.gateway.absolute_url(&url), category)
            }
            None => {
                self.set_status("✗ No preview for this record", MessageType::Error);
                return;
            }
        };
        self.open_preview(content);
    }

    fn delete_history_item(&mut self) {
        if self.history.remove(self.selected_idx).is_some() {
            self.refresh_history();
            self.set_status("History item removed", MessageType::Info);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::clipboard::RecordingClipboard;
    use crate::gateway::{HttpResponse, RequestBody};
    use crate::history::HISTORY_CAP;
    use crate::storage::MemoryStorage;

    /// Answers every POST with a fixed response and counts requests
    #[derive(Default)]
    struct ScriptedTransport {
        response: Mutex<Option<HttpResponse>>,
        posts: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(HttpResponse { status, body: body.as_bytes().to_vec() })),
                posts: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn post(&self, path: &str, _body: RequestBody) -> Result<HttpResponse, ConvertError> {
            self.posts.lock().unwrap().push(path.to_string());
            self.response
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ConvertError::transport("connection refused"))
        }

        fn get(&self, _path: &str) -> Result<HttpResponse, ConvertError> {
            Err(ConvertError::transport("connection refused"))
        }
    }

    fn app(transport: Arc<ScriptedTransport>) -> App<MemoryStorage, Arc<ScriptedTransport>> {
        App::new(
            HistoryStore::new(MemoryStorage::new()),
            ConversionGateway::new(transport),
            Box::new(RecordingClipboard::default()),
            std::env::temp_dir(),
        )
    }

    fn type_text(app: &mut App<MemoryStorage, Arc<ScriptedTransport>>, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Input(c));
        }
    }

    /// Poll until the in-flight submission reports
    fn settle(app: &mut App<MemoryStorage, Arc<ScriptedTransport>>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.state.is_pending() && Instant::now() < deadline {
            app.tick(Instant::now());
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_app_new_initializes_state() {
        let app = app(ScriptedTransport::replying(200, "{}"));
        assert_eq!(app.tab, Tab::File);
        assert_eq!(app.forms.len(), 4);
        assert_eq!(app.state, SubmissionState::Idle);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_switch_tabs() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.handle_action(Action::SwitchTab(Tab::Text));
        assert_eq!(app.key_context(), KeyContext::Form);
        app.handle_action(Action::SwitchTab(Tab::History));
        assert_eq!(app.key_context(), KeyContext::History);
        app.handle_action(Action::NextTab);
        assert_eq!(app.tab, Tab::File);
    }

    #[test]
    fn test_empty_text_rejected_locally() {
        let transport = ScriptedTransport::replying(200, r#"{"success":true,"result":"x"}"#);
        let mut app = app(transport.clone());
        app.handle_action(Action::SwitchTab(Tab::Text));
        app.handle_action(Action::Submit);

        assert!(transport.posts.lock().unwrap().is_empty());
        assert_eq!(app.state, SubmissionState::Idle);
        assert!(matches!(app.result, Some(ResultView::Failed { .. })));
        assert_eq!(
            app.status_message.as_ref().unwrap().text,
            "✗ Please enter text to convert"
        );
    }

    #[test]
    fn test_successful_text_conversion_appends_history() {
        let transport =
            ScriptedTransport::replying(200, r#"{"success":true,"result":"<h1>Hi</h1>"}"#);
        let mut app = app(transport.clone());
        app.handle_action(Action::SwitchTab(Tab::Text));
        type_text(&mut app, "# Hi");
        app.handle_action(Action::Submit);
        assert!(app.state.is_pending());

        settle(&mut app);
        assert!(matches!(app.state, SubmissionState::Succeeded(_)));
        assert_eq!(transport.posts.lock().unwrap().len(), 1);
        assert_eq!(app.history_items.len(), 1);
        assert_eq!(app.history_items[0].title, "Text conversion");
        assert_eq!(app.recent.from, vec!["markdown".to_string()]);
        assert_eq!(app.progress.unwrap().percent(Instant::now()), 100);
    }

    #[test]
    fn test_server_error_shows_message() {
        let transport = ScriptedTransport::replying(400, r#"{"error":"Unsupported format"}"#);
        let mut app = app(transport);
        app.handle_action(Action::SwitchTab(Tab::Text));
        type_text(&mut app, "body");
        app.handle_action(Action::Submit);
        settle(&mut app);

        assert_eq!(app.state, SubmissionState::Failed("Unsupported format".to_string()));
        assert!(app.history_items.is_empty());
        assert_eq!(
            app.result,
            Some(ResultView::Failed {
                kind: ConversionKind::Text,
                message: "Unsupported format".to_string()
            })
        );
    }

    #[test]
    fn test_second_submit_refused_while_pending() {
        let transport = ScriptedTransport::replying(200, r#"{"result":"x"}"#);
        let mut app = app(transport);
        app.handle_action(Action::SwitchTab(Tab::Text));
        type_text(&mut app, "body");
        app.state = SubmissionState::Submitting;

        app.handle_action(Action::Submit);
        assert!(app.submission.is_none());
        assert_eq!(
            app.status_message.as_ref().unwrap().text,
            "A conversion is already in progress"
        );
    }

    #[test]
    fn test_enter_adds_option_tag() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.handle_action(Action::SwitchTab(Tab::Text));
        for _ in 0..3 {
            app.handle_action(Action::NextField);
        }
        type_text(&mut app, "--toc");
        app.handle_action(Action::Enter);
        type_text(&mut app, "--toc");
        app.handle_action(Action::Enter);

        let form = app.current_form().unwrap();
        assert_eq!(form.options.len(), 1);
        assert_eq!(app.status_message.as_ref().unwrap().text, "Option already added");
    }

    #[test]
    fn test_history_delete_and_clear() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        for id in 1..=3 {
            app.history.append(HistoryRecord {
                id,
                name: format!("r{}", id),
                kind: ConversionKind::Text,
                from_format: "md".into(),
                to_format: "html".into(),
                created_at: Utc::now(),
                result: crate::models::RecordResult::Inline { content: "x".into() },
            });
        }
        app.handle_action(Action::SwitchTab(Tab::History));
        assert_eq!(app.history_items.len(), 3);

        app.handle_action(Action::MoveDown);
        app.handle_action(Action::HistoryDelete);
        let titles: Vec<_> = app.history_items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["r3", "r1"]);

        app.handle_action(Action::HistoryClear);
        assert_eq!(app.overlay, Overlay::ConfirmClear);
        app.handle_action(Action::Decline);
        assert_eq!(app.history_items.len(), 2);

        app.handle_action(Action::HistoryClear);
        app.handle_action(Action::Confirm);
        assert!(app.history_items.is_empty());
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn test_history_stays_capped() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        for id in 0..(HISTORY_CAP as u64 + 5) {
            app.history.append(HistoryRecord {
                id,
                name: String::new(),
                kind: ConversionKind::File,
                from_format: "md".into(),
                to_format: "pdf".into(),
                created_at: Utc::now(),
                result: crate::models::RecordResult::Empty,
            });
        }
        app.handle_action(Action::SwitchTab(Tab::History));
        assert_eq!(app.history_items.len(), HISTORY_CAP);
        assert_eq!(app.history_items[0].title, crate::history::UNTITLED);
    }

    #[test]
    fn test_copy_history_inline_content() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.history.append(HistoryRecord {
            id: 1,
            name: "n".into(),
            kind: ConversionKind::Text,
            from_format: "md".into(),
            to_format: "html".into(),
            created_at: Utc::now(),
            result: crate::models::RecordResult::Inline { content: "<p>x</p>".into() },
        });
        app.handle_action(Action::SwitchTab(Tab::History));
        assert_eq!(app.copyable_text().as_deref(), Some("<p>x</p>"));
        app.handle_action(Action::CopyResult);
        assert_eq!(app.status_message.as_ref().unwrap().text, "✓ Copied to clipboard");
    }

    #[test]
    fn test_preview_local_file_and_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.md");
        fs::write(&path, "# Notes").unwrap();

        let mut app = app(ScriptedTransport::replying(200, "{}"));
        type_text(&mut app, &path.display().to_string());
        app.handle_action(Action::PreviewFile);
        assert_eq!(app.overlay, Overlay::Preview);
        assert!(app.preview.is_open());

        app.handle_action(Action::Back);
        assert_eq!(app.overlay, Overlay::None);
        assert!(!app.preview.is_open());
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.handle_action(Action::ToggleTheme);
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(Theme::load(app.history.storage()), Theme::Light);
    }

    #[test]
    fn test_help_toggles() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.key_context(), KeyContext::Overlay);
        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn test_handle_action_quit() {
        let mut app = app(ScriptedTransport::replying(200, "{}"));
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
