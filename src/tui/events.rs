use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::form::Tab;

/// User actions from keyboard events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    SwitchTab(Tab),
    NextTab,
    NextField,
    PrevField,
    Left,
    Right,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Enter,
    Backspace,
    Input(char),
    Submit,
    ToggleHelp,
    ToggleTheme,
    CopyResult,
    SaveResult,
    PreviewFile,
    HistoryDownload,
    HistoryPreview,
    HistoryDelete,
    HistoryClear,
    HistoryExport,
    HistoryDump,
    Confirm,
    Decline,
    None,
}

/// Which keymap applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Form,
    History,
    /// Help, preview or confirmation dialog on top
    Overlay,
}

/// One key chord and the action it triggers.
pub struct Binding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: Action,
    /// Shown in the help overlay; empty hides the binding
    pub help: &'static str,
}

const fn bind(
    code: KeyCode,
    modifiers: KeyModifiers,
    action: Action,
    help: &'static str,
) -> Binding {
    Binding { code, modifiers, action, help }
}

const NONE: KeyModifiers = KeyModifiers::NONE;
const ALT: KeyModifiers = KeyModifiers::ALT;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;

/// Active everywhere except inside dialogs
pub const GLOBAL_KEYMAP: &[Binding] = &[
    bind(KeyCode::Char('c'), CTRL, Action::Quit, "Quit"),
    bind(KeyCode::Char('f'), ALT, Action::SwitchTab(Tab::File), "File tab"),
    bind(KeyCode::Char('t'), ALT, Action::SwitchTab(Tab::Text), "Text tab"),
    bind(KeyCode::Char('b'), ALT, Action::SwitchTab(Tab::Base64), "Base64 tab"),
    bind(KeyCode::Char('i'), ALT, Action::SwitchTab(Tab::Image), "Image tab"),
    bind(KeyCode::Char('h'), ALT, Action::SwitchTab(Tab::History), "History tab"),
    bind(KeyCode::Char('n'), ALT, Action::NextTab, "Next tab"),
    bind(KeyCode::Char('c'), ALT, Action::Submit, "Convert"),
    bind(KeyCode::Char('k'), ALT, Action::ToggleHelp, "Keyboard shortcuts"),
    bind(KeyCode::F(1), NONE, Action::ToggleHelp, ""),
    bind(KeyCode::Char('d'), ALT, Action::ToggleTheme, "Toggle theme"),
    bind(KeyCode::Char('y'), CTRL, Action::CopyResult, "Copy result to clipboard"),
    bind(KeyCode::Char('s'), CTRL, Action::SaveResult, "Save result to downloads"),
    bind(KeyCode::Esc, NONE, Action::Back, "Close dialog"),
];

pub const FORM_KEYMAP: &[Binding] = &[
    bind(KeyCode::Tab, NONE, Action::NextField, "Next field"),
    bind(KeyCode::BackTab, SHIFT, Action::PrevField, "Previous field"),
    bind(KeyCode::BackTab, NONE, Action::PrevField, ""),
    bind(KeyCode::Left, NONE, Action::Left, "Previous format"),
    bind(KeyCode::Right, NONE, Action::Right, "Next format"),
    bind(KeyCode::Enter, NONE, Action::Enter, "Add option / new line / convert"),
    bind(KeyCode::Backspace, NONE, Action::Backspace, "Delete (removes last option when empty)"),
    bind(KeyCode::Char('p'), ALT, Action::PreviewFile, "Preview selected file"),
];

pub const HISTORY_KEYMAP: &[Binding] = &[
    bind(KeyCode::Up, NONE, Action::MoveUp, "Previous record"),
    bind(KeyCode::Down, NONE, Action::MoveDown, "Next record"),
    bind(KeyCode::Char('k'), NONE, Action::MoveUp, ""),
    bind(KeyCode::Char('j'), NONE, Action::MoveDown, ""),
    bind(KeyCode::PageUp, NONE, Action::PageUp, ""),
    bind(KeyCode::PageDown, NONE, Action::PageDown, ""),
    bind(KeyCode::Char('d'), NONE, Action::HistoryDownload, "Download record"),
    bind(KeyCode::Char('p'), NONE, Action::HistoryPreview, "Preview record"),
    bind(KeyCode::Enter, NONE, Action::HistoryPreview, ""),
    bind(KeyCode::Char('x'), NONE, Action::HistoryDelete, "Delete record"),
    bind(KeyCode::Delete, NONE, Action::HistoryDelete, ""),
    bind(KeyCode::Char('C'), SHIFT, Action::HistoryClear, "Clear all history"),
    bind(KeyCode::Char('e'), NONE, Action::HistoryExport, "Download all as ZIP"),
    bind(KeyCode::Char('E'), SHIFT, Action::HistoryDump, "Save history as JSON"),
    bind(KeyCode::Tab, NONE, Action::NextTab, ""),
];

pub const OVERLAY_KEYMAP: &[Binding] = &[
    bind(KeyCode::Char('c'), CTRL, Action::Quit, ""),
    bind(KeyCode::Esc, NONE, Action::Back, ""),
    bind(KeyCode::Char('q'), NONE, Action::Back, ""),
    bind(KeyCode::Char('k'), ALT, Action::ToggleHelp, ""),
    bind(KeyCode::Char('y'), NONE, Action::Confirm, ""),
    bind(KeyCode::Enter, NONE, Action::Confirm, ""),
    bind(KeyCode::Char('n'), NONE, Action::Decline, ""),
    bind(KeyCode::Up, NONE, Action::MoveUp, ""),
    bind(KeyCode::Down, NONE, Action::MoveDown, ""),
    bind(KeyCode::PageUp, NONE, Action::PageUp, ""),
    bind(KeyCode::PageDown, NONE, Action::PageDown, ""),
];

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration, context: KeyContext) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(key_to_action(key, context));
    }
    Ok(Action::None)
}

fn lookup(keymap: &[Binding], key: &KeyEvent) -> Option<Action> {
    keymap
        .iter()
        .find(|b| b.code == key.code && b.modifiers == key.modifiers)
        .map(|b| b.action)
}

pub fn key_to_action(key: KeyEvent, context: KeyContext) -> Action {
    let specific = match context {
        KeyContext::Overlay => return lookup(OVERLAY_KEYMAP, &key).unwrap_or(Action::None),
        KeyContext::Form => FORM_KEYMAP,
        KeyContext::History => HISTORY_KEYMAP,
    };

    if let Some(action) = lookup(specific, &key).or_else(|| lookup(GLOBAL_KEYMAP, &key)) {
        return action;
    }

    match (context, key.code, key.modifiers) {
        (KeyContext::Form, KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            Action::Input(c)
        }
        _ => Action::None,
    }
}

/// Human-readable chord, e.g. `Alt+F`.
pub fn chord_label(binding: &Binding) -> String {
    let key = match binding.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other),
    };

    let mut label = String::new();
    if binding.modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("Ctrl+");
    }
    if binding.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("Alt+");
    }
    if binding.modifiers.contains(KeyModifiers::SHIFT)
        && !matches!(binding.code, KeyCode::Char(_))
    {
        label.push_str("Shift+");
    }
    label.push_str(&key);
    label
}

/// `(section, chord, description)` rows for the help overlay.
pub fn help_rows() -> Vec<(&'static str, String, &'static str)> {
    [("General", GLOBAL_KEYMAP), ("Forms", FORM_KEYMAP), ("History", HISTORY_KEYMAP)]
        .into_iter()
        .flat_map(|(section, keymap)| {
            keymap
                .iter()
                .filter(|b| !b.help.is_empty())
                .map(move |b| (section, chord_label(b), b.help))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_quit_everywhere() {
        let ctrl_c = key(KeyCode::Char('c'), CTRL);
        assert_eq!(key_to_action(ctrl_c, KeyContext::Form), Action::Quit);
        assert_eq!(key_to_action(ctrl_c, KeyContext::History), Action::Quit);
        assert_eq!(key_to_action(ctrl_c, KeyContext::Overlay), Action::Quit);
    }

    #[test]
    fn test_alt_shortcuts() {
        let alt = |c| key(KeyCode::Char(c), ALT);
        assert_eq!(key_to_action(alt('f'), KeyContext::Form), Action::SwitchTab(Tab::File));
        assert_eq!(key_to_action(alt('t'), KeyContext::History), Action::SwitchTab(Tab::Text));
        assert_eq!(key_to_action(alt('b'), KeyContext::Form), Action::SwitchTab(Tab::Base64));
        assert_eq!(key_to_action(alt('c'), KeyContext::Form), Action::Submit);
        assert_eq!(key_to_action(alt('k'), KeyContext::Form), Action::ToggleHelp);
        assert_eq!(key_to_action(alt('d'), KeyContext::History), Action::ToggleTheme);
    }

    #[test]
    fn test_plain_chars_are_input_in_forms() {
        let d = key(KeyCode::Char('d'), NONE);
        assert_eq!(key_to_action(d, KeyContext::Form), Action::Input('d'));
        assert_eq!(key_to_action(d, KeyContext::History), Action::HistoryDownload);

        let upper = key(KeyCode::Char('C'), SHIFT);
        assert_eq!(key_to_action(upper, KeyContext::Form), Action::Input('C'));
        assert_eq!(key_to_action(upper, KeyContext::History), Action::HistoryClear);
    }

    #[test]
    fn test_enter_depends_on_context() {
        let enter = key(KeyCode::Enter, NONE);
        assert_eq!(key_to_action(enter, KeyContext::Form), Action::Enter);
        assert_eq!(key_to_action(enter, KeyContext::History), Action::HistoryPreview);
        assert_eq!(key_to_action(enter, KeyContext::Overlay), Action::Confirm);
    }

    #[test]
    fn test_overlay_swallows_other_keys() {
        let alt_f = key(KeyCode::Char('f'), ALT);
        assert_eq!(key_to_action(alt_f, KeyContext::Overlay), Action::None);
        let x = key(KeyCode::Char('x'), NONE);
        assert_eq!(key_to_action(x, KeyContext::Overlay), Action::None);
    }

    #[test]
    fn test_field_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Tab, NONE), KeyContext::Form), Action::NextField);
        assert_eq!(
            key_to_action(key(KeyCode::BackTab, SHIFT), KeyContext::Form),
            Action::PrevField
        );
        assert_eq!(key_to_action(key(KeyCode::Tab, NONE), KeyContext::History), Action::NextTab);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key_to_action(key(KeyCode::F(5), NONE), KeyContext::Form), Action::None);
    }

    #[test]
    fn test_help_rows_cover_alt_shortcuts() {
        let rows = help_rows();
        assert!(rows.iter().any(|(_, chord, help)| chord == "Alt+c" && *help == "Convert"));
        assert!(rows.iter().any(|(_, chord, _)| chord == "Ctrl+y"));
        assert!(rows.iter().all(|(_, _, help)| !help.is_empty()));
    }
}
