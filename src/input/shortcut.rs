use crate::editor::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Escape,
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    /// Control, or Command on macOS hosts.
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    /// A host dialog (text prompt, asset picker) owns the keyboard.
    pub dialog_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    DeleteSelection,
    SelectTool(ToolKind),
}

fn resolve_tool_shortcut(key: char) -> Option<ToolKind> {
    match key {
        'v' => Some(ToolKind::Select),
        'b' => Some(ToolKind::Brush),
        'e' => Some(ToolKind::Eraser),
        't' => Some(ToolKind::Text),
        'r' => Some(ToolKind::Rectangle),
        'o' => Some(ToolKind::Ellipse),
        'w' => Some(ToolKind::MagicWand),
        'l' => Some(ToolKind::Lasso),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.dialog_open {
        return None;
    }

    let key = match key {
        ShortcutKey::Character(c) => ShortcutKey::Character(c.to_ascii_lowercase()),
        other => other,
    };
    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Character('z'), true, false) => Some(ShortcutAction::Undo),
        (ShortcutKey::Character('z'), true, true) | (ShortcutKey::Character('y'), true, _) => {
            Some(ShortcutAction::Redo)
        }
        (ShortcutKey::Delete | ShortcutKey::Backspace, false, _) => {
            Some(ShortcutAction::DeleteSelection)
        }
        (ShortcutKey::Escape, false, _) => Some(ShortcutAction::SelectTool(ToolKind::Select)),
        (ShortcutKey::Character(c), false, false) => {
            resolve_tool_shortcut(c).map(ShortcutAction::SelectTool)
        }
        _ => None,
    }
}
