//! Keystroke sequences
//!
//! Special keys travel inside a keystroke string as WebDriver private-use code
//! points, so a mixed sequence of text, numbers and keys is a single `String`.

/// Special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Tab,
    Enter,
    Escape,
    PageUp,
    PageDown,
    End,
    Home,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Delete,
}

const ALL_KEYS: [Key; 13] = [
    Key::Backspace,
    Key::Tab,
    Key::Enter,
    Key::Escape,
    Key::PageUp,
    Key::PageDown,
    Key::End,
    Key::Home,
    Key::ArrowLeft,
    Key::ArrowUp,
    Key::ArrowRight,
    Key::ArrowDown,
    Key::Delete,
];

impl Key {
    /// WebDriver code point of the key
    pub fn code_point(&self) -> char {
        match self {
            Key::Backspace => '\u{E003}',
            Key::Tab => '\u{E004}',
            Key::Enter => '\u{E007}',
            Key::Escape => '\u{E00C}',
            Key::PageUp => '\u{E00E}',
            Key::PageDown => '\u{E00F}',
            Key::End => '\u{E010}',
            Key::Home => '\u{E011}',
            Key::ArrowLeft => '\u{E012}',
            Key::ArrowUp => '\u{E013}',
            Key::ArrowRight => '\u{E014}',
            Key::ArrowDown => '\u{E015}',
            Key::Delete => '\u{E017}',
        }
    }

    pub fn from_code_point(c: char) -> Option<Key> {
        ALL_KEYS.iter().copied().find(|k| k.code_point() == c)
    }

    /// DOM `key`, DOM `code` and Windows virtual key code
    pub fn descriptor(&self) -> (&'static str, &'static str, i64) {
        match self {
            Key::Backspace => ("Backspace", "Backspace", 8),
            Key::Tab => ("Tab", "Tab", 9),
            Key::Enter => ("Enter", "Enter", 13),
            Key::Escape => ("Escape", "Escape", 27),
            Key::PageUp => ("PageUp", "PageUp", 33),
            Key::PageDown => ("PageDown", "PageDown", 34),
            Key::End => ("End", "End", 35),
            Key::Home => ("Home", "Home", 36),
            Key::ArrowLeft => ("ArrowLeft", "ArrowLeft", 37),
            Key::ArrowUp => ("ArrowUp", "ArrowUp", 38),
            Key::ArrowRight => ("ArrowRight", "ArrowRight", 39),
            Key::ArrowDown => ("ArrowDown", "ArrowDown", 40),
            Key::Delete => ("Delete", "Delete", 46),
        }
    }

    /// Text the key produces, if any
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Key::Enter => Some("\r"),
            Key::Tab => Some("\t"),
            _ => None,
        }
    }
}

/// One element of a keystroke sequence
#[derive(Debug, Clone, PartialEq)]
pub enum KeyInput {
    Text(String),
    Key(Key),
}

impl From<&str> for KeyInput {
    fn from(s: &str) -> Self {
        KeyInput::Text(s.to_string())
    }
}

impl From<String> for KeyInput {
    fn from(s: String) -> Self {
        KeyInput::Text(s)
    }
}

impl From<&String> for KeyInput {
    fn from(s: &String) -> Self {
        KeyInput::Text(s.clone())
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        KeyInput::Text(c.to_string())
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        KeyInput::Key(key)
    }
}

macro_rules! key_input_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyInput {
                fn from(n: $t) -> Self {
                    KeyInput::Text(n.to_string())
                }
            }
        )*
    };
}

key_input_from_number!(i32, i64, u32, u64, usize, f64);

/// Flatten a keystroke sequence into one string
pub fn encode<I, K>(keys: I) -> String
where
    I: IntoIterator<Item = K>,
    K: Into<KeyInput>,
{
    let mut out = String::new();
    for key in keys {
        match key.into() {
            KeyInput::Text(text) => out.push_str(&text),
            KeyInput::Key(key) => out.push(key.code_point()),
        }
    }
    out
}

/// Split an encoded keystroke string back into text runs and special keys
pub fn decode(encoded: &str) -> Vec<KeyInput> {
    let mut chunks = Vec::new();
    let mut text = String::new();

    for c in encoded.chars() {
        match Key::from_code_point(c) {
            Some(key) => {
                if !text.is_empty() {
                    chunks.push(KeyInput::Text(std::mem::take(&mut text)));
                }
                chunks.push(KeyInput::Key(key));
            }
            None => text.push(c),
        }
    }

    if !text.is_empty() {
        chunks.push(KeyInput::Text(text));
    }
    chunks
}
