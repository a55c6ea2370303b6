//! Byte values the line editor gives special meaning to.

pub const NUL: u8 = 0x00;
pub const SIGINT: u8 = 0x03;
pub const EOT: u8 = 0x04;
pub const TAB: u8 = 0x09;
pub const LINE_FEED: u8 = 0x0a;
pub const ENTER: u8 = 0x0d;
pub const ESC: u8 = 0x1b;
pub const SPACE: u8 = 0x20;
pub const BACKSPACE: u8 = 0x7f;
/// Windows consoles send Ctrl+H for the backspace key.
pub const ALT_BACKSPACE: u8 = 0x08;

/// Whether `byte` deletes the character before the insert position on this platform.
pub fn is_backspace(byte: u8) -> bool {
    byte == BACKSPACE || (cfg!(windows) && byte == ALT_BACKSPACE)
}

/// Name of the editor action bound to `byte`, if any.
///
/// Used to keep the autocomplete trigger from shadowing a control key.
pub fn reserved_role(byte: u8) -> Option<&'static str> {
    match byte {
        SIGINT => Some("interrupt"),
        EOT => Some("end of transmission"),
        LINE_FEED | ENTER => Some("enter"),
        BACKSPACE => Some("backspace"),
        ALT_BACKSPACE if cfg!(windows) => Some("backspace"),
        _ => None,
    }
}
