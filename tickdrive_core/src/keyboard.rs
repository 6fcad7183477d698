//! Non-blocking keyboard polling.
//!
//! The poller has three backends, chosen once at construction:
//! - **Terminal**: stdin is an interactive terminal; raw (unbuffered,
//!   non-echoing) mode is held for the poller's lifetime and restored on
//!   release, drop, or unwinding.
//! - **Stub**: no terminal attached; never reports input.
//! - **Replay**: a fixed byte script, decoded exactly like terminal input.
//!
//! Extended keys arrive as two bytes: a leading `0x00` or any byte `>= 0xA1`
//! is always followed by a second byte that belongs to the same key.

use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use tracing::{debug, warn};

/// Prefix byte of a two-byte extended key.
const EXTENDED_PREFIX: u8 = 0x00;

/// First byte value that starts a two-byte key in multi-byte encodings.
const MULTIBYTE_LEAD: u8 = 0xA1;

/// A single logical keystroke of one or two raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    bytes: [u8; 2],
    len: u8,
}

impl KeyEvent {
    /// Decodes one key, pulling a second byte from `next` when the first
    /// byte announces an extended key.
    pub fn decode(first: u8, next: impl FnOnce() -> Option<u8>) -> Self {
        if first == EXTENDED_PREFIX || first >= MULTIBYTE_LEAD {
            if let Some(second) = next() {
                return Self { bytes: [first, second], len: 2 };
            }
        }
        Self { bytes: [first, 0], len: 1 }
    }
    
    /// A single-byte key.
    pub fn from_byte(byte: u8) -> Self {
        Self { bytes: [byte, 0], len: 1 }
    }
    
    /// Raw bytes of the key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
    
    /// Number of raw bytes (1 or 2).
    pub fn len(&self) -> usize {
        self.len as usize
    }
    
    /// Always false; a key has at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
    
    /// The key as a lower-cased ASCII character, if it is one.
    pub fn as_char(&self) -> Option<char> {
        match self.as_bytes() {
            [b] if b.is_ascii() => Some(b.to_ascii_lowercase() as char),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_char() {
            Some(c) if !c.is_control() => write!(f, "'{}'", c),
            _ => write!(f, "{:02x?}", self.as_bytes()),
        }
    }
}

/// Exclusive hold on the terminal's raw mode.
struct RawTerminal {
    active: bool,
}

impl RawTerminal {
    fn acquire() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        let term = Self { active: true };
        keep_output_processing()?;
        debug!("Terminal switched to raw mode");
        Ok(term)
    }
    
    fn restore(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = crossterm::terminal::disable_raw_mode() {
                warn!("Failed to restore terminal mode: {}", e);
            } else {
                debug!("Terminal mode restored");
            }
        }
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        self.restore();
    }
}

enum Backend {
    Terminal(RawTerminal),
    Stub,
    Replay(VecDeque<u8>),
}

/// Keyboard input that never blocks the control loop.
pub struct KeyboardPoller {
    backend: Backend,
}

impl KeyboardPoller {
    /// Picks the terminal backend when stdin is an interactive terminal,
    /// the stub otherwise.
    ///
    /// # Errors
    /// Fails if stdin is a terminal but raw mode cannot be enabled.
    pub fn detect() -> io::Result<Self> {
        if cfg!(unix) && io::stdin().is_terminal() {
            Ok(Self {
                backend: Backend::Terminal(RawTerminal::acquire()?),
            })
        } else {
            debug!("stdin is not a terminal, keyboard input disabled");
            Ok(Self::stub())
        }
    }
    
    /// A poller that never reports input.
    pub fn stub() -> Self {
        Self { backend: Backend::Stub }
    }
    
    /// A poller that replays the given bytes as typed input.
    pub fn replay(bytes: impl IntoIterator<Item = u8>) -> Self {
        Self {
            backend: Backend::Replay(bytes.into_iter().collect()),
        }
    }
    
    /// True if this poller owns the terminal's raw mode.
    pub fn is_interactive(&self) -> bool {
        matches!(self.backend, Backend::Terminal(_))
    }
    
    /// Returns true iff input is waiting, without consuming it.
    pub fn key_hit(&self) -> bool {
        match &self.backend {
            Backend::Terminal(term) => term.active && stdin_ready(),
            Backend::Stub => false,
            Backend::Replay(bytes) => !bytes.is_empty(),
        }
    }
    
    /// Consumes and returns the next key.
    ///
    /// On the terminal backend this blocks if no input is pending; call
    /// [`key_hit`](Self::key_hit) first or use [`poll`](Self::poll).
    pub fn get_character(&mut self) -> Option<KeyEvent> {
        let first = self.next_byte()?;
        Some(KeyEvent::decode(first, || self.next_byte()))
    }
    
    /// Returns the next key if one is waiting.
    pub fn poll(&mut self) -> Option<KeyEvent> {
        if self.key_hit() {
            self.get_character()
        } else {
            None
        }
    }
    
    /// Restores the terminal mode now. Later calls are no-ops, and the
    /// poller reports no further input.
    pub fn release(&mut self) {
        if let Backend::Terminal(term) = &mut self.backend {
            term.restore();
        }
        self.backend = Backend::Stub;
    }
    
    fn next_byte(&mut self) -> Option<u8> {
        match &mut self.backend {
            Backend::Terminal(term) if term.active => match read_stdin_byte() {
                Ok(byte) => byte,
                Err(e) => {
                    warn!("Keyboard read failed: {}", e);
                    None
                }
            },
            Backend::Terminal(_) | Backend::Stub => None,
            Backend::Replay(bytes) => bytes.pop_front(),
        }
    }
}

impl std::fmt::Debug for KeyboardPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Terminal(_) => "terminal",
            Backend::Stub => "stub",
            Backend::Replay(_) => "replay",
        };
        f.debug_struct("KeyboardPoller").field("backend", &backend).finish()
    }
}

/// Turns newline translation back on after raw mode cleared it, so log
/// lines written during the session still start at column zero.
#[cfg(unix)]
fn keep_output_processing() -> io::Result<()> {
    let mut attrs = std::mem::MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr writes a full termios into the buffer on success.
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, attrs.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: initialised by the successful tcgetattr above.
    let mut attrs = unsafe { attrs.assume_init() };
    attrs.c_oflag |= libc::OPOST | libc::ONLCR;
    // SAFETY: valid termios for the stdin descriptor.
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &attrs) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn keep_output_processing() -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn stdin_ready() -> bool {
    let mut fds = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: one valid pollfd, zero timeout.
    let ready = unsafe { libc::poll(&mut fds, 1, 0) };
    ready > 0 && (fds.revents & libc::POLLIN) != 0
}

#[cfg(not(unix))]
fn stdin_ready() -> bool {
    false
}

/// Reads one byte straight from the stdin descriptor.
///
/// `std::io::Stdin` buffers, which would hide pending bytes from `poll`.
#[cfg(unix)]
fn read_stdin_byte() -> io::Result<Option<u8>> {
    let mut byte = 0u8;
    // SAFETY: reads at most one byte into a valid, owned buffer.
    let n = unsafe { libc::read(libc::STDIN_FILENO, (&mut byte as *mut u8).cast(), 1) };
    match n {
        1 => Ok(Some(byte)),
        0 => Ok(None),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn read_stdin_byte() -> io::Result<Option<u8>> {
    Ok(None)
}
