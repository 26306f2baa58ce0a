//! Request envelope parsing and reply text.
//!
//! A request is a single text frame `"PORT ACTION [EXTRA]"`. Fields are
//! separated by whitespace runs; classic controllers that pad the callback
//! port to exactly 4 digits parse identically. The result is a tagged
//! [`Command`] so the side-effecting subset of the vocabulary stays
//! auditable in one place (see `bridge::runtime`).

use std::fmt;

/// Reply for a `move` command whose index matched a legal move.
pub const REPLY_MOVE_SUCCESS: &str = "move success";
/// Reply for a `move` command whose index matched nothing.
pub const REPLY_MOVE_FAILURE: &str = "move failure";
/// Reply for an unrecognized action or info key.
pub const REPLY_UNSUPPORTED: &str = "unsupported command";
/// Header line of a `legal` reply.
pub const LEGAL_HEADER: &str = "legal";

/// One parsed request: where to send the reply, and what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Port the requester is listening on for the reply.
    pub callback_port: u16,
    pub command: Command,
}

/// The bridge's full command vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply the legal move at this 0-based index.
    Move(usize),
    /// Enumerate the current legal moves.
    Legal,
    /// Report the current mover's seat index.
    Player,
    /// Introspection query or UI side effect, selected by key. The optional
    /// text argument is only meaningful for text-bearing keys.
    Info(InfoKey, Option<String>),
}

/// Keys understood by the `info` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKey {
    GameName,
    GamePlayers,
    GameRules,
    DescriptionRaw,
    DescriptionExpanded,
    GameSummary,
    HaveStarted,
    Board,
    State,
    Equipment,
    Container,
    /// UI side effect: restart the game.
    Restart,
    /// UI side effect: append text to the status panel.
    AddStatusText,
    /// UI side effect: show a transient message.
    SetTemporaryMessage,
}

impl InfoKey {
    fn from_wire(key: &str) -> Option<Self> {
        match key {
            "game_name" => Some(Self::GameName),
            "game_players" => Some(Self::GamePlayers),
            "game_rules" => Some(Self::GameRules),
            "game_description_raw" => Some(Self::DescriptionRaw),
            "game_description_expanded" => Some(Self::DescriptionExpanded),
            "game" => Some(Self::GameSummary),
            "have_started" => Some(Self::HaveStarted),
            "board" => Some(Self::Board),
            "state" => Some(Self::State),
            "equipment" => Some(Self::Equipment),
            "container" => Some(Self::Container),
            "game_restart" => Some(Self::Restart),
            "addTextToStatusPanel" => Some(Self::AddStatusText),
            "setTemporaryMessage" => Some(Self::SetTemporaryMessage),
            _ => None,
        }
    }

    /// Whether the key accepts a trailing text argument.
    fn takes_text(self) -> bool {
        matches!(self, Self::AddStatusText | Self::SetTemporaryMessage)
    }
}

/// Why an envelope failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError {
    /// The callback port, when it parsed before the rest of the envelope
    /// failed. With a known port the server can still answer the caller.
    pub callback_port: Option<u16>,
    pub kind: EnvelopeErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeErrorKind {
    InvalidPort,
    MissingAction,
    UnknownAction,
    InvalidMoveIndex,
    MissingInfoKey,
    UnknownInfoKey,
    UnexpectedArgument,
}

impl EnvelopeError {
    fn new(callback_port: Option<u16>, kind: EnvelopeErrorKind) -> Self {
        Self {
            callback_port,
            kind,
        }
    }

    /// The error reply owed to the caller, if the protocol defines one.
    /// `InvalidPort` has no reply: there is nowhere to send it.
    pub fn reply_text(&self) -> Option<&'static str> {
        match self.kind {
            EnvelopeErrorKind::InvalidPort => None,
            EnvelopeErrorKind::InvalidMoveIndex => Some(REPLY_MOVE_FAILURE),
            EnvelopeErrorKind::MissingAction
            | EnvelopeErrorKind::UnknownAction
            | EnvelopeErrorKind::MissingInfoKey
            | EnvelopeErrorKind::UnknownInfoKey
            | EnvelopeErrorKind::UnexpectedArgument => Some(REPLY_UNSUPPORTED),
        }
    }
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            EnvelopeErrorKind::InvalidPort => "callback port is not a valid port number",
            EnvelopeErrorKind::MissingAction => "missing action keyword",
            EnvelopeErrorKind::UnknownAction => "unknown action keyword",
            EnvelopeErrorKind::InvalidMoveIndex => "move index is not a non-negative integer",
            EnvelopeErrorKind::MissingInfoKey => "info requires a key",
            EnvelopeErrorKind::UnknownInfoKey => "unknown info key",
            EnvelopeErrorKind::UnexpectedArgument => "unexpected trailing argument",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for EnvelopeError {}

/// Split off the first whitespace-delimited token, returning the token and
/// the remainder with leading whitespace stripped.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Parse one request frame into an [`Envelope`].
pub fn parse_envelope(line: &str) -> Result<Envelope, EnvelopeError> {
    use EnvelopeErrorKind as Kind;

    let line = line.trim();
    let (port_token, rest) = split_token(line);

    let callback_port = port_token
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| EnvelopeError::new(None, Kind::InvalidPort))?;

    let (action, extra) = split_token(rest);
    let command = match action {
        "" => return Err(EnvelopeError::new(Some(callback_port), Kind::MissingAction)),
        "move" => {
            // Anything that is not a plain non-negative integer can never
            // match an enumerated legal move, hence "move failure".
            let index = extra
                .trim()
                .parse::<usize>()
                .map_err(|_| EnvelopeError::new(Some(callback_port), Kind::InvalidMoveIndex))?;
            Command::Move(index)
        }
        // Trailing text after `legal`/`player` is tolerated and ignored,
        // matching what lenient callers have historically sent.
        "legal" => Command::Legal,
        "player" => Command::Player,
        "info" => {
            let (key_token, text) = split_token(extra);
            if key_token.is_empty() {
                return Err(EnvelopeError::new(Some(callback_port), Kind::MissingInfoKey));
            }
            let key = InfoKey::from_wire(key_token)
                .ok_or_else(|| EnvelopeError::new(Some(callback_port), Kind::UnknownInfoKey))?;
            let text = text.trim();
            if !text.is_empty() && !key.takes_text() {
                return Err(EnvelopeError::new(
                    Some(callback_port),
                    Kind::UnexpectedArgument,
                ));
            }
            let text = (!text.is_empty()).then(|| text.to_string());
            Command::Info(key, text)
        }
        _ => return Err(EnvelopeError::new(Some(callback_port), Kind::UnknownAction)),
    };

    Ok(Envelope {
        callback_port,
        command,
    })
}
