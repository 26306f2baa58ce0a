//! Collaborator traits the embedding application implements.
//!
//! The bridge is a stateless protocol shim: the live game session (rules,
//! board state, current mover) and the player-facing UI are owned elsewhere
//! and consumed through these narrow interfaces. The bridge never copies or
//! caches session state beyond a single command execution.

/// One legal move as enumerated by the session.
///
/// Values are only meaningful relative to the `legal_moves` call that
/// produced them; a state-mutating command invalidates earlier enumerations.
pub trait SessionMove {
    /// Human-readable rendering of the move's actions including their
    /// consequences, as shown in `legal` replies.
    fn describe_with_consequences(&self) -> String;
}

/// The live game session the bridge queries and mutates.
///
/// All methods are called from a single owner task, strictly one command at
/// a time, so implementations need no internal locking for bridge traffic.
pub trait GameSession: Send + 'static {
    type Move: SessionMove;

    /// The ordered list of moves the session currently permits. Re-fetched
    /// fresh for every command that consumes it.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply a move previously obtained from [`Self::legal_moves`]. Must be
    /// given a move from the same enumeration used to select it.
    fn apply_move(&mut self, mv: Self::Move);

    /// Seat index of the player to move.
    fn current_mover(&self) -> u32;

    fn game_name(&self) -> String;

    fn game_description_raw(&self) -> String;

    fn game_description_expanded(&self) -> String;

    /// Player count plus player description, e.g. `"2 players: (North, South)"`.
    fn player_count_description(&self) -> String;

    fn rules_description(&self) -> String;

    /// Full prose summary of the game: description, mode, equipment, meta rules.
    fn game_summary(&self) -> String;

    fn equipment_description(&self) -> String;

    /// Per-container description: topology, site count, style, label, index, role.
    fn container_description(&self) -> String;

    fn board_representation(&self) -> String;

    /// Raw dump of the current game state.
    fn state_dump(&self) -> String;

    /// Whether any move has been played in this session.
    fn has_started(&self) -> bool;
}

/// Side-effect hooks into the player-facing UI.
///
/// These are the only bridge commands that reach past the session into the
/// interface; everything else is a pure query or a move application.
pub trait PlayerInterface: Send + 'static {
    /// Restart the current game.
    fn restart_game(&mut self);

    /// Append a line to the status panel.
    fn add_status_text(&mut self, text: &str);

    /// Show a transient message to the player.
    fn set_temporary_message(&mut self, text: &str);
}
