//! The router's external collaborators: the host board adapter, the event
//! logger, and net/layer name resolution. Everything in this module is a
//! trait implemented by the host application; the core only ever holds a
//! borrowed reference to it, per the crate's single-threaded concurrency
//! model (see the crate root docs).

use crate::id::{LayerId, NetId};
use crate::item::Item;
use crate::node::Node;

/// The board-layer stackup bijection and item-reflection surface the core
/// calls during commit and for a handful of queries it cannot answer from
/// its own world model.
pub trait RouterIface {
    /// Populates an empty node with every item currently on the host board.
    fn sync_world(&self, node: &mut Node);

    /// Reflects a newly committed item into the host board.
    fn add_item(&mut self, item: &Item);

    /// Reflects a committed removal into the host board.
    fn remove_item(&mut self, item: &Item);

    /// Reflects an in-place update (e.g. a shoved segment's new geometry)
    /// into the host board.
    fn update_item(&mut self, item: &Item);

    /// Finalizes the current host-side transaction (e.g. appends it to the
    /// undo stack, subject to [`Self::set_commit_flags`]).
    fn commit(&mut self);

    /// The human-readable name of a net handle. Returned as an [`ArcStr`]
    /// (the teacher crate's net/signal-name type — see `substrate`'s
    /// `SchematicId`/name interning) rather than an owned `String`, since
    /// the same net name is cloned repeatedly across joint lookups, log
    /// events and diff-pair coupling checks during a single interaction.
    fn net_name(&self, net: NetId) -> Option<arcstr::ArcStr>;

    /// The net handle for a human-readable name, if one exists.
    fn net_from_name(&self, name: &str) -> Option<NetId>;

    /// Maps a PCB stackup layer index to the router's internal, contiguous
    /// layer index.
    fn pns_layer_from_board_layer(&self, board_layer: i32) -> LayerId;

    /// The inverse of [`Self::pns_layer_from_board_layer`].
    fn board_layer_from_pns_layer(&self, layer: LayerId) -> i32;

    /// Whether `item` has flashed (exposed) copper on `layers` — affects
    /// clearance for pads that are only flashed on some layers.
    fn is_flashed_on_layer(&self, item: &Item, layers: LayerId) -> bool;

    /// Shows a preview decoration for `item` (e.g. the in-progress head).
    fn display_item(&mut self, item: &Item);

    /// Hides a previously displayed preview decoration.
    fn hide_item(&mut self, item: &Item);

    /// Notifies the host that `net`'s ratsnest should be refreshed.
    fn update_net(&mut self, net: NetId);

    /// Sets flags controlling how the next [`Self::commit`] should be
    /// recorded (e.g. "append to the previous undo entry").
    fn set_commit_flags(&mut self, flags: CommitFlags);
}

/// Flags controlling how a commit is recorded by the host.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CommitFlags {
    /// Append this commit to the previous undo entry instead of starting a
    /// new one (used for multi-segment interactive operations that should
    /// undo as a single step).
    pub append_to_undo: bool,
}

/// A single entry in the append-only reproduction log.
///
/// Ported from the original router's `PNS_LOG_FILE`/`PNS_EVENT`: a board
/// dump plus this log is sufficient to replay a bug report deterministically
/// outside of interactive UI.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogEvent {
    /// Which user-visible action this event records.
    pub kind: LogEventKind,
    /// The cursor position at the time of the event, in internal units.
    pub position: geometry::prelude::Point,
    /// The routing layer active at the time of the event.
    pub layer: LayerId,
    /// UIDs of the items this event affected (empty for pure cursor moves
    /// that didn't touch the world).
    pub affected: Vec<crate::item::Uid>,
    /// The sizes configuration in effect when the event fired, so a replay
    /// reproduces the exact clearances/widths used at the time.
    pub sizes: crate::sizes::SizesSettings,
}

/// The kind of a logged router event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LogEventKind {
    /// The user started a new route.
    StartRoute,
    /// The user moved the cursor during an active route.
    Move,
    /// The user fixed (committed) the current head+tail.
    Fix,
    /// The user toggled a terminating via on or off.
    ToggleVia,
    /// The user popped the last fixed stage.
    Unfix,
    /// The user aborted the current interaction.
    Abort,
    /// The user started dragging a single item.
    StartDrag,
    /// The user started dragging multiple items at once.
    StartMultidrag,
}

/// An append-only sink for [`LogEvent`]s, serialized one event per line as
/// newline-delimited JSON so a log file can be replayed or diffed with
/// ordinary text tools.
pub trait EventLogger {
    /// Appends `event` to the log.
    fn log(&mut self, event: LogEvent);
}

/// An [`EventLogger`] that serializes events into an in-memory buffer of
/// text lines, one JSON object per event. Used directly by tests and as the
/// reference implementation for a file-backed logger the host may swap in.
#[derive(Debug, Default)]
pub struct TextLogger {
    lines: Vec<String>,
}

impl TextLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The serialized lines recorded so far, one event per line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Parses a previously serialized line back into a [`LogEvent`].
    pub fn parse_line(line: &str) -> serde_json::Result<LogEvent> {
        serde_json::from_str(line)
    }
}

/// Parses a whole reproduction log (one JSON [`LogEvent`] per line, blank
/// lines ignored) back into an ordered event sequence, reporting which line
/// failed to parse. This crosses the same host/file boundary the original
/// router's bug-report tooling did (a board dump plus this log reproduces a
/// session outside of interactive UI) — unlike the core's internal
/// [`crate::error::Error`], which never leaves the router, failures here are
/// reported with [`anyhow`] since the caller is a host-side CLI or test
/// harness, not another router algorithm.
pub fn replay_log(text: &str) -> anyhow::Result<Vec<LogEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            TextLogger::parse_line(line).map_err(|e| anyhow::anyhow!("log line {}: {e}", i + 1))
        })
        .collect()
}

impl EventLogger for TextLogger {
    fn log(&mut self, event: LogEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => self.lines.push(line),
            Err(e) => tracing::warn!(error = %e, "failed to serialize router log event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizes::SizesSettings;

    #[test]
    fn log_event_round_trips_through_text_logger() {
        let mut logger = TextLogger::new();
        let event = LogEvent {
            kind: LogEventKind::Fix,
            position: geometry::prelude::Point::new(10, 20),
            layer: LayerId(0),
            affected: vec![crate::item::Uid(1), crate::item::Uid(2)],
            sizes: SizesSettings::default(),
        };
        logger.log(event.clone());
        assert_eq!(logger.lines().len(), 1);
        let parsed = TextLogger::parse_line(&logger.lines()[0]).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn replay_log_parses_multiple_events_and_skips_blank_lines() {
        let mut logger = TextLogger::new();
        logger.log(LogEvent {
            kind: LogEventKind::StartRoute,
            position: geometry::prelude::Point::new(0, 0),
            layer: LayerId(0),
            affected: vec![],
            sizes: SizesSettings::default(),
        });
        logger.log(LogEvent {
            kind: LogEventKind::Fix,
            position: geometry::prelude::Point::new(1_000_000, 0),
            layer: LayerId(0),
            affected: vec![crate::item::Uid(1)],
            sizes: SizesSettings::default(),
        });
        let text = format!("{}\n\n{}\n", logger.lines()[0], logger.lines()[1]);
        let replayed = replay_log(&text).unwrap();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].kind, LogEventKind::StartRoute);
        assert_eq!(replayed[1].kind, LogEventKind::Fix);
    }

    #[test]
    fn replay_log_reports_the_failing_line_number() {
        let err = replay_log("{\"not\":\"valid\"}").unwrap_err();
        assert!(err.to_string().starts_with("log line 1:"));
    }
}
