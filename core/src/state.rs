//! State events and the append-only trace of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of states a run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    /// A run has begun.
    Start,
    /// The raw request was received.
    Input,
    /// The oracle is being asked for SQL (or a chart plan).
    Process,
    /// The oracle produced a candidate.
    Observation,
    /// A candidate executed successfully.
    Output,
    /// Terminal state, for both success and failure.
    Stop,
    /// A failure was observed; recoverable or not.
    Error,
}

impl State {
    /// Upper-case wire name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Input => "INPUT",
            Self::Process => "PROCESS",
            Self::Observation => "OBSERVATION",
            Self::Output => "OUTPUT",
            Self::Stop => "STOP",
            Self::Error => "ERROR",
        }
    }

    /// `STOP` is the only terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEvent {
    /// State entered.
    pub state: State,
    /// Optional human-readable detail.
    pub message: Option<String>,
    /// When the transition was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only sequence of [`StateEvent`]s.
///
/// Once a `STOP` event is recorded the trace is closed and further events are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<StateEvent>,
}

impl Trace {
    /// Creates an empty trace.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event and logs it.
    ///
    /// Returns `None` without recording anything if the trace is already closed.
    pub fn record(&mut self, state: State, message: Option<String>) -> Option<&StateEvent> {
        if self.is_closed() {
            tracing::warn!(state = %state, "dropping event recorded after STOP");
            return None;
        }

        tracing::info!(
            state = %state,
            message = message.as_deref().unwrap_or(""),
            "state transition"
        );

        self.events.push(StateEvent {
            state,
            message,
            timestamp: Utc::now(),
        });
        self.events.last()
    }

    /// All events in emission order.
    #[must_use]
    pub fn events(&self) -> &[StateEvent] {
        &self.events
    }

    /// The states in emission order.
    #[must_use]
    pub fn states(&self) -> Vec<State> {
        self.events.iter().map(|e| e.state).collect()
    }

    /// Number of events recorded with `state`.
    #[must_use]
    pub fn count(&self, state: State) -> usize {
        self.events.iter().filter(|e| e.state == state).count()
    }

    /// The most recent event.
    #[must_use]
    pub fn last(&self) -> Option<&StateEvent> {
        self.events.last()
    }

    /// Whether a terminal event has been recorded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.events.last().is_some_and(|e| e.state.is_terminal())
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates the events.
    pub fn iter(&self) -> std::slice::Iter<'_, StateEvent> {
        self.events.iter()
    }

    /// Consumes the trace, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<StateEvent> {
        self.events
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a StateEvent;
    type IntoIter = std::slice::Iter<'a, StateEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&State::Observation).unwrap(), "\"OBSERVATION\"");
        let parsed: State = serde_json::from_str("\"STOP\"").unwrap();
        assert_eq!(parsed, State::Stop);
    }

    #[test]
    fn test_trace_closes_after_stop() {
        let mut trace = Trace::new();
        assert!(trace.record(State::Start, None).is_some());
        assert!(trace.record(State::Stop, Some("done".to_string())).is_some());
        assert!(trace.is_closed());

        assert!(trace.record(State::Error, None).is_none());
        assert_eq!(trace.states(), vec![State::Start, State::Stop]);
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut trace = Trace::new();
        trace.record(State::Start, None);
        trace.record(State::Input, Some("q".to_string()));
        let events = trace.events();
        assert!(events[0].timestamp <= events[1].timestamp);
    }

    #[test]
    fn test_trace_serializes_as_list() {
        let mut trace = Trace::new();
        trace.record(State::Start, None);
        let json = serde_json::to_value(&trace).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["state"], "START");
        assert!(json[0]["message"].is_null());
    }
}
