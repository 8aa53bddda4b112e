use log::debug;

/// Phase of a client instance. Advances strictly forward; ends in `Done`
/// or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Resolving,
    Connecting,
    Handshaking,
    Writing,
    ParsingStatus,
    ParsingHeaders,
    Streaming,
    Done,
    Failed,
}

impl State {
    /// Name of the phase as it appears in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            State::Idle => "Idle",
            State::Resolving => "Resolve",
            State::Connecting => "Connect",
            State::Handshaking => "HandShake",
            State::Writing => "WriteRequest",
            State::ParsingStatus => "ReadStatusLine",
            State::ParsingHeaders => "ReadHeaders",
            State::Streaming => "ReadBody",
            State::Done => "Done",
            State::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Done | State::Failed)
    }

    pub(crate) fn advance(&mut self, next: State) {
        debug!("{} -> {}", self.label(), next.label());
        *self = next;
    }
}
