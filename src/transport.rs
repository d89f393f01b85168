/// `Starting`, `Pausing` and `Stopping` are only passed through on the way to
/// `Playing`, `Paused` and `Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportState {
    Stopped = 0,
    Starting = 1,
    Playing = 2,
    Pausing = 3,
    Paused = 4,
    Stopping = 5,
}

impl TransportState {
    pub fn is_idle(self) -> bool {
        matches!(self, TransportState::Stopped | TransportState::Paused)
    }

    /// Anything that is not `Stopped`.
    pub fn is_active(self) -> bool {
        self != TransportState::Stopped
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => TransportState::Starting,
            2 => TransportState::Playing,
            3 => TransportState::Pausing,
            4 => TransportState::Paused,
            5 => TransportState::Stopping,
            _ => TransportState::Stopped,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransportState::Stopped => "Stopped",
            TransportState::Starting => "Starting",
            TransportState::Playing => "Playing",
            TransportState::Pausing => "Pausing",
            TransportState::Paused => "Paused",
            TransportState::Stopping => "Stopping",
        }
    }
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Pause,
    Stop,
    /// Playhead reached the end of the region with looping off.
    RegionEnd,
}

/// States to enter, in order, for `command` issued in `state`.
/// Empty when the command does not apply.
pub fn plan(state: TransportState, command: TransportCommand) -> Vec<TransportState> {
    use TransportState::*;
    match (command, state) {
        (TransportCommand::Play, Stopped | Paused) => vec![Starting, Playing],
        (TransportCommand::Pause, Playing) => vec![Pausing, Paused],
        (TransportCommand::Stop | TransportCommand::RegionEnd, Paused) => vec![Stopped],
        (TransportCommand::Stop | TransportCommand::RegionEnd, Starting | Playing | Pausing) => {
            vec![Stopping, Stopped]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransportState::*;

    #[test]
    fn play_only_from_idle() {
        assert_eq!(plan(Stopped, TransportCommand::Play), vec![Starting, Playing]);
        assert_eq!(plan(Paused, TransportCommand::Play), vec![Starting, Playing]);
        assert!(plan(Playing, TransportCommand::Play).is_empty());
    }

    #[test]
    fn stop_from_paused_skips_stopping() {
        assert_eq!(plan(Paused, TransportCommand::Stop), vec![Stopped]);
        assert_eq!(plan(Playing, TransportCommand::Stop), vec![Stopping, Stopped]);
        assert!(plan(Stopped, TransportCommand::Stop).is_empty());
    }

    #[test]
    fn pause_only_while_playing() {
        assert_eq!(plan(Playing, TransportCommand::Pause), vec![Pausing, Paused]);
        assert!(plan(Paused, TransportCommand::Pause).is_empty());
        assert!(plan(Stopped, TransportCommand::Pause).is_empty());
    }
}
