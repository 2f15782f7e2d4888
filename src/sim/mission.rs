// ---------------------------------------------------------------------------
// Scripted missions: timed commands fed into a flight controller
// ---------------------------------------------------------------------------

/// One command issued to the flight controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TakeOff,
    Land,
    TakeControl,
    ReleaseControl,
    /// Body-frame FLU velocity [m/s] and yaw rate [deg/s].
    BodyVelocity {
        forward: f64,
        left: f64,
        up: f64,
        yaw_rate: f64,
    },
    /// Compass heading hold [deg].
    Heading(f64),
}

/// A command scheduled at a simulation time.
#[derive(Debug, Clone)]
pub struct TimedCommand {
    pub time: f64,
    pub command: Command,
}

/// A time-ordered command script. Commands fire once, in order, when the
/// simulation clock passes their timestamp.
#[derive(Debug, Clone, Default)]
pub struct MissionScript {
    commands: Vec<TimedCommand>,
    next: usize,
}

impl MissionScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a command. Keeps the script sorted so scheduling out of
    /// order is fine.
    pub fn at(mut self, time: f64, command: Command) -> Self {
        self.commands.push(TimedCommand { time, command });
        self.commands
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        self
    }

    /// Next command due at or before `time`, if any. Call in a loop; each
    /// command is returned exactly once.
    pub fn pop_due(&mut self, time: f64) -> Option<&Command> {
        let cmd = self.commands.get(self.next)?;
        if cmd.time > time {
            return None;
        }
        self.next += 1;
        Some(&cmd.command)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.commands.len()
    }

    /// Time of the last scheduled command, or zero for an empty script.
    pub fn end_time(&self) -> f64 {
        self.commands.last().map_or(0.0, |c| c.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_fire_once_in_time_order() {
        // Scheduled out of order on purpose.
        let mut script = MissionScript::new()
            .at(5.0, Command::Land)
            .at(1.0, Command::TakeOff);

        assert!(script.pop_due(0.5).is_none());
        assert_eq!(script.pop_due(1.0), Some(&Command::TakeOff));
        assert!(script.pop_due(1.0).is_none());
        assert_eq!(script.pop_due(6.0), Some(&Command::Land));
        assert!(script.is_finished());
    }

    #[test]
    fn simultaneous_commands_all_fire() {
        let mut script = MissionScript::new()
            .at(2.0, Command::TakeControl)
            .at(2.0, Command::TakeOff);

        let mut fired = 0;
        while script.pop_due(2.0).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn end_time_tracks_last_command() {
        let script = MissionScript::new()
            .at(1.0, Command::TakeOff)
            .at(12.5, Command::Land);
        assert_eq!(script.end_time(), 12.5);
        assert_eq!(MissionScript::new().end_time(), 0.0);
    }
}
