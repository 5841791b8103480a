use crate::playback::PlaybackState;
use crate::simulation::{SimulationEvent, Telemetry};
use crate::ui::Presenter;
use anyhow::Result;
use std::io::Write;

/// Width the status line is padded to, so shorter lines fully overwrite
const LINE_WIDTH: usize = 96;

/// Status line renderer for a terminal
///
/// Frame updates redraw the current line in place. A new waypoint or status
/// starts a new line, so the settled state of every waypoint stays visible.
pub struct ConsolePresenter<W: Write> {
    out: W,
    last: Option<(usize, PlaybackState)>,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present(&mut self, event: &SimulationEvent) -> Result<()> {
        let telemetry = match event {
            SimulationEvent::Telemetry(t) => t,
            SimulationEvent::PanTo(_) => return Ok(()),
        };

        let key = (telemetry.index, telemetry.status);
        if self.last.is_some() && self.last != Some(key) {
            writeln!(self.out)?;
        }
        self.last = Some(key);

        write!(self.out, "\r{:<width$}", format_telemetry(telemetry), width = LINE_WIDTH)?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.last.is_some() {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn status_label(status: PlaybackState) -> &'static str {
    match status {
        PlaybackState::Idle => "idle",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
        PlaybackState::Completed => "done",
    }
}

/// One-line rendering of a telemetry snapshot
pub fn format_telemetry(t: &Telemetry) -> String {
    let position = match t.position {
        Some(p) => format!("{:>10.6}, {:>11.6}", p.lat, p.lng),
        None => "no data".to_string(),
    };
    let index = if t.total == 0 { 0 } else { t.index + 1 };
    let speed = match t.speed.kmh() {
        Some(_) => format!("{} km/h", t.speed),
        None => t.speed.to_string(),
    };

    format!(
        "[{:<7}] {:>3}/{:<3} {}  {:>14}  {}  {:>3.0}%  {:.2} km",
        status_label(t.status),
        index,
        t.total,
        position,
        speed,
        t.elapsed,
        t.progress * 100.0,
        t.traveled_km,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;
    use crate::kinematics::Speed;

    fn telemetry(index: usize, status: PlaybackState) -> Telemetry {
        Telemetry {
            position: Some(Position::new(17.385044, 78.486671)),
            index,
            total: 4,
            speed: Speed::Kmh(42.5),
            elapsed: "01:05".to_string(),
            progress: (index + 1) as f64 / 4.0,
            traveled_km: 1.234,
            status,
        }
    }

    #[test]
    fn test_format_telemetry() {
        let line = format_telemetry(&telemetry(1, PlaybackState::Playing));
        assert!(line.starts_with("[playing]   2/4"));
        assert!(line.contains("17.385044,   78.486671"));
        assert!(line.contains("42.50 km/h"));
        assert!(line.contains("01:05"));
        assert!(line.contains(" 50%"));
        assert!(line.ends_with("1.23 km"));
    }

    #[test]
    fn test_format_without_data() {
        let t = Telemetry {
            position: None,
            index: 0,
            total: 0,
            speed: Speed::Unavailable,
            elapsed: "00:00".to_string(),
            progress: 0.0,
            traveled_km: 0.0,
            status: PlaybackState::Idle,
        };
        let line = format_telemetry(&t);
        assert!(line.contains("0/0"));
        assert!(line.contains("no data"));
        assert!(line.contains("N/A"));
        assert!(!line.contains("N/A km/h"));
    }

    #[test]
    fn test_new_line_per_waypoint() {
        let playing = |index| SimulationEvent::Telemetry(telemetry(index, PlaybackState::Playing));
        let mut buffer = Vec::new();
        let mut presenter = ConsolePresenter::new(&mut buffer);
        presenter.present(&playing(0)).unwrap();
        presenter.present(&SimulationEvent::PanTo(Position::new(0.0, 0.0))).unwrap();
        presenter.present(&playing(0)).unwrap();
        presenter.present(&playing(1)).unwrap();
        presenter.finish().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.matches('\n').count(), 2);
        assert_eq!(output.matches('\r').count(), 3);
    }
}
