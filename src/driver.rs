//! Async driver for a simulation
//!
//! Sleeps until the simulation's next tick or frame is due and applies user
//! commands as they arrive. Everything runs on the caller's task, so the
//! simulation never needs to be shared.

use crate::core::SystemClock;
use crate::simulation::{Command, Simulation};
use crate::ui::Presenter;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Stop conditions for [`run`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOptions {
    /// Return once playback completed and the last animation settled
    pub exit_on_complete: bool,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn flush<P>(sim: &mut Simulation<SystemClock>, presenter: &mut P) -> Result<()>
where
    P: Presenter + ?Sized,
{
    for event in sim.drain_events() {
        presenter.present(&event)?;
    }
    Ok(())
}

/// Run the simulation until `quit`, or until nothing can happen any more
pub async fn run<P: Presenter + ?Sized>(
    sim: &mut Simulation<SystemClock>,
    mut commands: mpsc::Receiver<Command>,
    presenter: &mut P,
    options: DriverOptions,
) -> Result<()> {
    let mut commands_open = true;

    loop {
        flush(sim, presenter)?;

        if options.exit_on_complete && sim.is_finished() {
            info!("Playback complete");
            break;
        }

        let deadline = sim.next_wakeup().map(|at| sim.clock().instant_at(at));
        if deadline.is_none() && !commands_open {
            debug!("No pending work and no command source, stopping");
            break;
        }

        tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(Command::Quit) => break,
                Some(command) => sim.apply(command),
                None => commands_open = false,
            },
            _ = wait_until(deadline) => sim.poll(),
        }
    }

    debug!("Driver stopped at waypoint {} ({:?})", sim.telemetry().index, sim.state());
    flush(sim, presenter)?;
    presenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Waypoint;
    use crate::playback::PlaybackState;
    use crate::simulation::{SimulationConfig, SimulationEvent, Telemetry};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        events: Vec<SimulationEvent>,
        finished: bool,
    }

    impl Recorder {
        fn telemetry(&self) -> Vec<&Telemetry> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    SimulationEvent::Telemetry(t) => Some(t),
                    _ => None,
                })
                .collect()
        }
    }

    impl Presenter for Recorder {
        fn present(&mut self, event: &SimulationEvent) -> Result<()> {
            self.events.push(event.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn route() -> Vec<Waypoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        (0..3)
            .map(|i| {
                let ts = start + ChronoDuration::seconds(i * 10);
                Waypoint::new(10.0 + i as f64 * 0.01, 20.0, ts)
            })
            .collect()
    }

    fn simulation() -> Simulation<SystemClock> {
        let mut sim = Simulation::new(SystemClock::new(), SimulationConfig::default());
        sim.load(route());
        sim
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let mut sim = simulation();
        sim.play();
        let (_tx, rx) = mpsc::channel(8);
        let mut recorder = Recorder::default();

        let options = DriverOptions { exit_on_complete: true };
        run(&mut sim, rx, &mut recorder, options).await.unwrap();

        assert!(recorder.finished);
        let telemetry = recorder.telemetry();
        let last = telemetry.last().unwrap();
        assert_eq!(last.index, 2);
        assert_eq!(last.status, PlaybackState::Completed);
        assert_eq!(last.position, Some(route()[2].position()));

        // Frames were produced between the waypoints
        let in_between = telemetry
            .iter()
            .filter_map(|t| t.position)
            .filter(|p| p.lat > 10.0 && p.lat < 10.01)
            .count();
        assert!(in_between > 10, "only {} interpolated frames", in_between);

        let pans = recorder
            .events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::PanTo(_)))
            .count();
        // Load plus two ticks
        assert_eq!(pans, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_are_applied() {
        let mut sim = simulation();
        let (tx, rx) = mpsc::channel(8);
        let mut recorder = Recorder::default();

        let script = async move {
            tx.send(Command::Play).await.unwrap();
            tokio::time::sleep(Duration::from_millis(2500)).await;
            tx.send(Command::Pause).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5000)).await;
            tx.send(Command::Quit).await.unwrap();
        };

        let (result, _) = tokio::join!(
            run(&mut sim, rx, &mut recorder, DriverOptions::default()),
            script
        );
        result.unwrap();

        assert_eq!(sim.state(), PlaybackState::Paused);
        assert_eq!(sim.telemetry().index, 1);
        assert!(!sim.is_animating());
        assert_eq!(sim.position(), Some(route()[1].position()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_idle_and_input_closed() {
        let mut sim = simulation();
        let (tx, rx) = mpsc::channel(8);
        drop(tx);
        let mut recorder = Recorder::default();

        run(&mut sim, rx, &mut recorder, DriverOptions::default()).await.unwrap();
        assert_eq!(sim.state(), PlaybackState::Idle);
        assert!(recorder.finished);
    }
}
