use crate::core::{Clock, Position};
use std::time::Duration;
use tracing::trace;

/// Handle for the next frame of one specific animation
///
/// Every retarget or cancel invalidates the tickets handed out before it, so
/// a frame scheduled for a superseded animation cannot touch the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// In-flight interpolation between two positions
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub from: Position,
    pub to: Position,
    /// Clock reading when the animation started
    pub started_at: Duration,
    pub duration: Duration,
}

impl AnimationFrame {
    /// Normalised progress at clock reading `now`, clamped to `[0, 1]`
    pub fn progress(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }
}

/// Outcome of accepting a new target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retarget {
    /// Position the view should follow
    pub pan_to: Position,
    /// Ticket for the first frame, `None` when the move was snapped
    pub frame: Option<FrameTicket>,
}

/// Outcome of running one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// Position was updated. `next` is set while the animation continues.
    Moved {
        position: Position,
        next: Option<FrameTicket>,
    },
    /// The ticket belongs to a superseded or cancelled animation
    Stale,
}

/// Produces smooth intermediate positions between discrete waypoints
pub struct InterpolationAnimator<C: Clock> {
    clock: C,
    frame: Option<AnimationFrame>,
    position: Option<Position>,
    generation: u64,
}

impl<C: Clock> InterpolationAnimator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            frame: None,
            position: None,
            generation: 0,
        }
    }

    /// Currently displayed position
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_animating(&self) -> bool {
        self.frame.is_some()
    }

    /// Drop any in-flight animation. Its outstanding ticket becomes stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.frame = None;
    }

    /// Cancel and jump straight to `position`
    pub fn snap_to(&mut self, position: Option<Position>) {
        self.cancel();
        self.position = position;
    }

    /// Start moving towards `target`
    ///
    /// While another animation is in flight, the move starts from the
    /// currently displayed position rather than from `previous`. A missing or
    /// identical start position, or a zero duration, snaps without scheduling
    /// any frame.
    pub fn on_target_changed(
        &mut self,
        previous: Option<Position>,
        target: Position,
        duration: Duration,
    ) -> Retarget {
        let from = if self.frame.is_some() {
            self.position
        } else {
            previous
        };
        self.cancel();

        match from {
            Some(from) if from != target && !duration.is_zero() => {
                trace!("Animating {:?} -> {:?} over {:?}", from, target, duration);
                self.frame = Some(AnimationFrame {
                    from,
                    to: target,
                    started_at: self.clock.now(),
                    duration,
                });
                self.position = Some(from);
                Retarget {
                    pan_to: target,
                    frame: Some(FrameTicket {
                        generation: self.generation,
                    }),
                }
            }
            _ => {
                self.position = Some(target);
                Retarget {
                    pan_to: target,
                    frame: None,
                }
            }
        }
    }

    /// Advance the animation identified by `ticket` to the current time
    ///
    /// On reaching progress 1 the position is set exactly to the target and
    /// the animation state is cleared.
    pub fn on_frame(&mut self, ticket: FrameTicket) -> FrameStep {
        if ticket.generation != self.generation {
            return FrameStep::Stale;
        }
        let frame = match &self.frame {
            Some(frame) => frame,
            None => return FrameStep::Stale,
        };

        let t = frame.progress(self.clock.now());
        if t >= 1.0 {
            let target = frame.to;
            self.position = Some(target);
            self.frame = None;
            return FrameStep::Moved {
                position: target,
                next: None,
            };
        }

        let position = frame.from.lerp(&frame.to, t);
        self.position = Some(position);
        FrameStep::Moved {
            position,
            next: Some(ticket),
        }
    }
}
