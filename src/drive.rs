use std::time::{Duration, Instant};

use anyhow::Context;
use qcar_sim::{Action, Frame, FrameView, RenderSignal, Renderer, Session, SessionConfig, StateVector};
use spin_sleep::SpinSleeper;
use tracing::{debug, info, trace};

use crate::config::DriveSettings;

/// Headless front end: logs every rendered frame and optionally holds the
/// session to its frame rate.
struct TraceRenderer {
    sleeper: SpinSleeper,
    period: Option<Duration>,
    last_frame: Option<Instant>,
    frames: usize,
}

impl TraceRenderer {
    fn new(period: Option<Duration>) -> Self {
        TraceRenderer {
            sleeper: SpinSleeper::new(10_000),
            period,
            last_frame: None,
            frames: 0,
        }
    }
}

impl Renderer for TraceRenderer {
    fn render_frame(&mut self, frame: &FrameView<'_>) -> RenderSignal {
        self.frames += 1;
        debug!(
            frame = self.frames,
            state = %frame.state,
            goal_reached = frame.goal_reached,
            status = %frame.status[0],
            "Rendered frame"
        );
        if let Some((center, radius)) = frame.turning_circle {
            trace!(%center, radius, "Turning circle");
        }

        if let Some(period) = self.period {
            if let Some(last) = self.last_frame {
                if let Some(remaining) = period.checked_sub(last.elapsed()) {
                    self.sleeper.sleep(remaining);
                }
            }
            self.last_frame = Some(Instant::now());
        }
        RenderSignal::Continue
    }
}

/// Where a scripted drive ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveReport {
    pub frames: usize,
    pub goal_reached: bool,
    pub world: StateVector,
    pub egocentric: StateVector,
}

/// Plays the drive script against a fresh session.
pub fn run_drive(session: SessionConfig, settings: &DriveSettings) -> anyhow::Result<DriveReport> {
    let session = Session::new(session).context("Invalid session configuration")?;
    let period = settings.realtime.then(|| Duration::from_secs_f64(session.dt()));
    let mut session = session.with_renderer(Box::new(TraceRenderer::new(period)));
    info!(car = %session.car(), realtime = settings.realtime, "Drive started");

    let mut frames = 0;
    'script: for (i, step) in settings.script.iter().enumerate() {
        session
            .apply_action(Action::Discrete(step.action))
            .with_context(|| format!("Script step {i} has an invalid action"))?;
        let status = format!("step {i}: {}", session.controls());
        session.print(0, status);

        for _ in 0..step.frames {
            if !session.step(1, true)? {
                info!(frames, "Session stopped");
                break 'script;
            }
            frames += 1;
            if settings.stop_at_goal && session.goal_reached() {
                info!(frames, "Goal reached");
                break 'script;
            }
        }
    }

    let report = DriveReport {
        frames,
        goal_reached: session.goal_reached(),
        world: session.state(Frame::World),
        egocentric: session.state(Frame::Egocentric),
    };
    info!(frames, car = %session.car(), "Drive finished");
    Ok(report)
}
