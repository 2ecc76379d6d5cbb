use std::time::Duration;

use log::info;
use rand::{rngs::StdRng, Rng};

use crate::{
    algo::{AgentConfig, QLearningAgent},
    controller::{ControllerConfig, EpisodeController, Mode, Snapshot, TickOutcome, ToggleOutcome},
    env::GridEnvironment,
    error::Result,
    maze::MazeSource,
};

/// A user command, delivered at most once per tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Flip the active mode between its fast and slow tick rate
    ToggleSpeed,
    /// Enter or leave best path playback
    ToggleBestPathView,
    /// Restart the current episode
    ResetEpisode,
    Quit,
}

/// Whether the run should keep going
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Source of user commands, polled once per tick without blocking
pub trait InputSource {
    fn poll(&mut self) -> Result<Option<Command>>;
}

/// Visual output, called once per tick after the step
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) -> Result<()>;
}

/// Wall-clock pacing
pub trait Clock {
    /// Wait out the rest of the frame so that ticks happen at about `rate_hz`
    fn wait_frame(&mut self, rate_hz: u32) -> Result<()>;

    /// Hold for `duration`. Implementations may cut the pause short and return [`Flow::Quit`].
    fn pause(&mut self, duration: Duration) -> Result<Flow>;
}

/// Input, output and pacing together, as one terminal or window provides them
pub trait Frontend: InputSource + Renderer + Clock {}

impl<T: InputSource + Renderer + Clock + ?Sized> Frontend for T {}

/// A [`Frontend`] assembled from independent parts
#[derive(Clone, Debug, Default)]
pub struct Split<I, D, C> {
    pub input: I,
    pub renderer: D,
    pub clock: C,
}

impl<I: InputSource, D, C> InputSource for Split<I, D, C> {
    fn poll(&mut self) -> Result<Option<Command>> {
        self.input.poll()
    }
}

impl<I, D: Renderer, C> Renderer for Split<I, D, C> {
    fn render(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) -> Result<()> {
        self.renderer.render(snapshot, hud)
    }
}

impl<I, D, C: Clock> Clock for Split<I, D, C> {
    fn wait_frame(&mut self, rate_hz: u32) -> Result<()> {
        self.clock.wait_frame(rate_hz)
    }

    fn pause(&mut self, duration: Duration) -> Result<Flow> {
        self.clock.pause(duration)
    }
}

/// Driver state shown next to the controller snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    pub tick_rate: u32,
    pub slow: bool,
}

/// Two tick rates per mode, `[fast, slow]`, in ticks per second
///
/// The toggle flips between exactly these two. There is no third rate to cycle into, so the
/// defaults keep the fast and slow ends only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedPresets {
    pub training: [u32; 2],
    pub demonstration: [u32; 2],
    pub playback: [u32; 2],
}

impl Default for SpeedPresets {
    fn default() -> Self {
        Self {
            training: [1000, 10],
            demonstration: [10, 2],
            playback: [5, 2],
        }
    }
}

impl SpeedPresets {
    fn for_mode(&self, mode: Mode) -> [u32; 2] {
        match mode {
            Mode::Training => self.training,
            Mode::Demonstration => self.demonstration,
            Mode::BestPathPlayback => self.playback,
        }
    }
}

/// Tracks which preset is active for each mode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeedSelector {
    presets: SpeedPresets,
    slow: [bool; 3],
}

impl SpeedSelector {
    pub fn new(presets: SpeedPresets) -> Self {
        Self {
            presets,
            slow: [false; 3],
        }
    }

    fn slot(mode: Mode) -> usize {
        match mode {
            Mode::Training => 0,
            Mode::Demonstration => 1,
            Mode::BestPathPlayback => 2,
        }
    }

    pub fn toggle(&mut self, mode: Mode) {
        let slow = &mut self.slow[Self::slot(mode)];
        *slow = !*slow;
    }

    pub fn is_slow(&self, mode: Mode) -> bool {
        self.slow[Self::slot(mode)]
    }

    /// Active tick rate for `mode`
    pub fn rate(&self, mode: Mode) -> u32 {
        self.presets.for_mode(mode)[self.is_slow(mode) as usize]
    }
}

/// Everything needed to set up a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimConfig {
    pub agent: AgentConfig,
    pub controller: ControllerConfig,
    pub speeds: SpeedPresets,
    /// Seed for the exploration generator, entropy when `None`
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Build the environment, agent and controller for `maze`
    ///
    /// **Errors** if the maze lacks a start or goal, or if the configuration is invalid. Nothing is
    /// created in that case.
    pub fn build<M: MazeSource + ?Sized>(&self, maze: &M) -> Result<Simulation> {
        let env = GridEnvironment::from_source(maze)?;
        info!(
            "Maze {}x{}, start {:?}, goal {:?}",
            env.width(),
            env.height(),
            env.start(),
            env.goal()
        );
        let agent = QLearningAgent::with_seed(self.agent.clone(), self.seed)?;
        let controller = EpisodeController::new(env, agent, self.controller.clone())?;
        Ok(Simulation::new(controller, self.speeds.clone()))
    }
}

/// Totals for a finished run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub episodes: u64,
    pub goals: u64,
}

impl RunStats {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        if let Some(summary) = &outcome.finished {
            self.episodes += 1;
            if summary.reached_goal() {
                self.goals += 1;
            }
        }
    }
}

/// The tick loop: input, step, render, pace
pub struct Simulation<R: Rng = StdRng> {
    controller: EpisodeController<R>,
    speeds: SpeedSelector,
}

impl<R: Rng> Simulation<R> {
    pub fn new(controller: EpisodeController<R>, presets: SpeedPresets) -> Self {
        Self {
            controller,
            speeds: SpeedSelector::new(presets),
        }
    }

    pub fn controller(&self) -> &EpisodeController<R> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EpisodeController<R> {
        &mut self.controller
    }

    pub fn hud(&self) -> Hud {
        let mode = self.controller.mode();
        Hud {
            tick_rate: self.speeds.rate(mode),
            slow: self.speeds.is_slow(mode),
        }
    }

    /// Apply one user command
    pub fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::ToggleSpeed => {
                self.speeds.toggle(self.controller.mode());
                info!("Speed: {} ticks/s", self.speeds.rate(self.controller.mode()));
            }
            Command::ToggleBestPathView => {
                if let ToggleOutcome::Entered { path_len } = self.controller.toggle_best_path_view() {
                    info!("Replaying greedy path of {path_len} positions");
                }
            }
            Command::ResetEpisode => self.controller.reset_episode(),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Run one tick. [`Flow::Quit`] means the run should stop.
    pub fn tick<F>(&mut self, frontend: &mut F, stats: &mut RunStats) -> Result<Flow>
    where
        F: Frontend + ?Sized,
    {
        if let Some(command) = frontend.poll()? {
            if self.handle(command) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        let outcome = self.controller.tick();
        stats.record(&outcome);

        frontend.render(&self.controller.snapshot(), &self.hud())?;
        frontend.wait_frame(self.hud().tick_rate)?;

        match outcome.pause {
            Some(duration) => frontend.pause(duration),
            None => Ok(Flow::Continue),
        }
    }

    /// Tick until a quit command arrives, including one that interrupts a pause
    pub fn run<F>(&mut self, frontend: &mut F) -> Result<RunStats>
    where
        F: Frontend + ?Sized,
    {
        let mut stats = RunStats::default();
        while self.tick(frontend, &mut stats)? == Flow::Continue {}

        let best = self.controller.best_path().map(|b| b.len());
        info!(
            "Run finished after {} episodes and {} steps, best path: {best:?}",
            stats.episodes,
            self.controller.total_steps()
        );
        Ok(stats)
    }
}

/// A [`Clock`] that never waits, for headless runs and tests
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWait;

impl Clock for NoWait {
    fn wait_frame(&mut self, _rate_hz: u32) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self, _duration: Duration) -> Result<Flow> {
        Ok(Flow::Continue)
    }
}

/// A [`Renderer`] that draws nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &Snapshot<'_>, _hud: &Hud) -> Result<()> {
        Ok(())
    }
}
