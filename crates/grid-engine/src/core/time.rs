use crate::api::error::EngineError;

/// Fraction of a step the accumulator must reach before a step runs.
/// Steps may run slightly early so frame-time jitter does not cause visible stutter.
pub const EARLY_STEP_TOLERANCE: f32 = 0.75;

/// Fixed-step accumulator with an interpolation ratio.
/// Runs simulation steps at a constant logical rate regardless of frame time,
/// and reports how far the leftover time has progressed toward the next step.
#[derive(Debug, Clone)]
pub struct FixedInterpUpdater {
    /// Duration of one fixed step, in seconds.
    step: f32,
    /// Unconsumed simulation time. Can dip slightly negative after an early step.
    accumulator: f32,
    /// Optional cap on steps per frame (prevents a spiral of death after a long stall).
    max_steps: Option<u32>,
}

impl FixedInterpUpdater {
    pub fn new(step: f32) -> Result<Self, EngineError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(EngineError::InvalidStepDuration(step));
        }
        Ok(Self {
            step,
            accumulator: 0.0,
            max_steps: None,
        })
    }

    /// Build an updater running `times_per_second` steps per second.
    pub fn from_hz(times_per_second: f32) -> Result<Self, EngineError> {
        Self::new(1.0 / times_per_second)
    }

    /// Build an updater and, if `initial`, run `fixed` once right away so
    /// dependent state is valid before the first frame.
    pub fn create<T>(
        step: f32,
        initial: bool,
        target: &mut T,
        fixed: impl FnOnce(&mut T),
    ) -> Result<Self, EngineError> {
        let updater = Self::new(step)?;
        if initial {
            fixed(target);
        }
        Ok(updater)
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = Some(max_steps.max(1));
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;

        if let Some(max) = self.max_steps {
            let cap = self.step * max as f32;
            if self.accumulator > cap {
                log::warn!(
                    "fixed step backlog of {:.3}s clamped to {} steps",
                    self.accumulator,
                    max
                );
                self.accumulator = cap;
            }
        }

        let mut steps = 0;
        while self.accumulator >= self.step * EARLY_STEP_TOLERANCE {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Progress toward the next step (0.0 to 1.0), for render interpolation.
    pub fn ratio(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// Accumulate `frame_dt`, run `fixed` once per due step, then hand the
    /// interpolation ratio to `interpolate`.
    pub fn update<T>(
        &mut self,
        frame_dt: f32,
        target: &mut T,
        mut fixed: impl FnMut(&mut T),
        mut interpolate: impl FnMut(&mut T, f32),
    ) {
        let steps = self.accumulate(frame_dt);
        for _ in 0..steps {
            fixed(target);
        }
        interpolate(target, self.ratio());
    }

    /// The fixed step duration in seconds.
    pub fn step(&self) -> f32 {
        self.step
    }
}

/// Per-frame updater that scales work by a time modifier instead of quantizing.
/// `tmod` is 1.0 when a frame lasts exactly `1 / target_fps` seconds.
#[derive(Debug, Clone, Copy)]
pub struct TmodUpdater {
    target_fps: f32,
}

impl TmodUpdater {
    pub fn new(target_fps: f32) -> Self {
        Self { target_fps }
    }

    /// Build an updater and run `update` once with a zero frame time.
    pub fn create<T>(target_fps: f32, target: &mut T, update: impl FnOnce(&mut T, f32, f32)) -> Self {
        let updater = Self::new(target_fps);
        update(target, 0.0, 0.0);
        updater
    }

    pub fn tmod(&self, frame_dt: f32) -> f32 {
        frame_dt * self.target_fps
    }

    /// Run `update(target, dt, tmod)` for this frame.
    pub fn update<T>(&self, frame_dt: f32, target: &mut T, update: impl FnOnce(&mut T, f32, f32)) {
        update(target, frame_dt, self.tmod(frame_dt));
    }
}
