use tracing::info;

use crate::config::{ImageMode, ImageOrMovie};
use crate::spins::SpinGrid;

/// Receives lattice snapshots during a run.
///
/// The driver calls [`snapshot`](Self::snapshot) once per measurement cycle,
/// before advancing the lattice, and [`end_actions`](Self::end_actions) once
/// after the loop. What happens to the frames is up to the implementation.
pub trait VisualOutput: Send {
    fn snapshot(&mut self, lattice: &SpinGrid, last_frame: bool);

    fn end_actions(&mut self);
}

/// Discards all frames.
#[derive(Debug, Default)]
pub struct NoVisualOutput;

impl VisualOutput for NoVisualOutput {
    fn snapshot(&mut self, _lattice: &SpinGrid, _last_frame: bool) {}

    fn end_actions(&mut self) {}
}

/// Grayscale frame in `[0, 255]`, row-major, `side × side`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub side: usize,
    pub pixels: Vec<u8>,
}

/// Running sum of ±1 lattices, averaged into one grayscale frame.
#[derive(Debug, Clone)]
pub struct TemporalAverageLattice {
    side: usize,
    sum: Vec<i32>,
    recorded: usize,
}

impl TemporalAverageLattice {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            sum: vec![0; side * side],
            recorded: 0,
        }
    }

    pub fn add(&mut self, lattice: &SpinGrid) {
        for (acc, &s) in self.sum.iter_mut().zip(lattice.as_slice()) {
            *acc += s as i32;
        }
        self.recorded += 1;
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Average mapped from `[-1, 1]` to `[0, 255]`; all-black when empty.
    pub fn average(&self) -> Frame {
        let n = self.recorded.max(1) as f64;
        let pixels = self
            .sum
            .iter()
            .map(|&s| ((s as f64 / n + 1.0) * 127.5).round().clamp(0.0, 255.0) as u8)
            .collect();
        Frame {
            side: self.side,
            pixels,
        }
    }

    pub fn clear(&mut self) {
        self.sum.fill(0);
        self.recorded = 0;
    }
}

/// Windowed-average movie frames: every `blend_frames` snapshots are
/// averaged into one frame.
#[derive(Debug)]
pub struct TemporalAverage {
    blend_frames: usize,
    window: TemporalAverageLattice,
    frames: Vec<Frame>,
    temperature: f64,
}

impl TemporalAverage {
    pub fn new(side: usize, blend_frames: usize, temperature: f64) -> Self {
        Self {
            blend_frames: blend_frames.max(1),
            window: TemporalAverageLattice::new(side),
            frames: Vec::new(),
            temperature,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl VisualOutput for TemporalAverage {
    fn snapshot(&mut self, lattice: &SpinGrid, last_frame: bool) {
        self.window.add(lattice);
        if self.window.recorded() >= self.blend_frames || last_frame {
            self.frames.push(self.window.average());
            self.window.clear();
        }
    }

    fn end_actions(&mut self) {
        if self.window.recorded() > 0 {
            self.frames.push(self.window.average());
            self.window.clear();
        }
        info!(
            T = self.temperature,
            frames = self.frames.len(),
            "movie frames collected"
        );
    }
}

/// Keeps every `interval`-th snapshot and the last one.
#[derive(Debug)]
pub struct IntervalSnapshots {
    interval: usize,
    count: usize,
    frames: Vec<SpinGrid>,
    temperature: f64,
}

impl IntervalSnapshots {
    pub fn new(interval: usize, temperature: f64) -> Self {
        Self {
            interval: interval.max(1),
            count: 0,
            frames: Vec::new(),
            temperature,
        }
    }

    pub fn frames(&self) -> &[SpinGrid] {
        &self.frames
    }
}

impl VisualOutput for IntervalSnapshots {
    fn snapshot(&mut self, lattice: &SpinGrid, last_frame: bool) {
        if self.count % self.interval == 0 || last_frame {
            self.frames.push(lattice.clone());
        }
        self.count += 1;
    }

    fn end_actions(&mut self) {
        info!(
            T = self.temperature,
            frames = self.frames.len(),
            "interval snapshots collected"
        );
    }
}

pub fn build_visual_output(
    mode: &ImageMode,
    side: usize,
    temperature: f64,
) -> Box<dyn VisualOutput> {
    match mode.mode {
        ImageOrMovie::None => Box::new(NoVisualOutput),
        ImageOrMovie::Movie => Box::new(TemporalAverage::new(side, mode.blend_frames, temperature)),
        ImageOrMovie::Intervals => {
            Box::new(IntervalSnapshots::new(mode.frame_interval, temperature))
        }
    }
}
