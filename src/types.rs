use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub const AMPLITUDE_RANGE: RangeInclusive<f32> = 0.1..=2.0;
pub const FLUID_DEPTH_RANGE: RangeInclusive<f32> = 0.001..=0.1;
pub const DAMPING_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const PARTICLE_RADIUS_RANGE: RangeInclusive<f32> = 0.5..=4.0;
pub const MODE_INDEX_MAX: usize = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Disk,
    Square,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Disk, Shape::Square, Shape::Triangle];

    pub fn label(self) -> &'static str {
        match self {
            Shape::Disk => "Circular",
            Shape::Square => "Square",
            Shape::Triangle => "Star / triangle",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldModel {
    #[default]
    ReflectingWave,
    Chladni,
    TwoMode,
}

impl FieldModel {
    pub const ALL: [FieldModel; 3] = [
        FieldModel::ReflectingWave,
        FieldModel::Chladni,
        FieldModel::TwoMode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FieldModel::ReflectingWave => "Fluid surface (reflecting waves)",
            FieldModel::Chladni => "Chladni plate (eigenmodes)",
            FieldModel::TwoMode => "Two-mode superposition",
        }
    }

    pub fn frequency_range(self) -> RangeInclusive<f32> {
        match self {
            FieldModel::ReflectingWave => 1.0..=30_000_000.0,
            FieldModel::Chladni => 20.0..=2_000.0,
            FieldModel::TwoMode => 50.0..=1_000.0,
        }
    }

    pub fn default_frequency(self) -> f32 {
        match self {
            FieldModel::ReflectingWave => 1_000_000.0,
            FieldModel::Chladni => 440.0,
            FieldModel::TwoMode => 200.0,
        }
    }

    pub fn frequency_step(self) -> f32 {
        match self {
            FieldModel::ReflectingWave => 1_000.0,
            FieldModel::Chladni | FieldModel::TwoMode => 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub model: FieldModel,
    pub shape: Shape,
    pub mode_index: usize,
    pub frequency: f32,
    pub amplitude: f32,
    pub fluid_depth: f32,
    pub damping: f32,
    pub particle_radius: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            model: FieldModel::ReflectingWave,
            shape: Shape::Disk,
            mode_index: 0,
            frequency: FieldModel::ReflectingWave.default_frequency(),
            amplitude: 1.0,
            fluid_depth: 0.01,
            damping: 0.1,
            particle_radius: 1.0,
        }
    }
}

impl SimulationParams {
    pub fn clamped(self) -> Self {
        let mut params = Self::default();
        params.model = self.model;
        params.shape = self.shape;
        params.frequency = self.model.default_frequency();
        params.set_mode_index(self.mode_index);
        params.set_frequency(self.frequency);
        params.set_amplitude(self.amplitude);
        params.set_fluid_depth(self.fluid_depth);
        params.set_damping(self.damping);
        params.set_particle_radius(self.particle_radius);
        params
    }

    pub fn set_frequency(&mut self, hz: f32) {
        assign_clamped(&mut self.frequency, hz, self.model.frequency_range());
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        assign_clamped(&mut self.amplitude, amplitude, AMPLITUDE_RANGE);
    }

    pub fn set_fluid_depth(&mut self, depth: f32) {
        assign_clamped(&mut self.fluid_depth, depth, FLUID_DEPTH_RANGE);
    }

    pub fn set_damping(&mut self, damping: f32) {
        assign_clamped(&mut self.damping, damping, DAMPING_RANGE);
    }

    pub fn set_particle_radius(&mut self, radius: f32) {
        assign_clamped(&mut self.particle_radius, radius, PARTICLE_RADIUS_RANGE);
    }

    pub fn set_mode_index(&mut self, index: usize) {
        self.mode_index = index.min(MODE_INDEX_MAX);
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    // Model frequency ranges barely overlap, so a switch takes the preset.
    pub fn set_model(&mut self, model: FieldModel) {
        if self.model != model {
            self.model = model;
            self.frequency = model.default_frequency();
        }
    }
}

pub(crate) fn assign_clamped(slot: &mut f32, value: f32, range: RangeInclusive<f32>) {
    if value.is_finite() {
        *slot = value.clamp(*range.start(), *range.end());
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
