pub mod app;
pub mod audio_engine;
pub mod config;
pub mod error;
pub mod export;
pub mod field;
pub mod geometry;
pub mod particles;
pub mod raster;
pub mod scheduler;
pub mod session;
pub mod special;
pub mod types;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use field::{evaluate, FieldParams, FrameSnapshot};
pub use particles::{Particle, ParticleDynamics, ParticleSystem};
pub use scheduler::{AnimationState, FrameScheduler, RunState, SchedulerSettings};
pub use session::{FrameOutput, Session};
pub use types::{FieldModel, Shape, SimulationParams};
