//! Makes available common structures needed to run a simulation
//!
//! You may write `use pmflow::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{BcKind, Config, DensityAverage, Method, ParamNewton, Partition, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::base::{ParamFluid, ParamMaterialLaw, ParamRealDensity};
pub use crate::fv::{cfl_time_step_size, read_restart, write_restart, CflEvaluator};
pub use crate::fv::{Assembler, BoundaryTypes, HomogeneousSpatialParams, LocalResidual, Model, Problem, SpatialParams};
pub use crate::fv::{Communication, NewtonController, NewtonMethod, SerialCommunication, State, TimeLoop};
pub use crate::fv::{upstream_is_inside, upwind, DirectSolver, ElementVolumeVariables, LinearSolverBackend, VolumeVariables};
pub use crate::geometry::{FvGrid, GridGeometry, Mesh, SampleMeshes};
pub use crate::models::{OneP, TwoP};
