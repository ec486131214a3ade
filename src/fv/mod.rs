//! Implements the finite volume core: local residuals, assembly, Newton method, and time loop

mod assembler;
mod boundary_types;
mod cfl_evaluator;
mod flux_variables;
mod linear_system;
mod local_residual;
mod model;
mod newton_controller;
mod newton_method;
mod problem;
mod restart;
mod state;
mod time_loop;
mod volume_variables;
pub use crate::fv::assembler::*;
pub use crate::fv::boundary_types::*;
pub use crate::fv::cfl_evaluator::*;
pub use crate::fv::flux_variables::*;
pub use crate::fv::linear_system::*;
pub use crate::fv::local_residual::*;
pub use crate::fv::model::*;
pub use crate::fv::newton_controller::*;
pub use crate::fv::newton_method::*;
pub use crate::fv::problem::*;
pub use crate::fv::restart::*;
pub use crate::fv::state::*;
pub use crate::fv::time_loop::*;
pub use crate::fv::volume_variables::*;
