//! Implements the base structures for a finite volume simulation

mod config;
mod constants;
mod enums;
mod param_newton;
mod parameters;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::param_newton::*;
pub use crate::base::parameters::*;
