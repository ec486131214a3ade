//! Implements material laws as pure functions of the local state

mod brooks_corey;
mod linear_law;
mod model_material_law;
mod real_density;
pub use crate::material::brooks_corey::*;
pub use crate::material::linear_law::*;
pub use crate::material::model_material_law::*;
pub use crate::material::real_density::*;
