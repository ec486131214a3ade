//! Implements the physical models (one- and two-phase immiscible flow)

mod one_p;
mod two_p;
pub use crate::models::one_p::*;
pub use crate::models::two_p::*;
