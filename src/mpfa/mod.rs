//! Implements the multi-point flux approximation (MPFA-O) on interaction volumes

mod dim_helper;
mod interaction_regions;
mod interaction_volume;
mod local_assembler;
pub use crate::mpfa::dim_helper::*;
pub use crate::mpfa::interaction_regions::*;
pub use crate::mpfa::interaction_volume::*;
pub use crate::mpfa::local_assembler::*;
