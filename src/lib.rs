//! Pmflow: finite volume core for porous media flow
//!
//! This crate implements the machinery that turns a conservation law into per-control-volume
//! storage, flux, and source residuals; assembles the global residual and Jacobian using
//! two-point (TPFA), multi-point (MPFA-O), or vertex-centered (Box) flux stencils; and drives
//! the solution with a Newton method and an adaptive time loop.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod fv;
pub mod geometry;
pub mod material;
pub mod models;
pub mod mpfa;
pub mod prelude;
