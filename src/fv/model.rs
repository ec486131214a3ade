use super::{SpatialParams, VolumeVariables};
use crate::base::DensityAverage;
use crate::StrError;

/// Defines the capabilities a physical model must provide to the finite volume core
///
/// Each equation is the mass balance of one fluid phase; thus `num_eq` is also the number
/// of phases and the flux of equation `i` is the advective flux of phase `i`.
pub trait Model {
    /// Returns the number of equations (and phases)
    fn num_eq(&self) -> usize;

    /// Returns the names of the primary variables
    fn primary_variable_names(&self) -> &'static [&'static str];

    /// Returns the method used to average densities at faces (gravity term)
    fn density_average(&self) -> DensityAverage;

    /// Computes the volume variables from the primary variables
    ///
    /// `x` is the position of the degree of freedom.
    fn update(
        &self,
        volvars: &mut VolumeVariables,
        primary: &[f64],
        spatial: &dyn SpatialParams,
        x: &[f64],
        extrusion: f64,
    ) -> Result<(), StrError>;

    /// Computes the conserved quantity per unit volume (one value per equation)
    ///
    /// This is a pure function of one set of volume variables.
    fn storage(&self, volvars: &VolumeVariables, storage: &mut [f64]);
}
