use crate::base::{DensityAverage, ParamFluid};
use crate::fv::{Model, SpatialParams, VolumeVariables};
use crate::material::RealDensity;
use crate::StrError;

/// Implements single-phase flow with the pressure as primary variable
///
/// ```text
/// ∂(ρ φ)/∂t − ∇·(ρ/μ K (∇p − ρ g)) = q
/// ```
pub struct OneP {
    density: RealDensity,
    viscosity: f64,
}

impl OneP {
    /// Allocates a new instance
    pub fn new(fluid: &ParamFluid) -> Result<Self, StrError> {
        if fluid.viscosity <= 0.0 {
            return Err("the viscosity must be greater than zero");
        }
        Ok(OneP {
            density: RealDensity::new(&fluid.density)?,
            viscosity: fluid.viscosity,
        })
    }
}

impl Model for OneP {
    fn num_eq(&self) -> usize {
        1
    }

    fn primary_variable_names(&self) -> &'static [&'static str] {
        &["p"]
    }

    fn density_average(&self) -> DensityAverage {
        DensityAverage::Arithmetic
    }

    fn update(
        &self,
        volvars: &mut VolumeVariables,
        primary: &[f64],
        spatial: &dyn SpatialParams,
        x: &[f64],
        extrusion: f64,
    ) -> Result<(), StrError> {
        let p = primary[0];
        volvars.primary[0] = p;
        volvars.pressure[0] = p;
        volvars.saturation[0] = 1.0;
        volvars.residual_saturation[0] = 0.0;
        volvars.density[0] = self.density.density(p);
        volvars.viscosity[0] = self.viscosity;
        volvars.rel_perm[0] = 1.0;
        volvars.porosity = spatial.porosity_at_pos(x);
        volvars.permeability = spatial.permeability_at_pos(x);
        volvars.extrusion = extrusion;
        Ok(())
    }

    fn storage(&self, volvars: &VolumeVariables, storage: &mut [f64]) {
        storage[0] = volvars.density[0] * volvars.porosity;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
