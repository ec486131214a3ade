use crate::base::{DensityAverage, ParamFluid};
use crate::fv::{Model, SpatialParams, VolumeVariables};
use crate::material::{ModelMaterialLaw, RealDensity};
use crate::StrError;

/// Index of the wetting phase
pub const PHASE_W: usize = 0;

/// Index of the nonwetting phase
pub const PHASE_N: usize = 1;

/// Implements immiscible two-phase flow with the (pw, Sn) formulation
///
/// ```text
/// ∂(ρα φ Sα)/∂t − ∇·(ρα krα/μα K (∇pα − ρα g)) = qα      α = w, n
///
/// Sw = 1 − Sn      pn = pw + pc(Sw)
/// ```
pub struct TwoP {
    densities: [RealDensity; 2],
    viscosities: [f64; 2],
}

impl TwoP {
    /// Allocates a new instance
    pub fn new(wetting: &ParamFluid, nonwetting: &ParamFluid) -> Result<Self, StrError> {
        if wetting.viscosity <= 0.0 || nonwetting.viscosity <= 0.0 {
            return Err("the viscosity must be greater than zero");
        }
        Ok(TwoP {
            densities: [
                RealDensity::new(&wetting.density)?,
                RealDensity::new(&nonwetting.density)?,
            ],
            viscosities: [wetting.viscosity, nonwetting.viscosity],
        })
    }
}

impl Model for TwoP {
    fn num_eq(&self) -> usize {
        2
    }

    fn primary_variable_names(&self) -> &'static [&'static str] {
        &["pw", "Sn"]
    }

    fn density_average(&self) -> DensityAverage {
        DensityAverage::SaturationWeighted
    }

    fn update(
        &self,
        volvars: &mut VolumeVariables,
        primary: &[f64],
        spatial: &dyn SpatialParams,
        x: &[f64],
        extrusion: f64,
    ) -> Result<(), StrError> {
        let param = spatial
            .material_law_params_at_pos(x)
            .ok_or("material law parameters are required for two-phase flow")?;
        let law = ModelMaterialLaw::new(&param)?;
        let (pw, sn) = (primary[0], primary[1]);
        let sw = 1.0 - sn;
        let pn = pw + law.actual.pc(sw);
        let (swr, snr) = law.actual.residual_saturations();
        volvars.primary.copy_from_slice(&primary[0..2]);
        volvars.pressure[PHASE_W] = pw;
        volvars.pressure[PHASE_N] = pn;
        volvars.saturation[PHASE_W] = sw;
        volvars.saturation[PHASE_N] = sn;
        volvars.residual_saturation[PHASE_W] = swr;
        volvars.residual_saturation[PHASE_N] = snr;
        volvars.density[PHASE_W] = self.densities[PHASE_W].density(pw);
        volvars.density[PHASE_N] = self.densities[PHASE_N].density(pn);
        volvars.viscosity[PHASE_W] = self.viscosities[PHASE_W];
        volvars.viscosity[PHASE_N] = self.viscosities[PHASE_N];
        volvars.rel_perm[PHASE_W] = law.actual.krw(sw);
        volvars.rel_perm[PHASE_N] = law.actual.krn(sw);
        volvars.porosity = spatial.porosity_at_pos(x);
        volvars.permeability = spatial.permeability_at_pos(x);
        volvars.extrusion = extrusion;
        Ok(())
    }

    fn storage(&self, volvars: &VolumeVariables, storage: &mut [f64]) {
        for phase in [PHASE_W, PHASE_N] {
            storage[phase] = volvars.density[phase] * volvars.porosity * volvars.saturation[phase];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
