use super::{ModelBrooksCorey, ModelLinearLaw};
use crate::base::ParamMaterialLaw;
use crate::StrError;

/// Defines a trait for capillary pressure and relative permeability laws
///
/// All functions take the wetting-phase saturation `Sw`.
pub trait MaterialLaw {
    /// Returns the effective wetting saturation (not clamped)
    fn effective_saturation(&self, sw: f64) -> f64;

    /// Calculates the capillary pressure pc = pn - pw
    fn pc(&self, sw: f64) -> f64;

    /// Calculates the relative permeability of the wetting phase
    fn krw(&self, sw: f64) -> f64;

    /// Calculates the relative permeability of the nonwetting phase
    fn krn(&self, sw: f64) -> f64;

    /// Returns the residual saturations (swr, snr)
    fn residual_saturations(&self) -> (f64, f64);
}

/// Implements a model for capillary pressure and relative permeabilities
pub struct ModelMaterialLaw {
    /// Holds the actual model
    pub actual: Box<dyn MaterialLaw>,
}

impl ModelMaterialLaw {
    /// Allocates a new instance
    pub fn new(param: &ParamMaterialLaw) -> Result<Self, StrError> {
        let actual: Box<dyn MaterialLaw> = match *param {
            ParamMaterialLaw::BrooksCorey { pd, lambda, swr, snr } => {
                Box::new(ModelBrooksCorey::new(pd, lambda, swr, snr)?)
            }
            ParamMaterialLaw::Linear {
                entry_pc,
                max_pc,
                swr,
                snr,
            } => Box::new(ModelLinearLaw::new(entry_pc, max_pc, swr, snr)?),
        };
        Ok(ModelMaterialLaw { actual })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ModelMaterialLaw;
    use crate::base::ParamMaterialLaw;
    use crate::StrError;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let model = ModelMaterialLaw::new(&ParamMaterialLaw::sample_brooks_corey())?;
        assert_eq!(model.actual.residual_saturations(), (0.05, 0.0));
        let param = ParamMaterialLaw::Linear {
            entry_pc: 0.0,
            max_pc: 100.0,
            swr: 0.0,
            snr: 0.0,
        };
        let model = ModelMaterialLaw::new(&param)?;
        assert_eq!(model.actual.pc(0.0), 100.0);
        Ok(())
    }
}
