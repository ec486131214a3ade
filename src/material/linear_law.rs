use super::MaterialLaw;
use crate::StrError;

/// Implements a linear capillary pressure law with linear relative permeabilities
///
/// ```text
/// pc  = entry_pc + (1 - Swe) (max_pc - entry_pc)
/// krw = Swe
/// krn = 1 - Swe
/// ```
pub struct ModelLinearLaw {
    entry_pc: f64,
    max_pc: f64,
    swr: f64,
    snr: f64,
}

impl ModelLinearLaw {
    /// Allocates a new instance
    pub fn new(entry_pc: f64, max_pc: f64, swr: f64, snr: f64) -> Result<Self, StrError> {
        if max_pc < entry_pc {
            return Err("max_pc must be ≥ entry_pc for the linear law");
        }
        if swr < 0.0 || snr < 0.0 || swr + snr >= 1.0 {
            return Err("residual saturations for the linear law are invalid");
        }
        Ok(ModelLinearLaw {
            entry_pc,
            max_pc,
            swr,
            snr,
        })
    }
}

impl MaterialLaw for ModelLinearLaw {
    fn effective_saturation(&self, sw: f64) -> f64 {
        (sw - self.swr) / (1.0 - self.swr - self.snr)
    }

    fn pc(&self, sw: f64) -> f64 {
        let swe = self.effective_saturation(sw);
        self.entry_pc + (1.0 - swe) * (self.max_pc - self.entry_pc)
    }

    fn krw(&self, sw: f64) -> f64 {
        f64::min(f64::max(self.effective_saturation(sw), 0.0), 1.0)
    }

    fn krn(&self, sw: f64) -> f64 {
        1.0 - self.krw(sw)
    }

    fn residual_saturations(&self) -> (f64, f64) {
        (self.swr, self.snr)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
