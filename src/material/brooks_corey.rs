use super::MaterialLaw;
use crate::StrError;

/// Effective saturation below which the capillary pressure is linearly extrapolated
const LOW_SWE: f64 = 0.01;

/// Implements the regularized Brooks-Corey law
///
/// ```text
/// Swe = (Sw - Swr) / (1 - Swr - Snr)
/// pc  = pd Swe^(-1/λ)
/// krw = Swe^((2 + 3λ)/λ)
/// krn = (1 - Swe)² (1 - Swe^((2 + λ)/λ))
/// ```
///
/// The capillary pressure is linearly extrapolated for `Swe < 0.01` and `Swe > 1`;
/// the relative permeabilities use the effective saturation clamped to `[0, 1]`.
///
/// # Reference
///
/// * Brooks RH, Corey AT (1964) Hydraulic properties of porous media,
///   Hydrology Papers 3, Colorado State University
pub struct ModelBrooksCorey {
    pd: f64,     // entry pressure
    lambda: f64, // pore-size distribution index
    swr: f64,    // residual wetting saturation
    snr: f64,    // residual nonwetting saturation
}

impl ModelBrooksCorey {
    /// Allocates a new instance
    pub fn new(pd: f64, lambda: f64, swr: f64, snr: f64) -> Result<Self, StrError> {
        if pd <= 0.0 {
            return Err("pd parameter for the Brooks-Corey law is invalid");
        }
        if lambda <= 0.0 {
            return Err("lambda parameter for the Brooks-Corey law is invalid");
        }
        if swr < 0.0 || snr < 0.0 || swr + snr >= 1.0 {
            return Err("residual saturations for the Brooks-Corey law are invalid");
        }
        Ok(ModelBrooksCorey { pd, lambda, swr, snr })
    }

    fn pc_raw(&self, swe: f64) -> f64 {
        self.pd * f64::powf(swe, -1.0 / self.lambda)
    }

    fn dpc_dswe_raw(&self, swe: f64) -> f64 {
        -self.pd / self.lambda * f64::powf(swe, -1.0 / self.lambda - 1.0)
    }
}

impl MaterialLaw for ModelBrooksCorey {
    fn effective_saturation(&self, sw: f64) -> f64 {
        (sw - self.swr) / (1.0 - self.swr - self.snr)
    }

    fn pc(&self, sw: f64) -> f64 {
        let swe = self.effective_saturation(sw);
        if swe < LOW_SWE {
            self.pc_raw(LOW_SWE) + self.dpc_dswe_raw(LOW_SWE) * (swe - LOW_SWE)
        } else if swe > 1.0 {
            self.pd + self.dpc_dswe_raw(1.0) * (swe - 1.0)
        } else {
            self.pc_raw(swe)
        }
    }

    fn krw(&self, sw: f64) -> f64 {
        let swe = f64::min(f64::max(self.effective_saturation(sw), 0.0), 1.0);
        f64::powf(swe, (2.0 + 3.0 * self.lambda) / self.lambda)
    }

    fn krn(&self, sw: f64) -> f64 {
        let swe = f64::min(f64::max(self.effective_saturation(sw), 0.0), 1.0);
        let exponent = (2.0 + self.lambda) / self.lambda;
        (1.0 - swe) * (1.0 - swe) * (1.0 - f64::powf(swe, exponent))
    }

    fn residual_saturations(&self) -> (f64, f64) {
        (self.swr, self.snr)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
