use serde::{Deserialize, Serialize};

/// Holds parameters for intrinsic (real) density
///
/// The density is `ρ = ρ₀ + C (p - p₀)`
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ParamRealDensity {
    /// Compressibility C = dρReal/dp (may be zero for incompressible fluids)
    pub cc: f64,

    /// Reference pressure p₀
    pub p_ref: f64,

    /// Reference intrinsic density ρReal₀
    pub rho_ref: f64,
}

/// Holds parameters for a fluid phase
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ParamFluid {
    /// Intrinsic density
    pub density: ParamRealDensity,

    /// Dynamic viscosity μ
    pub viscosity: f64,
}

/// Holds parameters for capillary-pressure and relative-permeability laws
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub enum ParamMaterialLaw {
    BrooksCorey {
        /// Entry pressure pd
        pd: f64,

        /// Pore-size distribution index λ
        lambda: f64,

        /// Residual saturation of the wetting phase
        swr: f64,

        /// Residual saturation of the nonwetting phase
        snr: f64,
    },
    Linear {
        /// Capillary pressure at full wetting saturation
        entry_pc: f64,

        /// Capillary pressure at residual wetting saturation
        max_pc: f64,

        /// Residual saturation of the wetting phase
        swr: f64,

        /// Residual saturation of the nonwetting phase
        snr: f64,
    },
}

impl ParamMaterialLaw {
    /// Returns the residual saturations (swr, snr)
    pub fn residual_saturations(&self) -> (f64, f64) {
        match self {
            ParamMaterialLaw::BrooksCorey { swr, snr, .. } => (*swr, *snr),
            ParamMaterialLaw::Linear { swr, snr, .. } => (*swr, *snr),
        }
    }
}

impl ParamFluid {
    /// Returns sample parameters for water (SI units)
    pub fn sample_water() -> Self {
        ParamFluid {
            density: ParamRealDensity {
                cc: 0.0,
                p_ref: 1e5,
                rho_ref: 1000.0,
            },
            viscosity: 1e-3,
        }
    }

    /// Returns sample parameters for a light oil (SI units)
    pub fn sample_oil() -> Self {
        ParamFluid {
            density: ParamRealDensity {
                cc: 0.0,
                p_ref: 1e5,
                rho_ref: 820.0,
            },
            viscosity: 5e-3,
        }
    }
}

impl ParamMaterialLaw {
    /// Returns sample Brooks-Corey parameters for a sand
    pub fn sample_brooks_corey() -> Self {
        ParamMaterialLaw::BrooksCorey {
            pd: 500.0,
            lambda: 2.0,
            swr: 0.05,
            snr: 0.0,
        }
    }
}
