use crate::base::ParamRealDensity;
use crate::StrError;

/// Implements a model for fluid intrinsic density
///
/// ```text
/// ρ = ρ₀ + C (p - p₀)
/// ```
pub struct RealDensity {
    cc: f64,      // compressibility C = dρReal/dp
    p_ref: f64,   // reference pressure p₀
    rho_ref: f64, // reference intrinsic density ρReal₀
}

impl RealDensity {
    /// Allocates a new instance
    pub fn new(param: &ParamRealDensity) -> Result<Self, StrError> {
        if param.cc < 0.0 {
            return Err("compressibility constant must be ≥ 0.0");
        }
        if param.rho_ref <= 0.0 {
            return Err("reference intrinsic density must be greater than zero");
        }
        Ok(RealDensity {
            cc: param.cc,
            p_ref: param.p_ref,
            rho_ref: param.rho_ref,
        })
    }

    /// Calculates the intrinsic density for a given pressure
    pub fn density(&self, p: f64) -> f64 {
        self.rho_ref + self.cc * (p - self.p_ref)
    }

    /// Returns the compressibility C = dρReal/dp
    pub fn compressibility(&self) -> f64 {
        self.cc
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::RealDensity;
    use crate::base::ParamRealDensity;
    use crate::StrError;
    use russell_lab::approx_eq;

    #[test]
    fn captures_wrong_input() {
        assert_eq!(
            RealDensity::new(&ParamRealDensity {
                cc: -1.0,
                p_ref: 0.0,
                rho_ref: 0.0,
            })
            .err(),
            Some("compressibility constant must be ≥ 0.0")
        );
        assert_eq!(
            RealDensity::new(&ParamRealDensity {
                cc: 0.01,
                p_ref: 0.0,
                rho_ref: 0.0,
            })
            .err(),
            Some("reference intrinsic density must be greater than zero")
        );
    }

    #[test]
    fn density_works() -> Result<(), StrError> {
        let model = RealDensity::new(&ParamRealDensity {
            cc: 4.5e-7,
            p_ref: 1e5,
            rho_ref: 1000.0,
        })?;
        assert_eq!(model.density(1e5), 1000.0);
        approx_eq(model.density(2e5), 1000.045, 1e-12);
        assert_eq!(model.compressibility(), 4.5e-7);
        Ok(())
    }
}
