use super::{Assembler, ElementVolumeVariables};
use crate::base::{BcKind, Partition, CFL_FLUX_SENTINEL, CFL_MIN_MOBILE_SATURATION, CFL_MIN_POROSITY};
use crate::base::CFL_VOLUME_SENTINEL;
use crate::StrError;
use russell_lab::Vector;

/// Evaluates the CFL criterion of an explicit saturation update in one cell
///
/// The volume fluxes across the faces of a cell are accumulated (inflow and outflow per phase),
/// scaled by the total relative permeability and a viscosity ratio. The CFL time step is then
///
/// ```text
/// cfl = min(volCorrIn / fluxIn, volCorrOut / fluxOut)
/// dt  = cfl φ V        (φ ignored if φ ≤ 1e-6)
/// ```
///
/// NaN or Inf accumulated fluxes are replaced by `1e-100`; non-positive volume correction
/// factors are replaced by `1e100`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CflEvaluator {
    flux_wetting_out: f64,
    flux_nonwetting_out: f64,
    flux_out: f64,
    flux_in: f64,
}

impl CflEvaluator {
    /// Allocates a new instance
    pub fn new() -> Self {
        CflEvaluator::default()
    }

    /// Clears the accumulated fluxes
    pub fn reset(&mut self) {
        self.flux_wetting_out = 0.0;
        self.flux_nonwetting_out = 0.0;
        self.flux_out = 0.0;
        self.flux_in = 0.0;
    }

    /// Adds a volume flux (positive when leaving the cell)
    ///
    /// `phase` is `Some(0)` (wetting), `Some(1)` (non-wetting), or `None` (total velocity).
    pub fn add_flux(
        &mut self,
        lambda_w: f64,
        lambda_n: f64,
        viscosity_w: f64,
        viscosity_n: f64,
        flux: f64,
        phase: Option<usize>,
    ) {
        let kr_sum = lambda_w * viscosity_w + lambda_n * viscosity_n;
        let viscosity_ratio = 1.0 - f64::abs(0.5 - viscosity_n / (viscosity_w + viscosity_n));
        let scaled = flux / (kr_sum * viscosity_ratio);
        if flux >= 0.0 {
            match phase {
                Some(0) => self.flux_wetting_out += scaled,
                Some(1) => self.flux_nonwetting_out += scaled,
                _ => self.flux_out += scaled,
            }
        } else if flux < 0.0 {
            self.flux_in -= scaled;
        }
    }

    /// Returns the accumulated inflow
    pub fn flux_in(&mut self) -> f64 {
        if !self.flux_in.is_finite() {
            self.flux_in = CFL_FLUX_SENTINEL;
        }
        self.flux_in
    }

    /// Returns the accumulated outflow of a phase (or the total outflow if `phase` is None)
    pub fn flux_out(&mut self, phase: Option<usize>) -> f64 {
        if !self.flux_wetting_out.is_finite() {
            self.flux_wetting_out = CFL_FLUX_SENTINEL;
        }
        if !self.flux_nonwetting_out.is_finite() {
            self.flux_nonwetting_out = CFL_FLUX_SENTINEL;
        }
        if !self.flux_out.is_finite() {
            self.flux_out = CFL_FLUX_SENTINEL;
        }
        match phase {
            Some(0) => self.flux_wetting_out,
            Some(1) => self.flux_nonwetting_out,
            _ => self.flux_out,
        }
    }

    /// Returns the CFL flux function
    ///
    /// `total_velocity` selects the total outflow instead of the phase outflows.
    pub fn cfl_flux_function(&mut self, sat_w: f64, residual_w: f64, residual_n: f64, total_velocity: bool) -> f64 {
        let volume_correction = 1.0 - residual_w - residual_n;
        let mut volume_correction_out_w = f64::max(sat_w - residual_w, CFL_MIN_MOBILE_SATURATION);
        let mut volume_correction_out_n = f64::max(1.0 - sat_w - residual_n, CFL_MIN_MOBILE_SATURATION);
        if volume_correction_out_w <= 0.0 {
            volume_correction_out_w = CFL_VOLUME_SENTINEL;
        }
        if volume_correction_out_n <= 0.0 {
            volume_correction_out_n = CFL_VOLUME_SENTINEL;
        }
        let cfl_in = volume_correction / self.flux_in();
        let cfl_out = if total_velocity {
            volume_correction / self.flux_out(None)
        } else {
            f64::min(
                volume_correction_out_w / self.flux_out(Some(0)),
                volume_correction_out_n / self.flux_out(Some(1)),
            )
        };
        f64::min(cfl_in, cfl_out)
    }

    /// Returns the CFL time step of the cell
    pub fn get_dt(
        &mut self,
        sat_w: f64,
        residual_w: f64,
        residual_n: f64,
        porosity: f64,
        volume: f64,
        total_velocity: bool,
    ) -> f64 {
        let cfl = self.cfl_flux_function(sat_w, residual_w, residual_n, total_velocity);
        if porosity > CFL_MIN_POROSITY {
            cfl * porosity * volume
        } else {
            cfl * volume
        }
    }
}

/// Returns the CFL time step of the whole grid
///
/// The volume flux of each phase across each face is the mass flux divided by the phase
/// density of the inside cell. Only cell-centered methods are supported. The result is the
/// minimum over all owned cells multiplied by `cfl_factor`.
pub fn cfl_time_step_size(assembler: &Assembler, uu: &Vector, cfl_factor: f64) -> Result<f64, StrError> {
    let residual = &assembler.residual;
    let grid = residual.grid;
    if grid.vertex_centered() {
        return Err("the CFL evaluation requires a cell-centered method");
    }
    let nphase = residual.num_eq();
    if nphase > 2 {
        return Err("the CFL evaluation supports at most two phases");
    }
    let volvars = assembler.volume_variables(uu)?;
    let elem = ElementVolumeVariables::new(&volvars);
    let mut evaluator = CflEvaluator::new();
    let mut values = vec![0.0; nphase];
    let mut dt_min = f64::MAX;
    for e in 0..grid.n_element() {
        if grid.partition(e) != Partition::Interior {
            continue;
        }
        let scv = grid.scv(grid.element_scvs(e)[0]);
        let vv = elem.get(scv.dof);
        let (lambda_w, viscosity_w) = (vv.mobility(0), vv.viscosity[0]);
        let (lambda_n, viscosity_n) = if nphase == 2 {
            (vv.mobility(1), vv.viscosity[1])
        } else {
            (0.0, viscosity_w)
        };
        evaluator.reset();
        for f in grid.element_scvfs(e) {
            let scvf = grid.scvf(*f);
            let bc = if scvf.boundary {
                residual.bc_types[*f].as_ref()
            } else {
                None
            };
            let boundary = match bc {
                Some(bc) if bc.has_dirichlet() => Some(residual.boundary_volvars(*f, vv)?),
                _ => None,
            };
            if let Some(bc) = bc {
                if bc.has_neumann() {
                    values.fill(0.0);
                    residual.problem.neumann(&mut values, scvf, vv);
                }
            }
            for phase in 0..nphase {
                let mass_flux = match bc.map(|bc| bc.kind(phase)) {
                    None => residual.advective_flux(scvf, phase, &elem, None)?,
                    Some(BcKind::Dirichlet) => residual.advective_flux(scvf, phase, &elem, boundary.as_deref())?,
                    Some(BcKind::Neumann) => values[phase] * scvf.area * vv.extrusion,
                    Some(BcKind::Outflow) => residual.outflow_flux(scvf, phase, &elem)?,
                };
                let flux = mass_flux / vv.density[phase];
                evaluator.add_flux(lambda_w, lambda_n, viscosity_w, viscosity_n, flux, Some(phase));
            }
        }
        let (residual_w, residual_n) = if nphase == 2 {
            (vv.residual_saturation[0], vv.residual_saturation[1])
        } else {
            (vv.residual_saturation[0], 0.0)
        };
        let dt = evaluator.get_dt(
            vv.saturation[0],
            residual_w,
            residual_n,
            vv.porosity,
            scv.volume * vv.extrusion,
            false,
        );
        dt_min = f64::min(dt_min, dt);
    }
    Ok(cfl_factor * dt_min)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
