use pmflow::prelude::*;
use pmflow::StrError;
use russell_lab::approx_eq;

const LENGTH: f64 = 10.0;
const RATE: f64 = 1e-2; // kg/(m²·s)
const POROSITY: f64 = 0.2;

/// Oil injected at the left side of a water-saturated strip; the right side is held at pw = 1e5, Sn = 0
struct OilInjection {
    spatial: HomogeneousSpatialParams,
}

impl Problem for OilInjection {
    fn spatial_params(&self) -> &dyn SpatialParams {
        &self.spatial
    }
    fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
        if x[0] > LENGTH - 1e-8 {
            bc.set_all_dirichlet();
        } else {
            bc.set_all_neumann();
        }
    }
    fn dirichlet_at_pos(&self, values: &mut [f64], _x: &[f64]) -> Result<(), StrError> {
        values[0] = 1e5;
        values[1] = 0.0;
        Ok(())
    }
    fn neumann_at_pos(&self, values: &mut [f64], x: &[f64]) {
        if x[0] < 1e-8 {
            values[1] = -RATE;
        }
    }
    fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
        values[0] = 1e5;
        values[1] = 0.0;
    }
}

fn problem() -> OilInjection {
    let mut spatial = HomogeneousSpatialParams::new_isotropic(2, 1e-11, POROSITY);
    spatial.set_material_law(ParamMaterialLaw::sample_brooks_corey());
    OilInjection { spatial }
}

/// Returns the oil mass stored in the domain
fn oil_mass(grid: &FvGrid, state: &State) -> f64 {
    let rho_n = ParamFluid::sample_oil().density.rho_ref;
    (0..grid.n_scv())
        .map(|s| {
            let scv = grid.scv(s);
            rho_n * POROSITY * state.uu[scv.dof * 2 + 1] * scv.volume
        })
        .sum()
}

fn inject(grid: &FvGrid, method: Method, t_fin: f64) -> Result<State, StrError> {
    let problem = problem();
    let model = TwoP::new(&ParamFluid::sample_water(), &ParamFluid::sample_oil())?;
    let mut config = Config::new(2);
    config
        .set_method(method)?
        .set_time(0.0, t_fin, 100.0)?
        .set_dt_bounds(1e-3, 2e3)?;
    let assembler = Assembler::new(LocalResidual::new(grid, &problem, &model, &config)?)?;
    let mut state = State::new(&assembler)?;
    let mut time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);
    time_loop.run(&mut state)?;
    Ok(state)
}

fn check_mass_balance(grid: &FvGrid, method: Method) -> Result<(), StrError> {
    let t_fin = 1e4;
    let state = inject(grid, method, t_fin)?;
    approx_eq(state.t, t_fin, 1e-6);

    // the front is far from the right side, hence all injected oil is still in the domain
    let injected = RATE * 1.0 * t_fin;
    let stored = oil_mass(grid, &state);
    approx_eq(stored / injected, 1.0, 1e-4);

    // oil accumulates near the injection side
    let n = grid.n_dof();
    let (mut sn_left, mut sn_right) = (0.0, 0.0);
    for dof in 0..n {
        let x = grid.dof_position(dof)[0];
        let sn = state.uu[dof * 2 + 1];
        if x < 2.0 {
            sn_left = f64::max(sn_left, sn);
        } else if x > 8.0 {
            sn_right = f64::max(sn_right, sn);
        }
    }
    assert!(sn_left > 0.05);
    assert!(sn_right < 0.1 * sn_left);
    Ok(())
}

#[test]
fn injected_oil_is_conserved_with_tpfa() -> Result<(), StrError> {
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(10, 1, LENGTH, 1.0))?;
    check_mass_balance(&grid, Method::CcTpfa)
}

#[test]
fn injected_oil_is_conserved_with_mpfa() -> Result<(), StrError> {
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(10, 1, LENGTH, 1.0))?;
    check_mass_balance(&grid, Method::CcMpfa)
}

#[test]
fn injected_oil_is_conserved_with_box() -> Result<(), StrError> {
    let grid = FvGrid::new_box(&SampleMeshes::structured_triangles(10, 1, LENGTH, 1.0))?;
    check_mass_balance(&grid, Method::Box)
}

#[test]
fn cfl_time_step_is_positive_after_injection() -> Result<(), StrError> {
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(10, 1, LENGTH, 1.0))?;
    let problem = problem();
    let model = TwoP::new(&ParamFluid::sample_water(), &ParamFluid::sample_oil())?;
    let state = inject(&grid, Method::CcTpfa, 2e3)?;
    let config = Config::new(2);
    let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
    let dt = cfl_time_step_size(&assembler, &state.uu, 0.95)?;
    assert!(dt > 0.0 && dt.is_finite());
    Ok(())
}
