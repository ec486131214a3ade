use pmflow::prelude::*;
use pmflow::StrError;
use russell_lab::approx_eq;

/// Linear pressure drop across the unit square: p = 2e5 − 1e5 x
struct PressureDrop {
    spatial: HomogeneousSpatialParams,
}

impl Problem for PressureDrop {
    fn spatial_params(&self) -> &dyn SpatialParams {
        &self.spatial
    }
    fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
        if x[0] < 1e-8 || x[0] > 1.0 - 1e-8 {
            bc.set_all_dirichlet();
        } else {
            bc.set_all_neumann();
        }
    }
    fn dirichlet_at_pos(&self, values: &mut [f64], x: &[f64]) -> Result<(), StrError> {
        values[0] = 2e5 - 1e5 * x[0];
        Ok(())
    }
    fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
        values[0] = 1e5;
    }
}

fn solve(grid: &FvGrid, method: Method, stationary: bool) -> Result<State, StrError> {
    let problem = PressureDrop {
        spatial: HomogeneousSpatialParams::new_isotropic(2, 1e-12, 0.2),
    };
    let model = OneP::new(&ParamFluid::sample_water())?;
    let mut config = Config::new(2);
    config.set_method(method)?.set_stationary(stationary)?;
    if !stationary {
        config.set_time(0.0, 1e3, 10.0)?;
    }
    let assembler = Assembler::new(LocalResidual::new(grid, &problem, &model, &config)?)?;
    let mut state = State::new(&assembler)?;
    let mut time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);
    time_loop.run(&mut state)?;
    Ok(state)
}

fn check_linear(grid: &FvGrid, state: &State) {
    for dof in 0..grid.n_dof() {
        let x = grid.dof_position(dof)[0];
        approx_eq(state.uu[dof], 2e5 - 1e5 * x, 1e-5);
    }
}

#[test]
fn stationary_pressure_is_linear_with_all_methods() -> Result<(), StrError> {
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(4, 3, 1.0, 1.0))?;
    check_linear(&grid, &solve(&grid, Method::CcTpfa, true)?);

    let grid = FvGrid::new_cell_centered(&SampleMeshes::distorted_quads())?;
    check_linear(&grid, &solve(&grid, Method::CcMpfa, true)?);

    let grid = FvGrid::new_box(&SampleMeshes::structured_triangles(4, 3, 1.0, 1.0))?;
    check_linear(&grid, &solve(&grid, Method::Box, true)?);
    Ok(())
}

#[test]
fn incompressible_transient_run_reaches_the_steady_state() -> Result<(), StrError> {
    // without compressibility the storage term vanishes and each step is a stationary solve
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(3, 3, 1.0, 1.0))?;
    let state = solve(&grid, Method::CcTpfa, false)?;
    approx_eq(state.t, 1e3, 1e-9);
    assert!(state.timestep > 0);
    check_linear(&grid, &state);

    let grid = FvGrid::new_box(&SampleMeshes::structured_triangles(3, 3, 1.0, 1.0))?;
    let state = solve(&grid, Method::Box, false)?;
    approx_eq(state.t, 1e3, 1e-9);
    check_linear(&grid, &state);
    Ok(())
}

#[test]
fn mismatched_method_and_grid_are_captured() -> Result<(), StrError> {
    let grid = FvGrid::new_box(&SampleMeshes::structured_triangles(2, 2, 1.0, 1.0))?;
    assert_eq!(
        solve(&grid, Method::CcTpfa, true).err(),
        Some("the discretization method does not match the grid")
    );
    Ok(())
}
