use super::{Assembler, DirectSolver, LinearSolverBackend, LinearSystem, NewtonController, State};
use crate::base::LINE_SEARCH_MIN_LAMBDA;
use crate::StrError;
use russell_lab::{vec_norm, Norm, Stopwatch, Vector};

/// Holds the accumulated wall-clock times of the Newton method (nanoseconds)
#[derive(Clone, Copy, Debug, Default)]
pub struct NewtonTimings {
    /// Time spent assembling the linear system
    pub assemble: u128,

    /// Time spent solving the linear system
    pub solve: u128,

    /// Time spent updating the primary variables (including the line search)
    pub update: u128,
}

/// Implements the Newton method for the nonlinear system R(u) = 0 of one time step
///
/// Each iteration assembles the Jacobian K and the residual R at the last iterate, solves
/// `K mdu = R`, and updates `u ← u_last − λ mdu` with `λ = 1` or, with line search, the
/// first `λ ∈ {1, ½, ¼, ⅛}` that reduces the residual below the reduction of the previous
/// iteration.
///
/// Linear solver errors and non-finite values are recoverable: the solve is marked as failed
/// and `execute` returns `Ok(false)` with the primary variables reset to the last accepted
/// solution.
pub struct NewtonMethod<'a> {
    /// Global assembler
    pub assembler: Assembler<'a>,

    /// Convergence control
    pub controller: NewtonController,

    /// Global linear system
    pub linear_system: LinearSystem,

    /// Linear solver
    solver: Box<dyn LinearSolverBackend + 'a>,

    /// Accumulated timings
    timings: NewtonTimings,
}

impl<'a> NewtonMethod<'a> {
    /// Allocates a new instance with the direct solver selected in the configuration
    pub fn new(assembler: Assembler<'a>) -> Result<Self, StrError> {
        let solver = DirectSolver::new(assembler.residual.config.lin_sol_genie)?;
        NewtonMethod::with_solver(assembler, Box::new(solver))
    }

    /// Allocates a new instance with a given linear solver
    pub fn with_solver(assembler: Assembler<'a>, solver: Box<dyn LinearSolverBackend + 'a>) -> Result<Self, StrError> {
        let config = assembler.residual.config;
        if let Some(msg) = config.validate() {
            log::error!("{}", msg);
            return Err("cannot allocate Newton method because config.validate() failed");
        }
        let controller = NewtonController::new(&config.newton, config.verbose_iterations);
        let linear_system = assembler.new_linear_system()?;
        Ok(NewtonMethod {
            assembler,
            controller,
            linear_system,
            solver,
            timings: NewtonTimings::default(),
        })
    }

    /// Returns the accumulated timings
    pub fn timings(&self) -> NewtonTimings {
        self.timings
    }

    /// Solves the nonlinear system at the time `state.t` with time step `state.dt`
    ///
    /// `state.uu` holds the initial guess and receives the solution; `state.uu_old` holds the
    /// solution at the previous time (ignored by stationary problems).
    ///
    /// Returns `Ok(true)` if converged and `Ok(false)` if the solve failed in a recoverable
    /// way (in which case `state.uu` is reset to `state.uu_old`).
    pub fn execute(&mut self, state: &mut State) -> Result<bool, StrError> {
        let config = self.assembler.residual.config;
        let prev = if config.stationary {
            None
        } else {
            Some(self.assembler.volume_variables(&state.uu_old)?)
        };
        let dt = if config.stationary { 1.0 } else { state.dt };
        let verbose_lin_sys = config.verbose_lin_sys_solve;

        let mut stopwatch = Stopwatch::new();
        self.controller.newton_begin();
        while self.controller.newton_proceed() {
            self.controller.newton_begin_step();
            let u_last = state.uu.clone();

            // assemble
            stopwatch.reset();
            let res = self.assembler.assemble(
                &mut self.linear_system.kk,
                &mut self.linear_system.rr,
                &state.uu,
                prev.as_deref(),
                dt,
            );
            self.timings.assemble += stopwatch.stop();
            if let Err(e) = res {
                log::warn!("cannot assemble the linear system: {}", e);
                return Ok(self.fail(state));
            }
            if self.controller.num_steps() == 0 {
                self.controller
                    .set_initial_residual(vec_norm(&self.linear_system.rr, Norm::Euc));
            }

            // solve K mdu = R
            stopwatch.reset();
            let res = self.solver.solve(
                &mut self.linear_system.mdu,
                &mut self.linear_system.kk,
                &self.linear_system.rr,
                verbose_lin_sys,
            );
            self.timings.solve += stopwatch.stop();
            if let Err(e) = res {
                log::warn!("cannot solve the linear system: {}", e);
                return Ok(self.fail(state));
            }

            // update
            stopwatch.reset();
            let res = self.newton_update(state, &u_last, prev.as_deref(), dt);
            self.timings.update += stopwatch.stop();
            if let Err(e) = res {
                log::warn!("cannot update the primary variables: {}", e);
                return Ok(self.fail(state));
            }
            self.controller.update_shift(&u_last, &state.uu);
            if !self.controller.shift().is_finite() {
                log::warn!("the relative shift is not finite");
                return Ok(self.fail(state));
            }
            self.controller.newton_end_step();
        }
        self.controller.newton_end();

        if self.controller.newton_converged() {
            self.controller.newton_succeed();
            Ok(true)
        } else {
            Ok(self.fail(state))
        }
    }

    /// Computes the new iterate from `u_last` and the solution of the linear system
    fn newton_update(
        &mut self,
        state: &mut State,
        u_last: &Vector,
        prev: Option<&[super::VolumeVariables]>,
        dt: f64,
    ) -> Result<(), StrError> {
        let mdu = &self.linear_system.mdu;
        if mdu.as_data().iter().any(|v| !v.is_finite()) {
            return Err("the solution of the linear system contains NaN or Inf");
        }
        if self.controller.param().use_line_search {
            return self.line_search(state, u_last, prev, dt);
        }
        for i in 0..state.uu.dim() {
            state.uu[i] = u_last[i] - mdu[i];
        }
        if self.controller.needs_residual() {
            let mut rr = Vector::new(self.linear_system.n_equation);
            self.assembler.assemble_residual(&mut rr, &state.uu, prev, dt)?;
            self.controller.set_residual(vec_norm(&rr, Norm::Euc));
        }
        Ok(())
    }

    /// Halves the step length until the residual reduction improves (or λ reaches its minimum)
    fn line_search(
        &mut self,
        state: &mut State,
        u_last: &Vector,
        prev: Option<&[super::VolumeVariables]>,
        dt: f64,
    ) -> Result<(), StrError> {
        let mdu = &self.linear_system.mdu;
        let last_reduction = self.controller.last_reduction();
        let mut rr = Vector::new(self.linear_system.n_equation);
        let mut lambda = 1.0;
        loop {
            for i in 0..state.uu.dim() {
                state.uu[i] = u_last[i] - lambda * mdu[i];
            }
            self.assembler.assemble_residual(&mut rr, &state.uu, prev, dt)?;
            self.controller.set_residual(vec_norm(&rr, Norm::Euc));
            if self.controller.reduction() < last_reduction || lambda <= LINE_SEARCH_MIN_LAMBDA {
                break;
            }
            lambda /= 2.0;
        }
        log::debug!("line search: λ = {}", lambda);
        Ok(())
    }

    /// Marks the solve as failed and restores the last accepted solution
    fn fail(&mut self, state: &mut State) -> bool {
        self.controller.newton_fail();
        state.uu.as_mut_data().copy_from_slice(state.uu_old.as_data());
        false
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::NewtonMethod;
    use crate::base::{Config, ParamFluid};
    use crate::fv::{Assembler, BoundaryTypes, HomogeneousSpatialParams, LinearSolverBackend, LocalResidual};
    use crate::fv::{Problem, SpatialParams, State};
    use crate::geometry::{FvGrid, SampleMeshes};
    use crate::models::OneP;
    use crate::StrError;
    use russell_lab::{vec_approx_eq, Vector};
    use russell_sparse::SparseMatrix;

    struct Column {
        spatial: HomogeneousSpatialParams,
    }

    impl Problem for Column {
        fn spatial_params(&self) -> &dyn SpatialParams {
            &self.spatial
        }
        fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
            if x[0] < 1e-10 || x[0] > 3.0 - 1e-10 {
                bc.set_all_dirichlet();
            }
        }
        fn dirichlet_at_pos(&self, values: &mut [f64], x: &[f64]) -> Result<(), StrError> {
            values[0] = 2e5 - x[0] * 1e5 / 3.0;
            Ok(())
        }
        fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
            values[0] = 1e5;
        }
    }

    fn column() -> Column {
        Column {
            spatial: HomogeneousSpatialParams::new_isotropic(1, 1e-12, 0.2),
        }
    }

    struct FailingSolver {}

    impl LinearSolverBackend for FailingSolver {
        fn solve(&mut self, _: &mut Vector, _: &mut SparseMatrix, _: &Vector, _: bool) -> Result<(), StrError> {
            Err("the matrix is singular")
        }
    }

    #[test]
    fn execute_solves_linear_problem() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(3, 3.0))?;
        let mut config = Config::new(1);
        config.set_stationary(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let mut newton = NewtonMethod::new(assembler)?;
        assert!(newton.execute(&mut state)?);
        let correct = Vector::from(&[2e5 - 0.5e5 / 3.0, 1.5e5, 1e5 + 0.5e5 / 3.0]);
        vec_approx_eq(state.uu.as_data(), correct.as_data(), 1e-6);
        assert_eq!(newton.controller.num_steps(), 2);
        Ok(())
    }

    #[test]
    fn execute_is_idempotent_at_the_solution() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(3, 3.0))?;
        let mut config = Config::new(1);
        config.set_stationary(true)?;
        config.newton.enable_residual_criterion = true;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let correct = Vector::from(&[2e5 - 0.5e5 / 3.0, 1.5e5, 1e5 + 0.5e5 / 3.0]);
        state.uu = correct.clone();
        state.uu_old = correct.clone();
        let mut newton = NewtonMethod::new(assembler)?;
        assert!(newton.execute(&mut state)?);
        vec_approx_eq(state.uu.as_data(), correct.as_data(), 1e-8);
        assert!(newton.controller.shift() < 1e-12);
        Ok(())
    }

    #[test]
    fn execute_with_line_search_works() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(3, 3.0))?;
        let mut config = Config::new(1);
        config.set_stationary(true)?;
        config.newton.use_line_search = true;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let mut newton = NewtonMethod::new(assembler)?;
        assert!(newton.execute(&mut state)?);
        let correct = Vector::from(&[2e5 - 0.5e5 / 3.0, 1.5e5, 1e5 + 0.5e5 / 3.0]);
        vec_approx_eq(state.uu.as_data(), correct.as_data(), 1e-6);
        Ok(())
    }

    #[test]
    fn linear_solver_errors_are_recoverable() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(3, 3.0))?;
        let mut config = Config::new(1);
        config.set_stationary(true)?;
        config.newton.target_steps = 5;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        state.uu[1] = 123.0;
        let mut newton = NewtonMethod::with_solver(assembler, Box::new(FailingSolver {}))?;
        assert!(!newton.execute(&mut state)?);
        assert_eq!(state.uu.as_data(), &[1e5, 1e5, 1e5]);
        assert_eq!(newton.controller.num_steps(), 10);
        Ok(())
    }
}
