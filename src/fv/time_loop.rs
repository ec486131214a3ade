use super::{NewtonMethod, State};
use crate::StrError;
use russell_lab::format_nanoseconds;

/// Defines the collective operations required by the time loop
///
/// With domain decomposition, every process must agree on the time step size; thus the
/// suggested sizes are reduced with a global minimum.
pub trait Communication {
    /// Returns the global minimum of a value
    fn min(&self, value: f64) -> f64;
}

/// Implements the communication of a single process
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCommunication {}

impl Communication for SerialCommunication {
    fn min(&self, value: f64) -> f64 {
        value
    }
}

/// Drives the implicit time integration
///
/// Each time step is solved by the Newton method. If the Newton method fails, the time step
/// size is halved and the solve is restarted from the last accepted solution. At most
/// `max_time_step_divisions` attempts are made per time step.
pub struct TimeLoop<'a> {
    /// Newton method
    pub newton: NewtonMethod<'a>,

    /// Collective operations
    comm: Box<dyn Communication + 'a>,
}

impl<'a> TimeLoop<'a> {
    /// Allocates a new instance (single process)
    pub fn new(newton: NewtonMethod<'a>) -> Self {
        TimeLoop::with_communication(newton, Box::new(SerialCommunication {}))
    }

    /// Allocates a new instance with given collective operations
    pub fn with_communication(newton: NewtonMethod<'a>, comm: Box<dyn Communication + 'a>) -> Self {
        TimeLoop { newton, comm }
    }

    /// Solves one time step from `state.t` to `state.t + state.dt`
    ///
    /// On success, `state.dt` holds the time step size actually used (it may have been
    /// halved). Returns an error after `max_time_step_divisions` unsuccessful attempts; the
    /// step size is halved after each of them. Stationary problems are not retried.
    pub fn time_integration(&mut self, state: &mut State) -> Result<(), StrError> {
        let config = self.newton.assembler.residual.config;
        let t_old = state.t;
        if config.stationary {
            if self.newton.execute(state)? {
                return Ok(());
            }
            log::error!("Newton solver did not converge (stationary problem)");
            return Err("Newton solver did not converge for the stationary problem");
        }
        let max_attempts = usize::max(1, config.max_time_step_divisions);
        for _ in 0..max_attempts {
            state.t = t_old + state.dt;
            if self.newton.execute(state)? {
                return Ok(());
            }
            state.t = t_old;
            let dt = state.dt / 2.0;
            log::warn!(
                "Newton solver did not converge with dt={} seconds. Retrying with time step of {} seconds",
                state.dt,
                dt
            );
            state.dt = dt;
        }
        log::error!(
            "Newton solver didn't converge after {} time-step divisions. dt={}",
            max_attempts,
            state.dt
        );
        Err("Newton solver did not converge after the maximum number of time-step divisions")
    }

    /// Returns the size of the next time step
    ///
    /// The suggestion of the Newton controller is clipped to `dt_max` and to the remaining
    /// time until `t_fin`, and then reduced to the global minimum.
    pub fn next_time_step_size(&self, state: &State) -> f64 {
        let config = self.newton.assembler.residual.config;
        let mut dt = self.newton.controller.suggest_time_step_size(state.dt);
        dt = f64::min(dt, config.dt_max);
        let remaining = config.t_fin - state.t;
        if remaining > 0.0 {
            dt = f64::min(dt, remaining);
        }
        self.comm.min(dt)
    }

    /// Runs the simulation until `t_fin` (or `n_max_time_steps`)
    pub fn run(&mut self, state: &mut State) -> Result<(), StrError> {
        let config = self.newton.assembler.residual.config;
        if config.stationary {
            self.print_timestep(state);
            self.time_integration(state)?;
            state.timestep += 1;
            return Ok(());
        }
        state.dt = self.comm.min(f64::min(state.dt, config.dt_max));
        if config.verbose_timesteps || config.verbose_iterations {
            self.newton.controller.print_header();
        }
        let tol = config.dt_min / 2.0;
        while state.t < config.t_fin - tol && state.timestep < config.n_max_time_steps {
            state.dt = f64::min(state.dt, config.t_fin - state.t);
            self.print_timestep(state);
            self.time_integration(state)?;
            state.uu_old.as_mut_data().copy_from_slice(state.uu.as_data());
            state.timestep += 1;
            let dt = self.next_time_step_size(state);
            if dt < config.dt_min && state.t < config.t_fin - tol {
                log::error!("the time step size {:e} is smaller than the minimum {:e}", dt, config.dt_min);
                return Err("the time step size is smaller than the allowed minimum");
            }
            state.dt = dt;
        }
        let timings = self.newton.timings();
        log::info!(
            "finished at t = {} after {} time steps (assemble: {}, solve: {}, update: {})",
            state.t,
            state.timestep,
            format_nanoseconds(timings.assemble),
            format_nanoseconds(timings.solve),
            format_nanoseconds(timings.update)
        );
        Ok(())
    }

    /// Prints the time step line
    fn print_timestep(&self, state: &State) {
        let config = self.newton.assembler.residual.config;
        if !config.verbose_timesteps {
            return;
        }
        println!(
            "{:>8} {:>13.6e} {:>13.6e} {:>5} {:>9}   {:>9}  ",
            state.timestep + 1,
            state.t + state.dt,
            state.dt,
            ".",
            ".",
            "."
        );
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Communication, SerialCommunication, TimeLoop};
    use crate::base::{Config, ParamFluid, ParamRealDensity};
    use crate::fv::{Assembler, BoundaryTypes, DirectSolver, HomogeneousSpatialParams, LinearSolverBackend};
    use crate::fv::{LocalResidual, NewtonMethod, Problem, SpatialParams, State};
    use crate::geometry::{FvGrid, SampleMeshes};
    use crate::models::OneP;
    use crate::StrError;
    use russell_lab::{approx_eq, Vector};
    use russell_sparse::{Genie, SparseMatrix};

    struct Column {
        spatial: HomogeneousSpatialParams,
    }

    impl Problem for Column {
        fn spatial_params(&self) -> &dyn SpatialParams {
            &self.spatial
        }
        fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
            if x[0] < 1e-10 {
                bc.set_all_dirichlet();
            }
        }
        fn dirichlet_at_pos(&self, values: &mut [f64], _x: &[f64]) -> Result<(), StrError> {
            values[0] = 2e5;
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

    fn compressible() -> ParamFluid {
        ParamFluid {
            density: ParamRealDensity {
                cc: 1e-6,
                p_ref: 1e5,
                rho_ref: 1000.0,
            },
            viscosity: 1e-3,
        }
    }

    /// Fails the first calls
    struct FlakySolver {
        failures: usize,
        inner: DirectSolver<'static>,
    }

    impl FlakySolver {
        fn new(failures: usize) -> Result<Self, StrError> {
            Ok(FlakySolver {
                failures,
                inner: DirectSolver::new(Genie::Umfpack)?,
            })
        }
    }

    impl LinearSolverBackend for FlakySolver {
        fn solve(&mut self, x: &mut Vector, kk: &mut SparseMatrix, rhs: &Vector, verbose: bool) -> Result<(), StrError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err("the matrix is singular");
            }
            self.inner.solve(x, kk, rhs, verbose)
        }
    }

    #[test]
    fn serial_communication_works() {
        let comm = SerialCommunication {};
        assert_eq!(comm.min(3.0), 3.0);
    }

    #[test]
    fn run_reaches_the_final_time() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&compressible())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(4, 4.0))?;
        let mut config = Config::new(1);
        config.set_time(0.0, 10.0, 1.0)?.set_dt_bounds(1e-6, 4.0)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let mut time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);
        time_loop.run(&mut state)?;
        approx_eq(state.t, 10.0, 1e-12);
        assert!(state.timestep >= 3);
        // the pressure rises towards the Dirichlet value
        for i in 0..4 {
            assert!(state.uu[i] > 1e5);
            assert!(state.uu[i] < 2e5 + 1.0);
        }
        assert!(state.uu[0] > state.uu[3]);
        Ok(())
    }

    #[test]
    fn next_time_step_size_is_clipped() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&compressible())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(2, 2.0))?;
        let mut config = Config::new(1);
        config.set_time(0.0, 10.0, 1.0)?.set_dt_bounds(1e-6, 1.5)?;
        config.newton.target_steps = 10;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);

        // no iterations yet: the suggestion is (1 + 1/1.2) dt, clipped to dt_max
        assert_eq!(time_loop.next_time_step_size(&state), 1.5);

        // clipped to the remaining time
        state.t = 9.8;
        approx_eq(time_loop.next_time_step_size(&state), 0.2, 1e-12);
        Ok(())
    }

    #[test]
    fn time_integration_retries_with_halved_steps() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&compressible())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(2, 2.0))?;
        let mut config = Config::new(1);
        config.set_time(0.0, 10.0, 1.0)?;
        config.max_time_step_divisions = 3;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;

        // the first two attempts fail
        let newton = NewtonMethod::with_solver(assembler, Box::new(FlakySolver::new(2)?))?;
        let mut time_loop = TimeLoop::new(newton);
        time_loop.time_integration(&mut state)?;
        assert_eq!(state.dt, 0.25);
        assert_eq!(state.t, 0.25);
        assert!(state.uu[0] > 1e5);

        // the number of attempts equals max_time_step_divisions
        let problem = column();
        let mut config = Config::new(1);
        config.set_time(0.0, 10.0, 1.0)?;
        config.max_time_step_divisions = 2;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let newton = NewtonMethod::with_solver(assembler, Box::new(FlakySolver::new(2)?))?;
        let mut time_loop = TimeLoop::new(newton);
        assert_eq!(
            time_loop.time_integration(&mut state).err(),
            Some("Newton solver did not converge after the maximum number of time-step divisions")
        );

        // exhaustion: the solver never succeeds
        let problem = column();
        let mut config = Config::new(1);
        config.set_time(0.0, 10.0, 1.0)?;
        config.max_time_step_divisions = 2;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let solver = FlakySolver::new(usize::MAX)?;
        let mut time_loop = TimeLoop::new(NewtonMethod::with_solver(assembler, Box::new(solver))?);
        assert_eq!(
            time_loop.time_integration(&mut state).err(),
            Some("Newton solver did not converge after the maximum number of time-step divisions")
        );
        assert_eq!(state.dt, 0.25);
        assert_eq!(state.t, 0.0);
        assert_eq!(state.uu.as_data(), &[1e5, 1e5]);
        Ok(())
    }

    #[test]
    fn stationary_failure_is_not_retried() -> Result<(), StrError> {
        let problem = column();
        let model = OneP::new(&compressible())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(2, 2.0))?;
        let mut config = Config::new(1);
        config.set_stationary(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut state = State::new(&assembler)?;
        let solver = FlakySolver::new(usize::MAX)?;
        let mut time_loop = TimeLoop::new(NewtonMethod::with_solver(assembler, Box::new(solver))?);
        assert_eq!(
            time_loop.time_integration(&mut state).err(),
            Some("Newton solver did not converge for the stationary problem")
        );
        Ok(())
    }
}
