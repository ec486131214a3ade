use env_logger::{Builder, Target};
use log::LevelFilter;
use pmflow::prelude::*;
use pmflow::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "pmflow_run",
    about = "Runs the sample single-phase and two-phase flow problems"
)]
struct Options {
    /// Sample problem: 1p (stationary pressure field) or 2p (oil injection)
    #[structopt(long, default_value = "1p")]
    problem: String,

    /// Discretization method: tpfa, mpfa, or box
    #[structopt(long, default_value = "tpfa")]
    method: String,

    /// Number of cells along x
    #[structopt(long, default_value = "10")]
    nx: usize,

    /// Enables gravity (1p problem)
    #[structopt(long)]
    gravity: bool,

    /// Prints the time steps and the Newton iterations
    #[structopt(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG is used if omitted
    #[structopt(long)]
    log_level: Option<String>,

    /// Writes the final state and a restart file to the output directory
    #[structopt(long)]
    write: bool,
}

/// Pressure drop between the left and right sides of the unit square
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
        values[0] = if x[0] < 0.5 { 2e5 } else { 1e5 };
        Ok(())
    }
    fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
        values[0] = 1e5;
    }
}

/// Injection of oil into a water-saturated strip
struct OilInjection {
    spatial: HomogeneousSpatialParams,
    length: f64,
    rate: f64,
}

impl Problem for OilInjection {
    fn spatial_params(&self) -> &dyn SpatialParams {
        &self.spatial
    }
    fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
        if x[0] > self.length - 1e-8 {
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
            values[1] = -self.rate;
        }
    }
    fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
        values[0] = 1e5;
        values[1] = 0.0;
    }
}

fn init_logging(level: &Option<String>) {
    let filter = level
        .as_ref()
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse::<LevelFilter>().ok()))
        .unwrap_or(LevelFilter::Info);
    Builder::new().filter_level(filter).target(Target::Stdout).init();
}

fn grid_for(method: Method, mesh: &Mesh) -> Result<FvGrid, StrError> {
    match method {
        Method::Box => FvGrid::new_box(mesh),
        _ => FvGrid::new_cell_centered(mesh),
    }
}

fn finish(options: &Options, name: &str, state: &State, num_eq: usize) -> Result<(), StrError> {
    if options.write {
        let stem = format!("{}/{}_{}", DEFAULT_OUT_DIR, name, options.method);
        state.write_json(&format!("{}.json", stem))?;
        write_restart(&format!("{}.restart", stem), &state.uu, num_eq)?;
        log::info!("results written to {}.json and {}.restart", stem, stem);
    }
    Ok(())
}

fn run_one_phase(options: &Options, method: Method) -> Result<(), StrError> {
    let nx = options.nx;
    let mesh = if method == Method::Box {
        SampleMeshes::structured_triangles(nx, nx, 1.0, 1.0)
    } else {
        SampleMeshes::structured_2d(nx, nx, 1.0, 1.0)
    };
    let grid = grid_for(method, &mesh)?;
    let problem = PressureDrop {
        spatial: HomogeneousSpatialParams::new_isotropic(2, 1e-12, 0.2),
    };
    let model = OneP::new(&ParamFluid::sample_water())?;
    let mut config = Config::new(2);
    config
        .set_method(method)?
        .set_stationary(true)?
        .set_enable_gravity(options.gravity)?;
    config.verbose_iterations = options.verbose;
    config.verbose_timesteps = options.verbose;

    let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
    let mut state = State::new(&assembler)?;
    let mut time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);
    time_loop.run(&mut state)?;

    let data = state.uu.as_data();
    let p_min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let p_max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    log::info!(
        "1p ({:?}): {} DOFs, {} Newton iterations, p ∈ [{:.3}, {:.3}] Pa",
        method,
        grid.n_dof(),
        time_loop.newton.controller.num_steps(),
        p_min,
        p_max
    );
    finish(options, "1p", &state, 1)
}

fn run_two_phase(options: &Options, method: Method) -> Result<(), StrError> {
    let nx = options.nx;
    let length = 10.0;
    let mesh = if method == Method::Box {
        SampleMeshes::structured_triangles(nx, 1, length, 1.0)
    } else {
        SampleMeshes::structured_2d(nx, 1, length, 1.0)
    };
    let grid = grid_for(method, &mesh)?;
    let mut spatial = HomogeneousSpatialParams::new_isotropic(2, 1e-11, 0.2);
    spatial.set_material_law(ParamMaterialLaw::sample_brooks_corey());
    let problem = OilInjection {
        spatial,
        length,
        rate: 1e-2,
    };
    let model = TwoP::new(&ParamFluid::sample_water(), &ParamFluid::sample_oil())?;
    let mut config = Config::new(2);
    config
        .set_method(method)?
        .set_time(0.0, 5e4, 100.0)?
        .set_dt_bounds(1e-3, 5e3)?;
    config.verbose_iterations = options.verbose;
    config.verbose_timesteps = options.verbose;

    let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
    let mut state = State::new(&assembler)?;
    if method != Method::Box {
        let dt_cfl = cfl_time_step_size(&assembler, &state.uu, 0.95)?;
        log::debug!("initial CFL time step: {:e}", dt_cfl);
    }
    let mut time_loop = TimeLoop::new(NewtonMethod::new(assembler)?);
    time_loop.run(&mut state)?;

    let sn_max = (0..grid.n_dof()).map(|dof| state.uu[dof * 2 + 1]).fold(0.0, f64::max);
    log::info!(
        "2p ({:?}): {} DOFs, {} time steps, t = {:e} s, max Sn = {:.4}",
        method,
        grid.n_dof(),
        state.timestep,
        state.t,
        sn_max
    );
    finish(options, "2p", &state, 2)
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();
    init_logging(&options.log_level);
    if options.nx == 0 {
        return Err("nx must be greater than zero");
    }
    let method = Method::from_name(&options.method)?;

    // run
    match options.problem.as_str() {
        "1p" => run_one_phase(&options, method),
        "2p" => run_two_phase(&options, method),
        _ => Err("problem must be 1p or 2p"),
    }
}
