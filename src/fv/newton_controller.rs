use crate::base::ParamNewton;
use russell_lab::Vector;

/// Controls the convergence of the Newton method and suggests time step sizes
///
/// The controller tracks the maximum relative shift of the primary variables between two
/// iterations and, if enabled, the residual norm and its reduction with respect to the
/// residual at the first iteration.
#[derive(Clone, Debug)]
pub struct NewtonController {
    /// Parameters
    param: ParamNewton,

    /// Prints one line per iteration
    verbose: bool,

    /// Number of iterations of the current Newton solve
    num_steps: usize,

    /// Maximum relative shift of the last iteration
    shift: f64,

    /// Shift of the previous iteration
    last_shift: f64,

    /// Residual norm divided by the initial residual norm
    reduction: f64,

    /// Reduction of the previous iteration
    last_reduction: f64,

    /// Residual norm (2-norm) of the last iteration
    residual_norm: f64,

    /// Residual norm at the first iteration
    initial_residual: f64,
}

impl NewtonController {
    /// Allocates a new instance
    pub fn new(param: &ParamNewton, verbose: bool) -> Self {
        NewtonController {
            param: *param,
            verbose: verbose || param.verbose,
            num_steps: 0,
            shift: 1e100,
            last_shift: 1e100,
            reduction: 1e100,
            last_reduction: 1e100,
            residual_norm: 1e100,
            initial_residual: 1e100,
        }
    }

    /// Returns the parameters
    pub fn param(&self) -> &ParamNewton {
        &self.param
    }

    /// Returns the number of iterations of the current (or last) Newton solve
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Returns the maximum relative shift of the last iteration
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Returns the residual reduction of the last iteration
    pub fn reduction(&self) -> f64 {
        self.reduction
    }

    /// Returns the reduction of the previous iteration
    pub fn last_reduction(&self) -> f64 {
        self.last_reduction
    }

    /// Returns the residual norm of the last iteration
    pub fn residual_norm(&self) -> f64 {
        self.residual_norm
    }

    /// Indicates that the residual must be evaluated after each update
    pub fn needs_residual(&self) -> bool {
        self.param.residual_criterion_active() || self.param.use_line_search
    }

    /// Starts a Newton solve
    pub fn newton_begin(&mut self) {
        self.num_steps = 0;
        self.shift = 1e100;
        self.last_shift = 1e100;
        self.reduction = 1e100;
        self.last_reduction = 1e100;
        self.residual_norm = 1e100;
        self.initial_residual = 1e100;
    }

    /// Starts an iteration
    pub fn newton_begin_step(&mut self) {
        self.last_shift = self.shift;
        self.last_reduction = if self.num_steps == 0 { 1.0 } else { self.reduction };
    }

    /// Sets the residual norm at the first iteration
    pub fn set_initial_residual(&mut self, norm: f64) {
        self.initial_residual = norm;
        self.residual_norm = norm;
        self.reduction = 1.0;
    }

    /// Sets the residual norm after an update
    pub fn set_residual(&mut self, norm: f64) {
        self.residual_norm = norm;
        self.reduction = if self.initial_residual > 0.0 {
            norm / self.initial_residual
        } else {
            0.0
        };
    }

    /// Computes the maximum relative shift between two iterates
    ///
    /// ```text
    /// shift = max_i |uᵢ − vᵢ| / max(1, |uᵢ + vᵢ| / 2)
    /// ```
    pub fn update_shift(&mut self, u_last_iter: &Vector, u_new: &Vector) {
        self.shift = 0.0;
        for i in 0..u_new.dim() {
            self.shift = f64::max(self.shift, relative_shift_at_dof(u_last_iter[i], u_new[i]));
        }
    }

    /// Finishes an iteration
    pub fn newton_end_step(&mut self) {
        self.num_steps += 1;
        self.print_iteration();
    }

    /// Returns true if the Newton method converged
    pub fn newton_converged(&self) -> bool {
        let p = &self.param;
        let shift_ok = self.shift <= p.max_relative_shift;
        let residual_ok = self.residual_norm <= p.max_absolute_residual;
        let reduction_ok = self.reduction <= p.residual_reduction;
        let residual_criterion = p.residual_criterion_active();
        if p.enable_shift_criterion && !residual_criterion {
            shift_ok
        } else if !p.enable_shift_criterion && residual_criterion {
            if p.enable_absolute_residual_criterion {
                residual_ok
            } else {
                reduction_ok
            }
        } else if p.satisfy_residual_and_shift_criterion {
            if p.enable_absolute_residual_criterion {
                shift_ok && residual_ok
            } else {
                shift_ok && reduction_ok
            }
        } else {
            shift_ok || reduction_ok || residual_ok
        }
    }

    /// Returns true if another iteration should be performed
    ///
    /// At least two iterations are always performed. After `max_steps` iterations, the method
    /// proceeds only while the error decreases by a factor of four per iteration.
    pub fn newton_proceed(&self) -> bool {
        if self.num_steps < 2 {
            true
        } else if self.newton_converged() {
            false
        } else if self.num_steps >= self.param.max_steps {
            if self.param.enable_shift_criterion {
                self.shift * 4.0 < self.last_shift
            } else {
                self.reduction * 4.0 < self.last_reduction
            }
        } else {
            true
        }
    }

    /// Finishes a Newton solve
    pub fn newton_end(&self) {
        log::debug!("Newton solve finished after {} iterations", self.num_steps);
    }

    /// Records a failed Newton solve (the next time step size will be reduced)
    pub fn newton_fail(&mut self) {
        self.num_steps = self.param.target_steps * 2;
    }

    /// Records a successful Newton solve
    pub fn newton_succeed(&self) {
        log::debug!("Newton solver converged with shift = {:e}", self.shift);
    }

    /// Suggests the next time step size from the number of iterations of the last solve
    ///
    /// ```text
    /// n > target:  dt / (1 + (n − target)/target)
    /// n ≤ target:  dt (1 + (target − n)/target / 1.2)
    /// ```
    pub fn suggest_time_step_size(&self, old_dt: f64) -> f64 {
        let target = self.param.target_steps as f64;
        let n = self.num_steps as f64;
        if self.num_steps > self.param.target_steps {
            let percent = (n - target) / target;
            old_dt / (1.0 + percent)
        } else {
            let percent = (target - n) / target;
            old_dt * (1.0 + percent / 1.2)
        }
    }

    /// Prints the header of the table with the iteration data
    pub fn print_header(&self) {
        if !self.verbose {
            return;
        }
        println!("Legend:");
        println!("✅ : converged");
        println!("👍 : converging");
        println!("🥵 : diverging");
        println!("😱 : found NaN or Inf\n");
        println!(
            "{:>8} {:>13} {:>13} {:>5} {:>9}   {:>9}  ",
            "timestep", "t", "Δt", "iter", "shift", "|R|/|R₀|"
        );
    }

    /// Prints the data of the last iteration
    fn print_iteration(&self) {
        if !self.verbose {
            return;
        }
        let l = if !self.shift.is_finite() || !self.residual_norm.is_finite() {
            "😱" // found NaN or Inf
        } else if self.newton_converged() {
            "✅"
        } else if self.shift > self.last_shift {
            "🥵"
        } else {
            "👍"
        };
        if self.needs_residual() {
            println!(
                "{:>8} {:>13} {:>13} {:>5} {:>9.2e}{} {:>9.2e}  ",
                ".", ".", ".", self.num_steps, self.shift, l, self.reduction
            );
        } else {
            println!(
                "{:>8} {:>13} {:>13} {:>5} {:>9.2e}{} {:>9}  ",
                ".", ".", ".", self.num_steps, self.shift, l, "."
            );
        }
    }
}

/// Returns the relative shift between two values of one primary variable
pub fn relative_shift_at_dof(a: f64, b: f64) -> f64 {
    f64::abs(a - b) / f64::max(1.0, f64::abs(a + b) / 2.0)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
