use serde::{Deserialize, Serialize};

/// Holds the parameters of the Newton method (the `Newton.*` group of input files)
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ParamNewton {
    /// Maximum number of iterations before the grace test of `newton_proceed` (`Newton.MaxSteps`)
    pub max_steps: usize,

    /// Number of iterations aimed at when suggesting the next time step size (`Newton.TargetSteps`)
    pub target_steps: usize,

    /// Tolerance of the shift criterion (`Newton.MaxRelativeShift`)
    pub max_relative_shift: f64,

    /// Tolerance of the absolute residual criterion (`Newton.MaxAbsoluteResidual`)
    pub max_absolute_residual: f64,

    /// Tolerance of the relative residual reduction (`Newton.ResidualReduction`)
    pub residual_reduction: f64,

    /// Enables the shift criterion (`Newton.EnableShiftCriterion`)
    pub enable_shift_criterion: bool,

    /// Enables the residual criterion (`Newton.EnableResidualCriterion`)
    pub enable_residual_criterion: bool,

    /// Uses the absolute residual instead of the reduction (`Newton.EnableAbsoluteResidualCriterion`)
    pub enable_absolute_residual_criterion: bool,

    /// Requires both shift and residual criteria (`Newton.SatisfyResidualAndShiftCriterion`)
    pub satisfy_residual_and_shift_criterion: bool,

    /// Enables the backtracking line search (`Newton.UseLineSearch`)
    pub use_line_search: bool,

    /// Prints one line per Newton iteration
    pub verbose: bool,
}

impl ParamNewton {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        ParamNewton {
            max_steps: 18,
            target_steps: 10,
            max_relative_shift: 1e-8,
            max_absolute_residual: 1e-5,
            residual_reduction: 1e-5,
            enable_shift_criterion: true,
            enable_residual_criterion: false,
            enable_absolute_residual_criterion: false,
            satisfy_residual_and_shift_criterion: false,
            use_line_search: false,
            verbose: false,
        }
    }

    /// Returns true if the residual norm must be evaluated after each update
    ///
    /// The absolute residual criterion implies the residual criterion.
    pub fn residual_criterion_active(&self) -> bool {
        self.enable_residual_criterion || self.enable_absolute_residual_criterion
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if !self.enable_shift_criterion && !self.residual_criterion_active() {
            return Some(
                "at least one of NewtonEnableShiftCriterion or NewtonEnableResidualCriterion has to be set to true"
                    .to_string(),
            );
        }
        if self.max_steps < 2 {
            return Some(format!("max_steps = {} is incorrect; it must be ≥ 2", self.max_steps));
        }
        if self.target_steps < 1 {
            return Some(format!("target_steps = {} is incorrect; it must be ≥ 1", self.target_steps));
        }
        if self.max_relative_shift <= 0.0 {
            return Some(format!(
                "max_relative_shift = {:?} is incorrect; it must be > 0.0",
                self.max_relative_shift
            ));
        }
        if self.max_absolute_residual <= 0.0 {
            return Some(format!(
                "max_absolute_residual = {:?} is incorrect; it must be > 0.0",
                self.max_absolute_residual
            ));
        }
        if self.residual_reduction <= 0.0 {
            return Some(format!(
                "residual_reduction = {:?} is incorrect; it must be > 0.0",
                self.residual_reduction
            ));
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
