use super::{Method, ParamNewton, CONFIG_MIN_DT_MIN};
use crate::StrError;
use russell_sparse::Genie;
use std::fmt;

/// Holds configuration parameters for a finite volume simulation
#[derive(Clone, Debug)]
pub struct Config {
    /// Space dimension of the world (length of coordinates and gravity vectors)
    pub ndim: usize,

    /// Discretization family of the flux operator
    pub method: Method,

    /// Enables the gravity term in the potential gradient (`Problem.EnableGravity`)
    pub enable_gravity: bool,

    /// Gravity acceleration (the gravity vector points towards −x_last)
    pub gravity: f64,

    /// Upwind weight w ∈ [0, 1] (`Implicit.MassUpwindWeight`)
    ///
    /// `w = 1` yields full upwinding and `w = 0.5` yields central differencing.
    pub upwind_weight: f64,

    /// Stationary problem (the storage term is ignored)
    pub stationary: bool,

    /// Initial time
    pub t_ini: f64,

    /// Final time
    pub t_fin: f64,

    /// Initial time step size
    pub dt_ini: f64,

    /// Minimum time step size
    pub dt_min: f64,

    /// Maximum time step size
    pub dt_max: f64,

    /// Maximum number of accepted time steps
    pub n_max_time_steps: usize,

    /// Maximum number of Newton attempts per time step (`Implicit.MaxTimeStepDivisions`)
    ///
    /// The time step size is halved after each failed attempt.
    pub max_time_step_divisions: usize,

    /// Relative perturbation for the numerical differentiation of the residual
    pub numeric_epsilon: f64,

    /// Linear solver
    pub lin_sol_genie: Genie,

    /// Parameters of the Newton method
    pub newton: ParamNewton,

    /// Shows the accepted time steps
    pub verbose_timesteps: bool,

    /// Shows the Newton iterations
    pub verbose_iterations: bool,

    /// Shows the messages of the linear solver
    pub verbose_lin_sys_solve: bool,
}

impl Config {
    /// Allocates a new instance
    pub fn new(ndim: usize) -> Self {
        Config {
            ndim,
            method: Method::CcTpfa,
            enable_gravity: false,
            gravity: 9.81,
            upwind_weight: 1.0,
            stationary: false,
            t_ini: 0.0,
            t_fin: 1.0,
            dt_ini: 0.1,
            dt_min: CONFIG_MIN_DT_MIN,
            dt_max: f64::MAX,
            n_max_time_steps: 1000,
            max_time_step_divisions: 10,
            numeric_epsilon: 1e-8,
            lin_sol_genie: Genie::Umfpack,
            newton: ParamNewton::new(),
            verbose_timesteps: false,
            verbose_iterations: false,
            verbose_lin_sys_solve: false,
        }
    }

    /// Sets the discretization method
    pub fn set_method(&mut self, method: Method) -> Result<&mut Self, StrError> {
        self.method = method;
        Ok(self)
    }

    /// Enables or disables gravity
    pub fn set_enable_gravity(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.enable_gravity = flag;
        Ok(self)
    }

    /// Sets the gravity acceleration
    pub fn set_gravity(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 0.0 {
            return Err("gravity must be ≥ 0.0");
        }
        self.gravity = value;
        Ok(self)
    }

    /// Sets the upwind weight
    pub fn set_upwind_weight(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 0.0 || value > 1.0 {
            return Err("upwind weight must be in [0.0, 1.0]");
        }
        self.upwind_weight = value;
        Ok(self)
    }

    /// Sets a stationary problem
    pub fn set_stationary(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.stationary = flag;
        Ok(self)
    }

    /// Sets the time interval and the initial time step size
    pub fn set_time(&mut self, t_ini: f64, t_fin: f64, dt_ini: f64) -> Result<&mut Self, StrError> {
        if t_fin < t_ini {
            return Err("the final time must be ≥ the initial time");
        }
        if dt_ini <= 0.0 {
            return Err("the initial time step size must be > 0.0");
        }
        self.t_ini = t_ini;
        self.t_fin = t_fin;
        self.dt_ini = dt_ini;
        Ok(self)
    }

    /// Sets the bounds of the time step size
    pub fn set_dt_bounds(&mut self, dt_min: f64, dt_max: f64) -> Result<&mut Self, StrError> {
        if dt_min < CONFIG_MIN_DT_MIN {
            return Err("the minimum time step size is too small");
        }
        if dt_max < dt_min {
            return Err("the maximum time step size must be ≥ the minimum time step size");
        }
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        Ok(self)
    }

    /// Sets the parameters of the Newton method
    pub fn set_newton(&mut self, param: ParamNewton) -> Result<&mut Self, StrError> {
        if param.validate().is_some() {
            return Err("the parameters of the Newton method are invalid");
        }
        self.newton = param;
        Ok(self)
    }

    /// Sets a parameter using the group.name keys of input files
    ///
    /// Recognized keys: `Newton.*` (see [ParamNewton]), `Implicit.MaxTimeStepDivisions`,
    /// `Implicit.MassUpwindWeight`, `Implicit.UpwindWeight`, `Problem.EnableGravity`,
    /// `TimeLoop.TEnd`, `TimeLoop.DtInitial`, and `TimeLoop.MaxTimeStepSize`.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<&mut Self, StrError> {
        fn flag(value: &str) -> Result<bool, StrError> {
            match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err("cannot parse boolean parameter"),
            }
        }
        fn int(value: &str) -> Result<usize, StrError> {
            value.trim().parse().map_err(|_| "cannot parse integer parameter")
        }
        fn real(value: &str) -> Result<f64, StrError> {
            value.trim().parse().map_err(|_| "cannot parse real parameter")
        }
        match key {
            "Newton.MaxSteps" => self.newton.max_steps = int(value)?,
            "Newton.TargetSteps" => self.newton.target_steps = int(value)?,
            "Newton.MaxRelativeShift" => self.newton.max_relative_shift = real(value)?,
            "Newton.MaxAbsoluteResidual" => self.newton.max_absolute_residual = real(value)?,
            "Newton.ResidualReduction" => self.newton.residual_reduction = real(value)?,
            "Newton.EnableShiftCriterion" => self.newton.enable_shift_criterion = flag(value)?,
            "Newton.EnableResidualCriterion" => self.newton.enable_residual_criterion = flag(value)?,
            "Newton.EnableAbsoluteResidualCriterion" => {
                self.newton.enable_absolute_residual_criterion = flag(value)?
            }
            "Newton.SatisfyResidualAndShiftCriterion" => {
                self.newton.satisfy_residual_and_shift_criterion = flag(value)?
            }
            "Newton.UseLineSearch" => self.newton.use_line_search = flag(value)?,
            "Newton.Verbose" => self.newton.verbose = flag(value)?,
            "Implicit.MaxTimeStepDivisions" => self.max_time_step_divisions = int(value)?,
            "Implicit.MassUpwindWeight" | "Implicit.UpwindWeight" => {
                self.set_upwind_weight(real(value)?)?;
            }
            "Problem.EnableGravity" => self.enable_gravity = flag(value)?,
            "TimeLoop.TEnd" => self.t_fin = real(value)?,
            "TimeLoop.DtInitial" => self.dt_ini = real(value)?,
            "TimeLoop.MaxTimeStepSize" => self.dt_max = real(value)?,
            _ => return Err("unknown parameter key"),
        }
        Ok(self)
    }

    /// Reads parameters from `Group.Name = value` lines
    ///
    /// Lines starting with `#` and blank lines are ignored.
    pub fn set_params_from_str(&mut self, text: &str) -> Result<&mut Self, StrError> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or("parameter line must have the form key = value")?;
            self.set_param(key.trim(), value)?;
        }
        Ok(self)
    }

    /// Returns the gravity vector (zero if gravity is disabled)
    pub fn gravity_vector(&self) -> Vec<f64> {
        let mut g = vec![0.0; self.ndim];
        if self.enable_gravity && self.ndim > 0 {
            g[self.ndim - 1] = -self.gravity;
        }
        g
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.ndim < 1 || self.ndim > 3 {
            return Some(format!("ndim = {} is incorrect; it must be 1, 2, or 3", self.ndim));
        }
        if self.upwind_weight < 0.0 || self.upwind_weight > 1.0 {
            return Some(format!(
                "upwind_weight = {:?} is incorrect; it must be in [0.0, 1.0]",
                self.upwind_weight
            ));
        }
        if self.t_fin < self.t_ini {
            return Some(format!(
                "t_fin = {:?} is incorrect; it must be ≥ t_ini = {:?}",
                self.t_fin, self.t_ini
            ));
        }
        if self.dt_min < CONFIG_MIN_DT_MIN {
            return Some(format!(
                "dt_min = {:?} is incorrect; it must be ≥ {:e}",
                self.dt_min, CONFIG_MIN_DT_MIN
            ));
        }
        if self.dt_ini < self.dt_min {
            return Some(format!(
                "dt_ini = {:?} is incorrect; it must be ≥ dt_min = {:?}",
                self.dt_ini, self.dt_min
            ));
        }
        if self.dt_max < self.dt_min {
            return Some(format!(
                "dt_max = {:?} is incorrect; it must be ≥ dt_min = {:?}",
                self.dt_max, self.dt_min
            ));
        }
        if self.max_time_step_divisions < 1 {
            return Some(format!(
                "max_time_step_divisions = {} is incorrect; it must be ≥ 1",
                self.max_time_step_divisions
            ));
        }
        if self.numeric_epsilon <= 0.0 {
            return Some(format!(
                "numeric_epsilon = {:?} is incorrect; it must be > 0.0",
                self.numeric_epsilon
            ));
        }
        self.newton.validate()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n")?;
        write!(f, "==================\n")?;
        write!(f, "ndim = {:?}\n", self.ndim)?;
        write!(f, "method = {:?}\n", self.method)?;
        write!(f, "enable_gravity = {:?}\n", self.enable_gravity)?;
        write!(f, "gravity = {:?}\n", self.gravity)?;
        write!(f, "upwind_weight = {:?}\n", self.upwind_weight)?;
        write!(f, "stationary = {:?}\n", self.stationary)?;
        write!(f, "t_ini = {:?}\n", self.t_ini)?;
        write!(f, "t_fin = {:?}\n", self.t_fin)?;
        write!(f, "dt_ini = {:?}\n", self.dt_ini)?;
        write!(f, "max_time_step_divisions = {:?}\n", self.max_time_step_divisions)?;
        write!(f, "\nNewton method\n")?;
        write!(f, "=============\n")?;
        write!(f, "{:?}\n", self.newton)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::base::{Method, ParamNewton};
    use crate::StrError;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let mut config = Config::new(2);
        assert_eq!(config.validate(), None);
        assert_eq!(config.gravity_vector(), &[0.0, 0.0]);

        config
            .set_method(Method::CcMpfa)?
            .set_enable_gravity(true)?
            .set_gravity(10.0)?
            .set_upwind_weight(0.5)?
            .set_time(0.0, 100.0, 1.0)?
            .set_dt_bounds(1e-6, 50.0)?;
        assert_eq!(config.gravity_vector(), &[0.0, -10.0]);
        assert_eq!(config.validate(), None);

        let text = format!("{}", config);
        assert!(text.starts_with("Configuration data\n==================\nndim = 2\nmethod = CcMpfa\n"));
        Ok(())
    }

    #[test]
    fn set_param_works() -> Result<(), StrError> {
        let mut config = Config::new(3);
        config.set_params_from_str(
            "# newton
             Newton.MaxSteps = 12
             Newton.TargetSteps = 6
             Newton.MaxRelativeShift = 1e-10
             Newton.EnableResidualCriterion = true
             Newton.SatisfyResidualAndShiftCriterion = true
             Newton.UseLineSearch = true
             Implicit.MaxTimeStepDivisions = 4
             Implicit.MassUpwindWeight = 0.5
             Problem.EnableGravity = true",
        )?;
        assert_eq!(config.newton.max_steps, 12);
        assert_eq!(config.newton.target_steps, 6);
        assert_eq!(config.newton.max_relative_shift, 1e-10);
        assert!(config.newton.enable_residual_criterion);
        assert!(config.newton.satisfy_residual_and_shift_criterion);
        assert!(config.newton.use_line_search);
        assert_eq!(config.max_time_step_divisions, 4);
        assert_eq!(config.upwind_weight, 0.5);
        assert!(config.enable_gravity);
        assert_eq!(config.gravity_vector(), &[0.0, 0.0, -9.81]);
        Ok(())
    }

    #[test]
    fn catch_some_errors() {
        let mut config = Config::new(2);
        assert_eq!(config.set_gravity(-10.0).err(), Some("gravity must be ≥ 0.0"));
        assert_eq!(
            config.set_upwind_weight(1.5).err(),
            Some("upwind weight must be in [0.0, 1.0]")
        );
        assert_eq!(
            config.set_time(1.0, 0.0, 0.1).err(),
            Some("the final time must be ≥ the initial time")
        );
        assert_eq!(
            config.set_dt_bounds(1e-12, 1.0).err(),
            Some("the minimum time step size is too small")
        );
        assert_eq!(config.set_param("Newton.Foo", "1").err(), Some("unknown parameter key"));
        assert_eq!(
            config.set_param("Newton.MaxSteps", "abc").err(),
            Some("cannot parse integer parameter")
        );
        assert_eq!(
            config.set_params_from_str("Newton.MaxSteps 3").err(),
            Some("parameter line must have the form key = value")
        );
        let mut param = ParamNewton::new();
        param.enable_shift_criterion = false;
        assert_eq!(
            config.set_newton(param).err(),
            Some("the parameters of the Newton method are invalid")
        );
    }

    #[test]
    fn validate_works() {
        let mut config = Config::new(2);
        config.upwind_weight = 2.0;
        assert_eq!(
            config.validate(),
            Some("upwind_weight = 2.0 is incorrect; it must be in [0.0, 1.0]".to_string())
        );
        config.upwind_weight = 1.0;
        config.dt_ini = 1e-12;
        assert_eq!(
            config.validate(),
            Some("dt_ini = 1e-12 is incorrect; it must be ≥ dt_min = 1e-10".to_string())
        );
        config.dt_ini = 0.1;
        config.max_time_step_divisions = 0;
        assert_eq!(
            config.validate(),
            Some("max_time_step_divisions = 0 is incorrect; it must be ≥ 1".to_string())
        );
        config.max_time_step_divisions = 1;
        config.newton.enable_shift_criterion = false;
        assert!(config.validate().is_some());
    }
}
