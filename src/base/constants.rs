/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/pmflow/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/pmflow/test";

/// Defines the smallest allowed value for the minimum time step size
pub const CONFIG_MIN_DT_MIN: f64 = 1e-10;

/// Saturation scale of the regularized density weighting at faces
///
/// The weight of one side is `clamp(S / ε, 0, 0.5)`
pub const SATURATION_WEIGHT_EPS: f64 = 1e-5;

/// Smallest step length multiplier λ of the line search
pub const LINE_SEARCH_MIN_LAMBDA: f64 = 0.125;

/// Replaces NaN or Inf fluxes in the CFL evaluation
pub const CFL_FLUX_SENTINEL: f64 = 1e-100;

/// Replaces non-positive volume correction factors in the CFL evaluation
pub const CFL_VOLUME_SENTINEL: f64 = 1e100;

/// Lower bound of the mobile saturation `S - Sr` in the CFL evaluation
pub const CFL_MIN_MOBILE_SATURATION: f64 = 1e-2;

/// Porosities below this value are ignored by the CFL time step estimate
pub const CFL_MIN_POROSITY: f64 = 1e-6;

/// Relative tolerance to flag a singular local MPFA matrix
///
/// The matrix A (n × n) is singular if `|det(A)| ≤ tol · max|Aᵢⱼ|ⁿ`
pub const MPFA_SINGULARITY_TOL: f64 = 1e-14;
