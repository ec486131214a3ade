use russell_lab::Matrix;

/// Holds the secondary variables of one degree of freedom for one solution state
///
/// The values are computed by [crate::fv::Model::update] and are read-only afterwards.
/// Phase quantities are indexed by the phase (equal to the equation index).
#[derive(Clone, Debug)]
pub struct VolumeVariables {
    /// Primary variables
    pub primary: Vec<f64>,

    /// Phase pressures
    pub pressure: Vec<f64>,

    /// Phase saturations
    pub saturation: Vec<f64>,

    /// Residual saturations
    pub residual_saturation: Vec<f64>,

    /// Phase (intrinsic) densities
    pub density: Vec<f64>,

    /// Phase dynamic viscosities
    pub viscosity: Vec<f64>,

    /// Phase relative permeabilities
    pub rel_perm: Vec<f64>,

    /// Porosity
    pub porosity: f64,

    /// Intrinsic permeability tensor (dim_world × dim_world)
    pub permeability: Matrix,

    /// Extrusion factor
    pub extrusion: f64,
}

impl VolumeVariables {
    /// Allocates a new (zeroed) instance
    pub fn new(num_eq: usize, num_phases: usize, dim_world: usize) -> Self {
        VolumeVariables {
            primary: vec![0.0; num_eq],
            pressure: vec![0.0; num_phases],
            saturation: vec![0.0; num_phases],
            residual_saturation: vec![0.0; num_phases],
            density: vec![0.0; num_phases],
            viscosity: vec![1.0; num_phases],
            rel_perm: vec![0.0; num_phases],
            porosity: 0.0,
            permeability: Matrix::new(dim_world, dim_world),
            extrusion: 1.0,
        }
    }

    /// Returns the mobility λ = kr/μ
    pub fn mobility(&self, phase: usize) -> f64 {
        self.rel_perm[phase] / self.viscosity[phase]
    }

    /// Returns the upwinded quantity of the advective mass flux ρ kr/μ
    pub fn density_mobility(&self, phase: usize) -> f64 {
        self.density[phase] * self.rel_perm[phase] / self.viscosity[phase]
    }
}

/// Gives access to the volume variables of all degrees of freedom with at most one of them replaced
///
/// The replacement holds a perturbed state used by the numerical differentiation of the residual.
#[derive(Clone, Copy)]
pub struct ElementVolumeVariables<'a> {
    all: &'a [VolumeVariables],
    perturbed: Option<(usize, &'a VolumeVariables)>,
}

impl<'a> ElementVolumeVariables<'a> {
    /// Allocates a new instance
    pub fn new(all: &'a [VolumeVariables]) -> Self {
        ElementVolumeVariables { all, perturbed: None }
    }

    /// Allocates a new instance replacing the volume variables of one degree of freedom
    pub fn new_perturbed(all: &'a [VolumeVariables], dof: usize, volvars: &'a VolumeVariables) -> Self {
        ElementVolumeVariables {
            all,
            perturbed: Some((dof, volvars)),
        }
    }

    /// Returns the volume variables of a degree of freedom
    pub fn get(&self, dof: usize) -> &'a VolumeVariables {
        match self.perturbed {
            Some((d, vv)) if d == dof => vv,
            _ => &self.all[dof],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
