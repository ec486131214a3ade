use super::{BoundaryTypes, VolumeVariables};
use crate::base::{Config, ParamMaterialLaw};
use crate::geometry::{Scv, Scvf};
use crate::StrError;
use russell_lab::Matrix;

/// Defines the spatially varying parameters of the porous medium
pub trait SpatialParams {
    /// Returns the intrinsic permeability tensor at a position (dim_world × dim_world)
    fn permeability_at_pos(&self, x: &[f64]) -> Matrix;

    /// Returns the porosity at a position
    fn porosity_at_pos(&self, x: &[f64]) -> f64;

    /// Returns the parameters of the capillary pressure and relative permeability laws
    fn material_law_params_at_pos(&self, _x: &[f64]) -> Option<ParamMaterialLaw> {
        None
    }
}

/// Implements spatial parameters that do not depend on the position
#[derive(Clone, Debug)]
pub struct HomogeneousSpatialParams {
    /// Intrinsic permeability tensor
    pub permeability: Matrix,

    /// Porosity
    pub porosity: f64,

    /// Material law (two-phase models only)
    pub material_law: Option<ParamMaterialLaw>,
}

impl HomogeneousSpatialParams {
    /// Allocates a new instance with an isotropic permeability K I
    pub fn new_isotropic(dim_world: usize, kk: f64, porosity: f64) -> Self {
        let mut permeability = Matrix::new(dim_world, dim_world);
        for i in 0..dim_world {
            permeability.set(i, i, kk);
        }
        HomogeneousSpatialParams {
            permeability,
            porosity,
            material_law: None,
        }
    }

    /// Sets the parameters of the material law
    pub fn set_material_law(&mut self, param: ParamMaterialLaw) -> &mut Self {
        self.material_law = Some(param);
        self
    }
}

impl SpatialParams for HomogeneousSpatialParams {
    fn permeability_at_pos(&self, _x: &[f64]) -> Matrix {
        self.permeability.clone()
    }
    fn porosity_at_pos(&self, _x: &[f64]) -> f64 {
        self.porosity
    }
    fn material_law_params_at_pos(&self, _x: &[f64]) -> Option<ParamMaterialLaw> {
        self.material_law
    }
}

/// Defines the initial and boundary value problem
///
/// Only `spatial_params` and `initial_at_pos` must be implemented. The entity variants
/// (`boundary_types`, `dirichlet`, `neumann`, `source`, `initial`) fall back to the
/// positional variants evaluated at the face center or at the degree of freedom.
///
/// Sign convention: Neumann values are mass fluxes per unit area, positive when leaving the
/// domain; sources are mass rates per unit volume, positive when injecting.
pub trait Problem {
    /// Returns the spatial parameters
    fn spatial_params(&self) -> &dyn SpatialParams;

    /// Sets the boundary types at a boundary position (defaults to Neumann)
    fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, _x: &[f64]) {
        bc.set_all_neumann();
    }

    /// Sets the Dirichlet values (primary variables) at a boundary position
    fn dirichlet_at_pos(&self, _values: &mut [f64], _x: &[f64]) -> Result<(), StrError> {
        Err("dirichlet_at_pos must be implemented when Dirichlet boundaries exist")
    }

    /// Sets the Neumann fluxes at a boundary position (defaults to no flow)
    fn neumann_at_pos(&self, _values: &mut [f64], _x: &[f64]) {}

    /// Sets the source terms at a position (defaults to zero)
    fn source_at_pos(&self, _values: &mut [f64], _x: &[f64]) {}

    /// Sets the initial values (primary variables) at a position
    fn initial_at_pos(&self, values: &mut [f64], x: &[f64]);

    /// Returns the gravity vector
    fn gravity(&self, config: &Config) -> Vec<f64> {
        config.gravity_vector()
    }

    /// Sets the boundary types of a boundary face
    fn boundary_types(&self, bc: &mut BoundaryTypes, scvf: &Scvf) {
        self.boundary_types_at_pos(bc, &scvf.center)
    }

    /// Sets the Dirichlet values of a boundary face
    fn dirichlet(&self, values: &mut [f64], scvf: &Scvf) -> Result<(), StrError> {
        self.dirichlet_at_pos(values, &scvf.center)
    }

    /// Sets the Neumann fluxes of a boundary face
    fn neumann(&self, values: &mut [f64], scvf: &Scvf, _volvars: &VolumeVariables) {
        self.neumann_at_pos(values, &scvf.center)
    }

    /// Sets the source terms of a sub-control-volume
    fn source(&self, values: &mut [f64], scv: &Scv, _volvars: &VolumeVariables) {
        self.source_at_pos(values, &scv.center)
    }

    /// Sets the initial values of a sub-control-volume
    fn initial(&self, values: &mut [f64], scv: &Scv) {
        self.initial_at_pos(values, &scv.center)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{HomogeneousSpatialParams, Problem, SpatialParams};
    use crate::base::{Config, ParamMaterialLaw};
    use crate::fv::BoundaryTypes;
    use crate::geometry::{FvGrid, GridGeometry, SampleMeshes};
    use crate::StrError;

    struct Minimal {
        spatial: HomogeneousSpatialParams,
    }

    impl Problem for Minimal {
        fn spatial_params(&self) -> &dyn SpatialParams {
            &self.spatial
        }
        fn initial_at_pos(&self, values: &mut [f64], x: &[f64]) {
            values[0] = 10.0 * x[0];
        }
    }

    #[test]
    fn defaults_work() -> Result<(), StrError> {
        let problem = Minimal {
            spatial: HomogeneousSpatialParams::new_isotropic(1, 1e-12, 0.3),
        };
        let grid = FvGrid::new_cell_centered(&SampleMeshes::two_segments())?;
        let mut bc = BoundaryTypes::new(1);
        bc.set_all_dirichlet();
        problem.boundary_types(&mut bc, grid.scvf(0));
        assert!(bc.is_neumann(0));
        let mut values = vec![0.0];
        assert_eq!(
            problem.dirichlet(&mut values, grid.scvf(0)).err(),
            Some("dirichlet_at_pos must be implemented when Dirichlet boundaries exist")
        );
        problem.initial(&mut values, grid.scv(1));
        assert_eq!(values[0], 15.0);
        let mut config = Config::new(1);
        config.set_enable_gravity(true)?;
        assert_eq!(problem.gravity(&config), &[-9.81]);
        Ok(())
    }

    #[test]
    fn homogeneous_spatial_params_work() {
        let mut spatial = HomogeneousSpatialParams::new_isotropic(2, 2.0, 0.4);
        assert_eq!(spatial.porosity_at_pos(&[0.0, 0.0]), 0.4);
        let kk = spatial.permeability_at_pos(&[0.0, 0.0]);
        assert_eq!(kk.get(1, 1), 2.0);
        assert_eq!(kk.get(0, 1), 0.0);
        assert!(spatial.material_law_params_at_pos(&[0.0, 0.0]).is_none());
        spatial.set_material_law(ParamMaterialLaw::sample_brooks_corey());
        assert!(spatial.material_law_params_at_pos(&[0.0, 0.0]).is_some());
    }
}
