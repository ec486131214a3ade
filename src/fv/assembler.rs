use super::{ElementVolumeVariables, LinearSystem, LocalResidual, VolumeVariables};
use crate::base::{Method, Partition};
use crate::mpfa::InteractionRegions;
use crate::StrError;
use russell_lab::Vector;
use russell_sparse::SparseMatrix;

/// Assembles the global residual vector and the Jacobian matrix
///
/// The solution vector holds the primary variables of each DOF contiguously
/// (`u[dof * num_eq + eq]`). The Jacobian is computed by forward differences of the element
/// residuals with respect to the primary variables of each DOF in the element stencil.
///
/// Only interior elements contribute. Rows of DOFs not owned by this process (DOFs of overlap
/// or ghost elements only) and rows constrained by Dirichlet conditions (box method) are
/// replaced by identity rows.
pub struct Assembler<'a> {
    /// Local residual
    pub residual: LocalResidual<'a>,

    /// DOFs coupled to each element
    stencils: Vec<Vec<usize>>,

    /// Indicates the DOFs owned by this process
    owned: Vec<bool>,

    /// Extrusion factor of each DOF
    extrusion: Vec<f64>,

    /// Total number of equations
    n_equation: usize,

    /// Supremum of the number of nonzero values of the Jacobian matrix
    nnz_sup: usize,
}

impl<'a> Assembler<'a> {
    /// Allocates a new instance
    pub fn new(residual: LocalResidual<'a>) -> Result<Self, StrError> {
        let grid = residual.grid;
        let neq = residual.num_eq();
        let ndof = grid.n_dof();
        let mut stencils = Vec::with_capacity(grid.n_element());
        let mut owned = vec![false; ndof];
        let mut extrusion = vec![1.0; ndof];
        let mut nnz_sup = ndof * neq;
        for e in 0..grid.n_element() {
            let stencil = match residual.config.method {
                Method::CcTpfa => {
                    let mut cells = vec![e];
                    for f in grid.element_scvfs(e) {
                        for s in &grid.scvf(*f).outside {
                            let dof = grid.scv(*s).dof;
                            if !cells.contains(&dof) {
                                cells.push(dof);
                            }
                        }
                    }
                    cells
                }
                Method::CcMpfa => InteractionRegions::stencil(grid, e),
                Method::Box => grid.cell_vertices(e).to_vec(),
            };
            for s in grid.element_scvs(e) {
                let scv = grid.scv(*s);
                extrusion[scv.dof] = scv.extrusion;
                if grid.partition(e) == Partition::Interior {
                    owned[scv.dof] = true;
                }
            }
            if grid.partition(e) == Partition::Interior {
                nnz_sup += grid.element_scvs(e).len() * neq * stencil.len() * neq;
            }
            stencils.push(stencil);
        }
        Ok(Assembler {
            residual,
            stencils,
            owned,
            extrusion,
            n_equation: ndof * neq,
            nnz_sup,
        })
    }

    /// Returns the total number of equations
    pub fn n_equation(&self) -> usize {
        self.n_equation
    }

    /// Allocates the linear system
    pub fn new_linear_system(&self) -> Result<LinearSystem, StrError> {
        LinearSystem::new(self.n_equation, self.nnz_sup)
    }

    /// Returns the DOFs coupled to an element
    pub fn stencil(&self, element: usize) -> &[usize] {
        &self.stencils[element]
    }

    /// Computes the volume variables of all DOFs
    pub fn volume_variables(&self, uu: &Vector) -> Result<Vec<VolumeVariables>, StrError> {
        if uu.dim() != self.n_equation {
            return Err("the solution vector has an incorrect dimension");
        }
        let neq = self.residual.num_eq();
        (0..self.residual.grid.n_dof())
            .map(|dof| {
                let primary = &uu.as_data()[dof * neq..(dof + 1) * neq];
                self.residual.volume_variables(dof, primary, self.extrusion[dof])
            })
            .collect()
    }

    /// Assembles the residual vector only
    ///
    /// `prev` holds the volume variables at the previous time (transient problems).
    pub fn assemble_residual(
        &self,
        rr: &mut Vector,
        uu: &Vector,
        prev: Option<&[VolumeVariables]>,
        dt: f64,
    ) -> Result<(), StrError> {
        let volvars = self.volume_variables(uu)?;
        let elem = ElementVolumeVariables::new(&volvars);
        rr.fill(0.0);
        let grid = self.residual.grid;
        let neq = self.residual.num_eq();
        for e in 0..grid.n_element() {
            if grid.partition(e) != Partition::Interior {
                continue;
            }
            let local = self.residual.eval(e, &elem, prev, dt)?;
            for (l, s) in grid.element_scvs(e).iter().enumerate() {
                let dof = grid.scv(*s).dof;
                for eq in 0..neq {
                    if self.free_row(dof, eq) {
                        rr[dof * neq + eq] += local[l * neq + eq];
                    }
                }
            }
        }
        self.set_constrained_rows(rr, uu, None)?;
        check_finite(rr)
    }

    /// Assembles the Jacobian matrix and the residual vector
    pub fn assemble(
        &self,
        kk: &mut SparseMatrix,
        rr: &mut Vector,
        uu: &Vector,
        prev: Option<&[VolumeVariables]>,
        dt: f64,
    ) -> Result<(), StrError> {
        let volvars = self.volume_variables(uu)?;
        let elem = ElementVolumeVariables::new(&volvars);
        rr.fill(0.0);
        kk.get_coo_mut()?.reset();
        let grid = self.residual.grid;
        let neq = self.residual.num_eq();
        let eps_base = self.residual.config.numeric_epsilon;
        for e in 0..grid.n_element() {
            if grid.partition(e) != Partition::Interior {
                continue;
            }
            let scvs = grid.element_scvs(e);
            let local = self.residual.eval(e, &elem, prev, dt)?;
            for (l, s) in scvs.iter().enumerate() {
                let dof = grid.scv(*s).dof;
                for eq in 0..neq {
                    if self.free_row(dof, eq) {
                        rr[dof * neq + eq] += local[l * neq + eq];
                    }
                }
            }

            // derivatives with respect to the DOFs of the stencil
            for j in &self.stencils[e] {
                let mut primary = volvars[*j].primary.clone();
                for k in 0..neq {
                    let u = primary[k];
                    let eps = eps_base * (f64::abs(u) + 1.0);
                    primary[k] = u + eps;
                    let perturbed = self.residual.volume_variables(*j, &primary, self.extrusion[*j])?;
                    primary[k] = u;
                    let elem_perturbed = ElementVolumeVariables::new_perturbed(&volvars, *j, &perturbed);
                    let local_perturbed = self.residual.eval(e, &elem_perturbed, prev, dt)?;
                    for (l, s) in scvs.iter().enumerate() {
                        let dof = grid.scv(*s).dof;
                        for eq in 0..neq {
                            if !self.free_row(dof, eq) {
                                continue;
                            }
                            let dr_du = (local_perturbed[l * neq + eq] - local[l * neq + eq]) / eps;
                            if !dr_du.is_finite() {
                                return Err("Jacobian matrix contains NaN or Inf");
                            }
                            kk.put(dof * neq + eq, j * neq + k, dr_du)?;
                        }
                    }
                }
            }
        }
        self.set_constrained_rows(rr, uu, Some(kk))?;
        check_finite(rr)
    }

    /// Returns true if a row is assembled from the local residuals
    fn free_row(&self, dof: usize, eq: usize) -> bool {
        self.owned[dof] && self.residual.dof_dirichlet(dof, eq).is_none()
    }

    /// Sets the identity rows of non-owned and Dirichlet (box) equations
    fn set_constrained_rows(&self, rr: &mut Vector, uu: &Vector, mut kk: Option<&mut SparseMatrix>) -> Result<(), StrError> {
        let neq = self.residual.num_eq();
        for dof in 0..self.owned.len() {
            for eq in 0..neq {
                if self.free_row(dof, eq) {
                    continue;
                }
                let row = dof * neq + eq;
                rr[row] = match self.residual.dof_dirichlet(dof, eq) {
                    Some(value) if self.owned[dof] => uu[row] - value,
                    _ => 0.0,
                };
                if let Some(kk) = kk.as_deref_mut() {
                    kk.put(row, row, 1.0)?;
                }
            }
        }
        Ok(())
    }
}

/// Checks that all entries of the residual vector are finite
fn check_finite(rr: &Vector) -> Result<(), StrError> {
    if rr.as_data().iter().any(|r| !r.is_finite()) {
        return Err("residual contains NaN or Inf");
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Assembler;
    use crate::base::{Config, Method, ParamFluid, Partition};
    use crate::fv::{BoundaryTypes, HomogeneousSpatialParams, LocalResidual, Problem, SpatialParams};
    use crate::geometry::{FvGrid, GridGeometry, SampleMeshes};
    use crate::models::OneP;
    use crate::StrError;
    use russell_lab::{approx_eq, Vector};

    struct LeftRight {
        spatial: HomogeneousSpatialParams,
    }

    impl Problem for LeftRight {
        fn spatial_params(&self) -> &dyn SpatialParams {
            &self.spatial
        }
        fn boundary_types_at_pos(&self, bc: &mut BoundaryTypes, x: &[f64]) {
            if x[0] < 1e-10 || x[0] > 1.0 - 1e-10 {
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

    fn problem() -> LeftRight {
        LeftRight {
            spatial: HomogeneousSpatialParams::new_isotropic(2, 1e-12, 0.2),
        }
    }

    #[test]
    fn stencils_work() -> Result<(), StrError> {
        let problem = problem();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let mesh = SampleMeshes::structured_2d(3, 3, 1.0, 1.0);
        let grid = FvGrid::new_cell_centered(&mesh)?;
        let mut config = Config::new(2);
        config.set_stationary(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        assert_eq!(assembler.stencil(4).len(), 5);
        assert_eq!(assembler.stencil(0).len(), 3);
        assert_eq!(assembler.n_equation(), 9);

        config.set_method(Method::CcMpfa)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        assert_eq!(assembler.stencil(4).len(), 9);

        config.set_method(Method::Box)?;
        let grid = FvGrid::new_box(&SampleMeshes::structured_triangles(2, 2, 1.0, 1.0))?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        assert_eq!(assembler.stencil(0).len(), 3);
        assert_eq!(assembler.n_equation(), 9);
        Ok(())
    }

    #[test]
    fn jacobian_matches_the_linear_operator() -> Result<(), StrError> {
        // single-phase incompressible flow is linear: R(u) = K u − b
        let problem = problem();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(3, 1, 1.0, 1.0))?;
        let mut config = Config::new(2);
        config.set_stationary(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut ls = assembler.new_linear_system()?;
        let uu = Vector::from(&[1.5e5, 1.4e5, 1.2e5]);
        assembler.assemble(&mut ls.kk, &mut ls.rr, &uu, None, 1.0)?;
        let kk = ls.kk.as_dense();

        // T = ρ/μ K A/Δx = 1e6 · 1e-12 · 1/(1/3) = 3e-6 between cells; 2T at the Dirichlet faces
        let t = 3e-6;
        approx_eq(kk.get(0, 0) / t, 3.0, 1e-6);
        approx_eq(kk.get(0, 1) / t, -1.0, 1e-6);
        approx_eq(kk.get(1, 1) / t, 2.0, 1e-6);
        approx_eq(kk.get(2, 2) / t, 3.0, 1e-6);
        assert_eq!(kk.get(0, 2), 0.0);

        // residual of the linear profile is zero
        let uu = Vector::from(&[2e5 - 1e5 / 6.0, 1.5e5, 1e5 + 1e5 / 6.0]);
        assembler.assemble_residual(&mut ls.rr, &uu, None, 1.0)?;
        for i in 0..3 {
            approx_eq(ls.rr[i], 0.0, 1e-12);
        }
        Ok(())
    }

    #[test]
    fn ghost_and_dirichlet_rows_are_identity() -> Result<(), StrError> {
        let problem = problem();
        let model = OneP::new(&ParamFluid::sample_water())?;
        let mut grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(3, 1, 1.0, 1.0))?;
        grid.set_partition(2, Partition::Ghost)?;
        let mut config = Config::new(2);
        config.set_stationary(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut ls = assembler.new_linear_system()?;
        let uu = Vector::from(&[1e5, 1e5, 1e5]);
        assembler.assemble(&mut ls.kk, &mut ls.rr, &uu, None, 1.0)?;
        let kk = ls.kk.as_dense();
        assert_eq!(ls.rr[2], 0.0);
        assert_eq!(kk.get(2, 2), 1.0);
        assert_eq!(kk.get(2, 1), 0.0);

        // overlap cells are not owned either
        let mut grid = FvGrid::new_cell_centered(&SampleMeshes::structured_2d(3, 1, 1.0, 1.0))?;
        grid.set_partition(2, Partition::Overlap)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut ls = assembler.new_linear_system()?;
        assembler.assemble(&mut ls.kk, &mut ls.rr, &uu, None, 1.0)?;
        let kk = ls.kk.as_dense();
        assert_eq!(ls.rr[2], 0.0);
        assert_eq!(kk.get(2, 2), 1.0);
        assert_eq!(kk.get(2, 1), 0.0);
        assert!(kk.get(1, 2) < 0.0);

        // box: the Dirichlet rows hold u − u_D
        config.set_method(Method::Box)?;
        let grid = FvGrid::new_box(&SampleMeshes::two_triangles())?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let mut ls = assembler.new_linear_system()?;
        let uu = Vector::from(&[1e5, 1e5, 1e5, 1e5]);
        assembler.assemble(&mut ls.kk, &mut ls.rr, &uu, None, 1.0)?;
        for dof in 0..grid.n_dof() {
            let x = grid.vertex(dof);
            approx_eq(ls.rr[dof], 1e5 - (2e5 - 1e5 * x[0]), 1e-10);
        }
        Ok(())
    }
}
