use super::{BoundaryTypes, ElementVolumeVariables, Model, Problem, VolumeVariables};
use crate::base::{BcKind, Config, Method};
use crate::geometry::GridGeometry;
use crate::mpfa::InteractionRegions;
use crate::StrError;
use russell_lab::{Matrix, Vector};
use std::borrow::Cow;

/// Computes the residual of the balance equations of one element
///
/// The residual of each SCV of the element reads
///
/// ```text
/// r = (S(u) − S(u_old))/Δt V extr − q V extr + Σ_faces F
/// ```
///
/// where `S` is the storage, `q` the source, and `F` the mass flux leaving the SCV. The
/// global system is R(u) = 0.
pub struct LocalResidual<'a> {
    /// Grid geometry
    pub(crate) grid: &'a dyn GridGeometry,

    /// Initial and boundary value problem
    pub(crate) problem: &'a dyn Problem,

    /// Physical model
    pub(crate) model: &'a dyn Model,

    /// Configuration parameters
    pub(crate) config: &'a Config,

    /// Gravity vector
    pub(crate) gravity: Vec<f64>,

    /// Indicates a non-zero gravity vector
    pub(crate) gravity_active: bool,

    /// Boundary types of each boundary SCVF
    pub(crate) bc_types: Vec<Option<BoundaryTypes>>,

    /// Dirichlet values of each boundary SCVF with at least one Dirichlet equation (cell-centered)
    pub(crate) dirichlet_values: Vec<Option<Vec<f64>>>,

    /// Volume variables of each boundary SCVF with only Dirichlet equations (cell-centered)
    pub(crate) dirichlet_volvars: Vec<Option<VolumeVariables>>,

    /// Dirichlet values of each DOF and equation (box)
    pub(crate) dof_dirichlet: Vec<Vec<Option<f64>>>,

    /// Interaction volumes (MPFA only)
    pub(crate) regions: Option<InteractionRegions>,
}

impl<'a> LocalResidual<'a> {
    /// Allocates a new instance
    pub fn new(
        grid: &'a dyn GridGeometry,
        problem: &'a dyn Problem,
        model: &'a dyn Model,
        config: &'a Config,
    ) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            log::error!("{}", msg);
            return Err("cannot allocate local residual because config.validate() failed");
        }
        if config.method.cell_centered() == grid.vertex_centered() {
            return Err("the discretization method does not match the grid");
        }
        if config.ndim != grid.dim_world() {
            return Err("config.ndim must equal the dimension of the world");
        }
        let num_eq = model.num_eq();
        if num_eq == 0 {
            return Err("the model must have at least one equation");
        }
        let gravity = problem.gravity(config);
        if gravity.len() != grid.dim_world() {
            return Err("the gravity vector must have length equal to the dimension of the world");
        }
        let gravity_active = gravity.iter().any(|g| *g != 0.0);

        // boundary types
        let nf = grid.n_scvf();
        let mut bc_types = vec![None; nf];
        for f in 0..nf {
            let scvf = grid.scvf(f);
            if !scvf.boundary {
                continue;
            }
            let mut bc = BoundaryTypes::new(num_eq);
            problem.boundary_types(&mut bc, scvf);
            if bc.num_eq() != num_eq {
                return Err("the boundary types must have one entry per equation");
            }
            bc_types[f] = Some(bc);
        }

        let mut res = LocalResidual {
            grid,
            problem,
            model,
            config,
            gravity,
            gravity_active,
            bc_types,
            dirichlet_values: vec![None; nf],
            dirichlet_volvars: vec![None; nf],
            dof_dirichlet: Vec::new(),
            regions: None,
        };
        if grid.vertex_centered() {
            res.init_box_dirichlet()?;
        } else {
            res.init_cell_centered_boundaries()?;
        }
        if config.method == Method::CcMpfa {
            let spatial = problem.spatial_params();
            let perms: Vec<Matrix> = (0..grid.n_element())
                .map(|e| spatial.permeability_at_pos(&grid.scv(e).center))
                .collect();
            let bc_types = &res.bc_types;
            let is_dirichlet = |f: usize| bc_types[f].as_ref().map_or(false, |bc| bc.has_dirichlet());
            res.regions = Some(InteractionRegions::new(grid, &perms, &res.gravity, is_dirichlet)?);
        }
        Ok(res)
    }

    /// Returns the number of equations
    pub fn num_eq(&self) -> usize {
        self.model.num_eq()
    }

    /// Returns the Dirichlet value of a DOF and equation (box method only)
    pub fn dof_dirichlet(&self, dof: usize, eq: usize) -> Option<f64> {
        self.dof_dirichlet.get(dof).and_then(|values| values[eq])
    }

    /// Computes the volume variables of a degree of freedom
    pub fn volume_variables(&self, dof: usize, primary: &[f64], extrusion: f64) -> Result<VolumeVariables, StrError> {
        let mut volvars = VolumeVariables::new(self.model.num_eq(), self.model.num_eq(), self.grid.dim_world());
        self.model.update(
            &mut volvars,
            primary,
            self.problem.spatial_params(),
            self.grid.dof_position(dof),
            extrusion,
        )?;
        Ok(volvars)
    }

    /// Computes the residual of an element
    ///
    /// Returns the residual of each SCV of the element (`r[local_scv * num_eq + eq]`).
    /// `prev` holds the volume variables of all DOFs at the previous time and is only read by
    /// transient problems.
    pub fn eval(
        &self,
        element: usize,
        cur: &ElementVolumeVariables,
        prev: Option<&[VolumeVariables]>,
        dt: f64,
    ) -> Result<Vector, StrError> {
        let neq = self.model.num_eq();
        let scvs = self.grid.element_scvs(element);
        let mut rr = Vector::new(scvs.len() * neq);
        let mut values = vec![0.0; neq];
        let mut values_old = vec![0.0; neq];

        // storage and source terms
        for (l, s) in scvs.iter().enumerate() {
            let scv = self.grid.scv(*s);
            let volvars = cur.get(scv.dof);
            let factor = scv.volume * volvars.extrusion;
            if !self.config.stationary {
                let prev = prev.ok_or("previous volume variables are required by transient problems")?;
                if dt <= 0.0 {
                    return Err("the time step size must be positive");
                }
                self.model.storage(volvars, &mut values);
                self.model.storage(&prev[scv.dof], &mut values_old);
                for eq in 0..neq {
                    rr[l * neq + eq] += (values[eq] - values_old[eq]) / dt * factor;
                }
            }
            values.fill(0.0);
            self.problem.source(&mut values, scv, volvars);
            for eq in 0..neq {
                rr[l * neq + eq] -= values[eq] * factor;
            }
        }

        // fluxes
        let local = |scv: usize| scvs.iter().position(|s| *s == scv).ok_or("SCV does not belong to the element");
        for f in self.grid.element_scvfs(element) {
            let scvf = self.grid.scvf(*f);
            let a = local(scvf.inside)?;
            if !scvf.boundary {
                if self.grid.vertex_centered() {
                    let b = local(scvf.outside[0])?;
                    for phase in 0..neq {
                        let flux = self.advective_flux(scvf, phase, cur, None)?;
                        rr[a * neq + phase] += flux;
                        rr[b * neq + phase] -= flux;
                    }
                } else {
                    for phase in 0..neq {
                        rr[a * neq + phase] += self.advective_flux(scvf, phase, cur, None)?;
                    }
                }
                continue;
            }

            // boundary face
            let bc = self.bc_types[*f].as_ref().ok_or("boundary types of a boundary face are missing")?;
            let inside = cur.get(self.grid.scv(scvf.inside).dof);
            let boundary = if !self.grid.vertex_centered() && bc.has_dirichlet() {
                Some(self.boundary_volvars(*f, inside)?)
            } else {
                None
            };
            if bc.has_neumann() {
                values.fill(0.0);
                self.problem.neumann(&mut values, scvf, inside);
            }
            for eq in 0..neq {
                match bc.kind(eq) {
                    BcKind::Dirichlet => {
                        // box: the assembler replaces the rows of Dirichlet DOFs
                        if let Some(bvv) = boundary.as_deref() {
                            rr[a * neq + eq] += self.advective_flux(scvf, eq, cur, Some(bvv))?;
                        }
                    }
                    BcKind::Neumann => rr[a * neq + eq] += values[eq] * scvf.area * inside.extrusion,
                    BcKind::Outflow => rr[a * neq + eq] += self.outflow_flux(scvf, eq, cur)?,
                }
            }
        }
        Ok(rr)
    }

    /// Returns the volume variables at a cell-centered Dirichlet face
    ///
    /// Equations without Dirichlet conditions take the primary variables of the inside cell.
    pub(crate) fn boundary_volvars(&self, scvf: usize, inside: &VolumeVariables) -> Result<Cow<VolumeVariables>, StrError> {
        if let Some(volvars) = &self.dirichlet_volvars[scvf] {
            return Ok(Cow::Borrowed(volvars));
        }
        let bc = self.bc_types[scvf].as_ref().ok_or("boundary types of a boundary face are missing")?;
        let dirichlet = self.dirichlet_values[scvf]
            .as_ref()
            .ok_or("Dirichlet values of a boundary face are missing")?;
        let mut primary = inside.primary.clone();
        for eq in 0..primary.len() {
            if bc.is_dirichlet(eq) {
                primary[eq] = dirichlet[eq];
            }
        }
        let face = self.grid.scvf(scvf);
        let mut volvars = VolumeVariables::new(self.model.num_eq(), self.model.num_eq(), self.grid.dim_world());
        self.model.update(
            &mut volvars,
            &primary,
            self.problem.spatial_params(),
            &face.center,
            inside.extrusion,
        )?;
        Ok(Cow::Owned(volvars))
    }

    /// Computes the Dirichlet data and checks the boundary conditions of cell-centered grids
    fn init_cell_centered_boundaries(&mut self) -> Result<(), StrError> {
        let grid = self.grid;
        let num_eq = self.model.num_eq();
        for f in 0..grid.n_scvf() {
            let bc = match &self.bc_types[f] {
                Some(bc) => bc.clone(),
                None => continue,
            };
            let scvf = grid.scvf(f);
            if bc.has_outflow() {
                self.outflow_neighbor(scvf)?;
            }
            if !bc.has_dirichlet() {
                continue;
            }
            if self.config.method == Method::CcMpfa && !bc.has_only_dirichlet() {
                return Err("MPFA-O requires boundary faces with either only Dirichlet or no Dirichlet conditions");
            }
            let mut values = vec![0.0; num_eq];
            self.problem.dirichlet(&mut values, scvf)?;
            if bc.has_only_dirichlet() {
                let mut volvars = VolumeVariables::new(num_eq, num_eq, grid.dim_world());
                self.model.update(
                    &mut volvars,
                    &values,
                    self.problem.spatial_params(),
                    &scvf.center,
                    grid.scv(scvf.inside).extrusion,
                )?;
                self.dirichlet_volvars[f] = Some(volvars);
            }
            self.dirichlet_values[f] = Some(values);
        }
        Ok(())
    }

    /// Collects the Dirichlet values of the DOFs of box grids
    ///
    /// A DOF is constrained for one equation if any boundary face touching it is; the value is
    /// evaluated at the DOF position.
    fn init_box_dirichlet(&mut self) -> Result<(), StrError> {
        let num_eq = self.model.num_eq();
        let mut dof_dirichlet = vec![vec![None; num_eq]; self.grid.n_dof()];
        let mut values = vec![0.0; num_eq];
        for f in 0..self.grid.n_scvf() {
            let bc = match &self.bc_types[f] {
                Some(bc) => bc,
                None => continue,
            };
            if !bc.has_dirichlet() {
                continue;
            }
            let dof = self.grid.scv(self.grid.scvf(f).inside).dof;
            self.problem.dirichlet_at_pos(&mut values, self.grid.vertex(dof))?;
            for eq in 0..num_eq {
                if bc.is_dirichlet(eq) {
                    dof_dirichlet[dof][eq] = Some(values[eq]);
                }
            }
        }
        self.dof_dirichlet = dof_dirichlet;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
