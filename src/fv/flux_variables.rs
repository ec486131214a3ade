use super::{ElementVolumeVariables, LocalResidual, VolumeVariables};
use crate::base::{DensityAverage, Method, SATURATION_WEIGHT_EPS};
use crate::geometry::algebra::{dot, scale, sub};
use crate::geometry::Scvf;
use crate::mpfa::{LocalAssembler, LocalDof};
use crate::StrError;
use russell_lab::{mat_vec_mul, Matrix, Vector};

/// Computes the density at a face from the (density, saturation) pairs of the adjacent SCVs
///
/// The saturation-weighted average uses the regularized weights `min(S/ε, 0.5)` so that an
/// almost empty SCV does not pollute the face density. If all weights vanish, the arithmetic
/// mean is returned.
pub fn face_density(average: DensityAverage, values: &[(f64, f64)]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().fold(0.0, |acc, (rho, _)| acc + rho) / n;
    match average {
        DensityAverage::Arithmetic => mean,
        DensityAverage::SaturationWeighted => {
            let mut sum_w = 0.0;
            let mut sum = 0.0;
            for (rho, s) in values {
                let w = f64::min(f64::max(s / SATURATION_WEIGHT_EPS, 0.0), 0.5);
                sum_w += w;
                sum += w * rho;
            }
            if sum_w > 0.0 {
                sum / sum_w
            } else {
                mean
            }
        }
    }
}

/// Returns true if the inside SCV is upstream of a face
///
/// A zero normal flux is treated as flowing outwards.
pub fn upstream_is_inside(normal_flux: f64) -> bool {
    normal_flux >= 0.0
}

/// Computes the advective mass flux by upwinding the quantity ρ kr/μ
///
/// `w = 1` is full upwinding and `w = 0.5` is central weighting.
pub fn upwind(weight: f64, normal_flux: f64, inside: f64, outside: f64) -> f64 {
    let (up, down) = if upstream_is_inside(normal_flux) {
        (inside, outside)
    } else {
        (outside, inside)
    };
    (weight * up + (1.0 - weight) * down) * normal_flux
}

/// Returns the flow potential h = p − ρ g·x
pub fn potential(pressure: f64, density: f64, gravity: &[f64], x: &[f64]) -> f64 {
    pressure - density * dot(gravity, x)
}

/// Computes the half transmissibility of a cell with respect to a face
///
/// ```text
/// t = A (K n)·d / |d|² extr    with   d = x_face − x_cell
/// ```
pub fn half_transmissibility(
    kk: &Matrix,
    normal: &[f64],
    area: f64,
    face_center: &[f64],
    cell_center: &[f64],
    extrusion: f64,
) -> Result<f64, StrError> {
    let d = sub(face_center, cell_center);
    let kn = permeability_times(kk, normal)?;
    Ok(area * dot(kn.as_data(), &d) / dot(&d, &d) * extrusion)
}

/// Computes the gradients of the linear shape functions of a triangle
pub fn triangle_shape_gradients(xx: &[&[f64]]) -> [[f64; 2]; 3] {
    let two_a = (xx[1][0] - xx[0][0]) * (xx[2][1] - xx[0][1]) - (xx[2][0] - xx[0][0]) * (xx[1][1] - xx[0][1]);
    [
        [(xx[1][1] - xx[2][1]) / two_a, (xx[2][0] - xx[1][0]) / two_a],
        [(xx[2][1] - xx[0][1]) / two_a, (xx[0][0] - xx[2][0]) / two_a],
        [(xx[0][1] - xx[1][1]) / two_a, (xx[1][0] - xx[0][0]) / two_a],
    ]
}

/// Computes the values of the linear shape functions of a triangle at a point
pub fn triangle_shape_values(xx: &[&[f64]], x: &[f64]) -> [f64; 3] {
    let grads = triangle_shape_gradients(xx);
    let mut values = [0.0; 3];
    for m in 0..3 {
        // N_m is one at corner m
        values[m] = 1.0 + grads[m][0] * (x[0] - xx[m][0]) + grads[m][1] * (x[1] - xx[m][1]);
    }
    values
}

/// Computes K v
fn permeability_times(kk: &Matrix, v: &[f64]) -> Result<Vector, StrError> {
    let mut kv = Vector::new(kk.nrow());
    mat_vec_mul(&mut kv, 1.0, kk, &Vector::from(&v))?;
    Ok(kv)
}

impl<'a> LocalResidual<'a> {
    /// Computes the advective mass flux of a phase across an interior or Dirichlet SCVF
    ///
    /// The flux is positive when leaving the inside SCV. `boundary` holds the volume
    /// variables at Dirichlet faces.
    pub fn advective_flux(
        &self,
        scvf: &Scvf,
        phase: usize,
        elem: &ElementVolumeVariables,
        boundary: Option<&VolumeVariables>,
    ) -> Result<f64, StrError> {
        let inside = elem.get(self.grid.scv(scvf.inside).dof);
        let normal_flux = match self.config.method {
            Method::CcTpfa => self.tpfa_normal_flux(scvf, phase, elem, boundary)?,
            Method::CcMpfa => self.mpfa_normal_flux(scvf, phase, elem)?,
            Method::Box => self.box_normal_flux(scvf, phase, elem, None)?,
        };
        let outside = match boundary {
            Some(bvv) => bvv.density_mobility(phase),
            None => {
                let n = scvf.outside.len();
                if n == 0 {
                    return Err("interior face without outside SCV");
                }
                scvf.outside.iter().fold(0.0, |acc, s| {
                    acc + elem.get(self.grid.scv(*s).dof).density_mobility(phase)
                }) / (n as f64)
            }
        };
        Ok(upwind(
            self.config.upwind_weight,
            normal_flux,
            inside.density_mobility(phase),
            outside,
        ))
    }

    /// Computes the mass flux of a phase across an outflow boundary face
    ///
    /// The potential gradient is extrapolated from the interior and the mobility of the
    /// inside SCV is used.
    pub fn outflow_flux(&self, scvf: &Scvf, phase: usize, elem: &ElementVolumeVariables) -> Result<f64, StrError> {
        let inside = elem.get(self.grid.scv(scvf.inside).dof);
        if self.grid.vertex_centered() {
            let normal_flux = self.box_normal_flux(scvf, phase, elem, Some(&inside.permeability))?;
            return Ok(inside.density_mobility(phase) * normal_flux);
        }
        let neighbor = self.outflow_neighbor(scvf)?;
        let xe = &self.grid.scv(scvf.inside).center;
        let xn = &self.grid.scv(neighbor).center;
        let outside = elem.get(self.grid.scv(neighbor).dof);
        let rho = inside.density[phase];
        let he = potential(inside.pressure[phase], rho, &self.gravity, xe);
        let hn = potential(outside.pressure[phase], rho, &self.gravity, xn);
        let d = sub(xe, xn);
        let kd = permeability_times(&inside.permeability, &d)?;
        let normal_flux = -dot(kd.as_data(), &scvf.unit_normal) * scvf.area * inside.extrusion * (he - hn) / dot(&d, &d);
        Ok(inside.density_mobility(phase) * normal_flux)
    }

    /// Returns the SCV across the face opposite to an outflow face
    pub(crate) fn outflow_neighbor(&self, scvf: &Scvf) -> Result<usize, StrError> {
        let kind = self.grid.cell_kind(scvf.element);
        let opposite = kind.opposite_face(scvf.local_face)?;
        let index = self
            .grid
            .element_face_scvf(scvf.element, opposite)
            .ok_or("outflow boundary requires an interior neighbor opposite to the boundary face")?;
        let other = self.grid.scvf(index);
        if other.outside.len() != 1 {
            return Err("outflow boundary requires an interior neighbor opposite to the boundary face");
        }
        Ok(other.outside[0])
    }

    /// Computes −(K ∇h)·n A extr with two-point fluxes
    fn tpfa_normal_flux(
        &self,
        scvf: &Scvf,
        phase: usize,
        elem: &ElementVolumeVariables,
        boundary: Option<&VolumeVariables>,
    ) -> Result<f64, StrError> {
        let avg = self.model.density_average();
        let scv = self.grid.scv(scvf.inside);
        let inside = elem.get(scv.dof);
        let ti = half_transmissibility(
            &inside.permeability,
            &scvf.unit_normal,
            scvf.area,
            &scvf.center,
            &scv.center,
            inside.extrusion,
        )?;
        let rho_sat = |vv: &VolumeVariables| (vv.density[phase], vv.saturation[phase]);

        // Dirichlet face
        if let Some(bvv) = boundary {
            let rho = face_density(avg, &[rho_sat(inside), rho_sat(bvv)]);
            let hi = potential(inside.pressure[phase], rho, &self.gravity, &scv.center);
            let hd = potential(bvv.pressure[phase], rho, &self.gravity, &scvf.center);
            return Ok(ti * (hi - hd));
        }

        // regular face
        if scvf.outside.len() == 1 {
            let other = self.grid.scv(scvf.outside[0]);
            let outside = elem.get(other.dof);
            let tj = half_transmissibility(
                &outside.permeability,
                &scale(&scvf.unit_normal, -1.0),
                scvf.area,
                &scvf.center,
                &other.center,
                outside.extrusion,
            )?;
            let sum = ti + tj;
            if sum == 0.0 {
                return Ok(0.0);
            }
            let rho = face_density(avg, &[rho_sat(inside), rho_sat(outside)]);
            let hi = potential(inside.pressure[phase], rho, &self.gravity, &scv.center);
            let hj = potential(outside.pressure[phase], rho, &self.gravity, &other.center);
            return Ok(ti * tj / sum * (hi - hj));
        }

        // branching face on a surface grid: eliminate the face potential
        let mut pairs = vec![rho_sat(inside)];
        let mut others = Vec::with_capacity(scvf.outside.len());
        for (m, s) in scvf.outside.iter().enumerate() {
            let other = self.grid.scv(*s);
            let outside = elem.get(other.dof);
            let twin = self.grid.scvf(self.grid.flip_scvf(scvf.index, m));
            let tj = half_transmissibility(
                &outside.permeability,
                &twin.unit_normal,
                twin.area,
                &twin.center,
                &other.center,
                outside.extrusion,
            )?;
            pairs.push(rho_sat(outside));
            others.push((tj, outside, other));
        }
        let rho = face_density(avg, &pairs);
        let hi = potential(inside.pressure[phase], rho, &self.gravity, &scv.center);
        let mut sum_t = ti;
        let mut sum_th = ti * hi;
        for (tj, outside, other) in &others {
            sum_t += tj;
            sum_th += tj * potential(outside.pressure[phase], rho, &self.gravity, &other.center);
        }
        if sum_t == 0.0 {
            return Ok(0.0);
        }
        Ok(ti * (hi - sum_th / sum_t))
    }

    /// Computes −(K ∇h)·n A extr with the MPFA-O transmissibilities
    fn mpfa_normal_flux(&self, scvf: &Scvf, phase: usize, elem: &ElementVolumeVariables) -> Result<f64, StrError> {
        let regions = self.regions.as_ref().ok_or("interaction regions are not available")?;
        let mut normal_flux = 0.0;
        for sub_face in &regions.sub_faces[scvf.index] {
            let iv = &regions.volumes[sub_face.iv];
            let mut knowns = vec![0.0; iv.n_knowns];
            let mut rho = Vec::with_capacity(iv.scvs.len());
            for (i, s) in iv.scvs.iter().enumerate() {
                let vv = elem.get(self.grid.scv(s.scv).dof);
                knowns[i] = vv.pressure[phase];
                rho.push(vv.density[phase]);
            }
            let mut rho_dirichlet = vec![0.0; iv.faces.len()];
            for (fi, face) in iv.faces.iter().enumerate() {
                if let LocalDof::Dirichlet(k) = face.dof {
                    let bvv = self.dirichlet_volvars[face.scvf]
                        .as_ref()
                        .ok_or("Dirichlet values of an interaction volume face are missing")?;
                    knowns[k] = bvv.pressure[phase];
                    rho_dirichlet[fi] = bvv.density[phase];
                }
            }
            let gravity = if self.gravity_active {
                Some(LocalAssembler::assemble_gravity(
                    iv,
                    &regions.transmissibilities[sub_face.iv],
                    &rho,
                    &rho_dirichlet,
                )?)
            } else {
                None
            };
            normal_flux += regions.sub_face_flux(sub_face, &knowns, gravity.as_ref());
        }
        Ok(normal_flux)
    }

    /// Computes −(K (∇p − ρ g))·n A extr with the gradient of the element shape functions
    ///
    /// The permeability is the mean over the inside and outside SCVs unless given.
    fn box_normal_flux(
        &self,
        scvf: &Scvf,
        phase: usize,
        elem: &ElementVolumeVariables,
        permeability: Option<&Matrix>,
    ) -> Result<f64, StrError> {
        let vertices = self.grid.cell_vertices(scvf.element);
        let xx: Vec<&[f64]> = vertices.iter().map(|v| self.grid.vertex(*v)).collect();
        let grads = triangle_shape_gradients(&xx);
        let shape = triangle_shape_values(&xx, &scvf.center);
        let mut grad_p = [0.0; 2];
        let mut rho = 0.0;
        for m in 0..3 {
            let vv = elem.get(vertices[m]);
            grad_p[0] += vv.pressure[phase] * grads[m][0];
            grad_p[1] += vv.pressure[phase] * grads[m][1];
            rho += vv.density[phase] * shape[m];
        }
        let inside = elem.get(self.grid.scv(scvf.inside).dof);
        let v = [grad_p[0] - rho * self.gravity[0], grad_p[1] - rho * self.gravity[1]];
        let kv = match permeability {
            Some(kk) => permeability_times(kk, &v)?,
            None => {
                let outside = elem.get(self.grid.scv(scvf.outside[0]).dof);
                let ki = permeability_times(&inside.permeability, &v)?;
                let ko = permeability_times(&outside.permeability, &v)?;
                Vector::from(&[0.5 * (ki[0] + ko[0]), 0.5 * (ki[1] + ko[1])])
            }
        };
        Ok(-dot(kv.as_data(), &scvf.unit_normal) * scvf.area * inside.extrusion)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
