use super::{InteractionVolume, IvScv, LocalDof};
use crate::base::MPFA_SINGULARITY_TOL;
use crate::geometry::algebra::dot;
use crate::StrError;
use russell_lab::{mat_inverse, mat_mat_mul, mat_vec_mul, Matrix, Vector};

/// Holds the transmissibilities of one interaction volume
///
/// The normal flux across face `f` (oriented from its positive SCV) is
///
/// ```text
/// F_f = Σ_k T[f][k] u_k + g_f
/// ```
///
/// where `u` holds the knowns (cell values followed by Dirichlet values) and `g` is the
/// gravity contribution given by [LocalAssembler::assemble_gravity].
#[derive(Clone, Debug)]
pub struct IvTransmissibilities {
    /// Transmissibility matrix (faces × knowns)
    pub t: Matrix,

    /// Inverse of A (unknowns × unknowns)
    pub ainv: Matrix,

    /// A⁻¹ B (unknowns × knowns)
    pub ainv_b: Matrix,

    /// C A⁻¹ (faces × unknowns)
    pub c_ainv: Matrix,

    /// Transmissibilities seen from each negative SCV of branching faces (face → neg → knowns)
    pub outside_tij: Vec<Vec<Vec<f64>>>,

    /// Coefficients w = (K ν)·n A extr/detX of each negative SCV computed with its own normal (face → neg → dir)
    pub neg_omegas: Vec<Vec<Vec<f64>>>,

    /// Gravity coefficient α = extr n·(K g) of the positive SCV (per face)
    pub alpha_pos: Vec<f64>,

    /// Gravity coefficient of each negative SCV computed with its own normal (face → neg)
    pub alpha_negs: Vec<Vec<f64>>,
}

/// Holds the gravity contributions of one interaction volume
#[derive(Clone, Debug)]
pub struct IvGravity {
    /// Gravity flux of each face (positive side)
    pub g: Vec<f64>,

    /// Gravity flux seen from each negative SCV (face → neg)
    pub outside_g: Vec<Vec<f64>>,
}

/// Assembles the local systems of the MPFA-O method
///
/// For each face, flux continuity between the positive and the negative sides yields one
/// equation for the face unknown. Collecting them gives
///
/// ```text
/// A x = B u    (continuity at the unknown faces)
/// F = C x + D u    (fluxes at all faces)
/// ```
///
/// thus `T = C A⁻¹ B + D`, or `T = D` if there are no unknowns.
pub struct LocalAssembler {}

impl LocalAssembler {
    /// Computes w = (K ν)·n A extr/detX for each direction of a local SCV
    pub fn omegas(scv: &IvScv, kk: &Matrix, normal: &[f64], area: f64) -> Result<Vec<f64>, StrError> {
        let mut k_nu = Vector::new(kk.nrow());
        let mut res = Vec::with_capacity(scv.nu.len());
        for nu in &scv.nu {
            mat_vec_mul(&mut k_nu, 1.0, kk, &Vector::from(nu))?;
            res.push(dot(normal, k_nu.as_data()) * area * scv.extrusion / scv.det_x);
        }
        Ok(res)
    }

    /// Computes α = extr n·(K g) for a local SCV
    pub fn alpha(scv: &IvScv, kk: &Matrix, normal: &[f64], gravity: &[f64]) -> Result<f64, StrError> {
        let mut kg = Vector::new(kk.nrow());
        mat_vec_mul(&mut kg, 1.0, kk, &Vector::from(&gravity))?;
        Ok(scv.extrusion * dot(normal, kg.as_data()))
    }

    /// Assembles the transmissibilities of an interaction volume
    ///
    /// `perms` holds the permeability tensor of each local SCV (dim_world × dim_world).
    pub fn assemble(iv: &InteractionVolume, perms: &[Matrix], gravity: &[f64]) -> Result<IvTransmissibilities, StrError> {
        if perms.len() != iv.scvs.len() {
            return Err("the number of permeability tensors must equal the number of interaction volume SCVs");
        }
        let (nf, nu, nk) = (iv.faces.len(), iv.n_unknowns, iv.n_knowns);
        let mut aa = Matrix::new(nu, nu);
        let mut bb = Matrix::new(nu, nk);
        let mut cc = Matrix::new(nf, nu);
        let mut dd = Matrix::new(nf, nk);
        let mut neg_omegas = Vec::with_capacity(nf);
        let mut alpha_pos = Vec::with_capacity(nf);
        let mut alpha_negs = Vec::with_capacity(nf);

        for (fi, face) in iv.faces.iter().enumerate() {
            // positive side
            let pos = &iv.scvs[face.pos];
            let ww = LocalAssembler::omegas(pos, &perms[face.pos], &face.normal, face.area)?;
            alpha_pos.push(LocalAssembler::alpha(pos, &perms[face.pos], &face.normal, gravity)?);
            for (dir, other) in pos.faces.iter().enumerate() {
                let w = ww[dir];
                match iv.faces[*other].dof {
                    LocalDof::Unknown(o) => {
                        cc.set(fi, o, cc.get(fi, o) - w);
                        if let LocalDof::Unknown(cur) = face.dof {
                            aa.set(cur, o, aa.get(cur, o) - w);
                        }
                    }
                    LocalDof::Dirichlet(k) => {
                        dd.set(fi, k, dd.get(fi, k) - w);
                        if let LocalDof::Unknown(cur) = face.dof {
                            bb.set(cur, k, bb.get(cur, k) + w);
                        }
                    }
                }
                dd.set(fi, face.pos, dd.get(fi, face.pos) + w);
                if let LocalDof::Unknown(cur) = face.dof {
                    bb.set(cur, face.pos, bb.get(cur, face.pos) - w);
                }
            }

            // negative sides: their outward fluxes balance the positive one
            let mut face_omegas = Vec::with_capacity(face.negs.len());
            let mut face_alphas = Vec::with_capacity(face.negs.len());
            for (m, neg) in face.negs.iter().enumerate() {
                let scv = &iv.scvs[*neg];
                let ww = LocalAssembler::omegas(scv, &perms[*neg], &face.neg_normals[m], face.area)?;
                face_alphas.push(LocalAssembler::alpha(scv, &perms[*neg], &face.neg_normals[m], gravity)?);
                if let LocalDof::Unknown(cur) = face.dof {
                    for (dir, other) in scv.faces.iter().enumerate() {
                        let w = -ww[dir];
                        match iv.faces[*other].dof {
                            LocalDof::Unknown(o) => aa.set(cur, o, aa.get(cur, o) + w),
                            LocalDof::Dirichlet(k) => bb.set(cur, k, bb.get(cur, k) - w),
                        }
                        bb.set(cur, *neg, bb.get(cur, *neg) + w);
                    }
                }
                face_omegas.push(ww);
            }
            neg_omegas.push(face_omegas);
            alpha_negs.push(face_alphas);
        }

        // all-Dirichlet interaction volume
        if nu == 0 {
            return Ok(IvTransmissibilities {
                t: dd,
                ainv: Matrix::new(0, 0),
                ainv_b: Matrix::new(0, nk),
                c_ainv: Matrix::new(nf, 0),
                outside_tij: outside_tij(iv, &neg_omegas, &Matrix::new(0, nk)),
                neg_omegas,
                alpha_pos,
                alpha_negs,
            });
        }

        // T = C A⁻¹ B + D
        let mut ainv = Matrix::new(nu, nu);
        let det = mat_inverse(&mut ainv, &aa).map_err(|_| "the local matrix A of the interaction volume is singular")?;
        let mut max_aij = 0.0;
        for i in 0..nu {
            for j in 0..nu {
                max_aij = f64::max(max_aij, f64::abs(aa.get(i, j)));
            }
        }
        if !det.is_finite() || f64::abs(det) <= MPFA_SINGULARITY_TOL * f64::powi(max_aij, nu as i32) {
            return Err("the local matrix A of the interaction volume is singular");
        }
        let mut ainv_b = Matrix::new(nu, nk);
        mat_mat_mul(&mut ainv_b, 1.0, &ainv, &bb, 0.0)?;
        let mut c_ainv = Matrix::new(nf, nu);
        mat_mat_mul(&mut c_ainv, 1.0, &cc, &ainv, 0.0)?;
        let mut tt = dd;
        mat_mat_mul(&mut tt, 1.0, &cc, &ainv_b, 1.0)?;
        Ok(IvTransmissibilities {
            t: tt,
            outside_tij: outside_tij(iv, &neg_omegas, &ainv_b),
            ainv,
            ainv_b,
            c_ainv,
            neg_omegas,
            alpha_pos,
            alpha_negs,
        })
    }

    /// Assembles the gravity contributions of an interaction volume
    ///
    /// `rho` holds the density of each local SCV and `rho_dirichlet` the density at each face
    /// (only read for Dirichlet faces). The face density is the mean over the positive and all
    /// negative SCVs, so that a hydrostatic pressure distribution yields zero fluxes.
    pub fn assemble_gravity(
        iv: &InteractionVolume,
        trans: &IvTransmissibilities,
        rho: &[f64],
        rho_dirichlet: &[f64],
    ) -> Result<IvGravity, StrError> {
        let nf = iv.faces.len();
        let mut g = vec![0.0; nf];
        let mut sum_alphas = Vector::new(iv.n_unknowns);
        let mut rho_faces = vec![0.0; nf];
        for (fi, face) in iv.faces.iter().enumerate() {
            let rho_face = match face.dof {
                LocalDof::Dirichlet(_) => rho_dirichlet[fi],
                LocalDof::Unknown(_) => {
                    let sum = face.negs.iter().fold(rho[face.pos], |acc, neg| acc + rho[*neg]);
                    sum / ((face.negs.len() + 1) as f64)
                }
            };
            rho_faces[fi] = rho_face;
            let a_pos = trans.alpha_pos[fi] * rho_face * face.area;
            g[fi] += a_pos;
            if let LocalDof::Unknown(cur) = face.dof {
                sum_alphas[cur] -= a_pos;
                for alpha in &trans.alpha_negs[fi] {
                    sum_alphas[cur] -= alpha * rho_face * face.area;
                }
            }
        }
        if iv.n_unknowns == 0 {
            let outside_g = iv
                .faces
                .iter()
                .enumerate()
                .map(|(fi, face)| {
                    trans.alpha_negs[fi]
                        .iter()
                        .map(|alpha| alpha * rho_faces[fi] * face.area)
                        .collect()
                })
                .collect();
            return Ok(IvGravity { g, outside_g });
        }

        // project the imbalance through the local system
        let mut c_ainv_sum = Vector::new(nf);
        mat_vec_mul(&mut c_ainv_sum, 1.0, &trans.c_ainv, &sum_alphas)?;
        for fi in 0..nf {
            g[fi] += c_ainv_sum[fi];
        }
        let mut x = Vector::new(iv.n_unknowns);
        mat_vec_mul(&mut x, 1.0, &trans.ainv, &sum_alphas)?;
        let mut outside_g = Vec::with_capacity(nf);
        for (fi, face) in iv.faces.iter().enumerate() {
            let mut values = Vec::with_capacity(face.negs.len());
            for (m, neg) in face.negs.iter().enumerate() {
                let mut value = trans.alpha_negs[fi][m] * rho_faces[fi] * face.area;
                for (dir, other) in iv.scvs[*neg].faces.iter().enumerate() {
                    if let LocalDof::Unknown(o) = iv.faces[*other].dof {
                        value -= trans.neg_omegas[fi][m][dir] * x[o];
                    }
                }
                values.push(value);
            }
            outside_g.push(values);
        }
        Ok(IvGravity { g, outside_g })
    }
}

/// Computes the transmissibilities seen from the negative SCVs
fn outside_tij(iv: &InteractionVolume, neg_omegas: &[Vec<Vec<f64>>], ainv_b: &Matrix) -> Vec<Vec<Vec<f64>>> {
    let nk = iv.n_knowns;
    let mut res = Vec::with_capacity(iv.faces.len());
    for (fi, face) in iv.faces.iter().enumerate() {
        let mut per_neg = Vec::with_capacity(face.negs.len());
        for (m, neg) in face.negs.iter().enumerate() {
            let mut tij = vec![0.0; nk];
            for (dir, other) in iv.scvs[*neg].faces.iter().enumerate() {
                let w = neg_omegas[fi][m][dir];
                match iv.faces[*other].dof {
                    LocalDof::Unknown(o) => {
                        for k in 0..nk {
                            tij[k] -= w * ainv_b.get(o, k);
                        }
                    }
                    LocalDof::Dirichlet(k) => tij[k] -= w,
                }
                tij[*neg] += w;
            }
            per_neg.push(tij);
        }
        res.push(per_neg);
    }
    res
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
