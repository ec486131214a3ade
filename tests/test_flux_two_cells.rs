use pmflow::prelude::*;
use pmflow::StrError;
use russell_lab::{approx_eq, Vector};

struct TwoCells {
    spatial: HomogeneousSpatialParams,
}

impl Problem for TwoCells {
    fn spatial_params(&self) -> &dyn SpatialParams {
        &self.spatial
    }
    fn initial_at_pos(&self, values: &mut [f64], _x: &[f64]) {
        values[0] = 1e5;
    }
}

fn water(cc: f64) -> ParamFluid {
    ParamFluid {
        density: ParamRealDensity {
            cc,
            p_ref: 1e5,
            rho_ref: 1000.0,
        },
        viscosity: 1e-3,
    }
}

/// Returns the index of the SCVF of `element` shared with the other cell
fn interior_face(grid: &FvGrid, element: usize) -> usize {
    for f in 0..grid.n_scvf() {
        let scvf = grid.scvf(f);
        if !scvf.boundary && scvf.element == element {
            return f;
        }
    }
    usize::MAX
}

#[test]
fn two_cell_flux_goes_from_left_to_right() -> Result<(), StrError> {
    // 1 m cells, K = 1e-12 m², μ = 1e-3 Pa·s, ρ = 1000 kg/m³, w = 1, no gravity
    let problem = TwoCells {
        spatial: HomogeneousSpatialParams::new_isotropic(1, 1e-12, 0.2),
    };
    let model = OneP::new(&water(0.0))?;
    let grid = FvGrid::new_cell_centered(&SampleMeshes::structured_1d(2, 2.0))?;
    let mut config = Config::new(1);
    config.set_stationary(true)?.set_upwind_weight(1.0)?;
    let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;

    let uu = Vector::from(&[2e5, 1e5]);
    let volvars = assembler.volume_variables(&uu)?;
    let elem = ElementVolumeVariables::new(&volvars);

    // K/μ ρ Δp/Δx = 1e-12/1e-3 · 1000 · 1e5/1 = 0.1 kg/(m²·s)
    let left = grid.scvf(interior_face(&grid, 0));
    let flux = assembler.residual.advective_flux(left, 0, &elem, None)?;
    approx_eq(flux, 0.1, 1e-15);

    // seen from the right cell, the same flux enters
    let right = grid.scvf(interior_face(&grid, 1));
    let flux_back = assembler.residual.advective_flux(right, 0, &elem, None)?;
    approx_eq(flux + flux_back, 0.0, 1e-15);

    // reversed pressures reverse the flux
    let uu = Vector::from(&[1e5, 2e5]);
    let volvars = assembler.volume_variables(&uu)?;
    let elem = ElementVolumeVariables::new(&volvars);
    approx_eq(assembler.residual.advective_flux(left, 0, &elem, None)?, -0.1, 1e-15);
    Ok(())
}

#[test]
fn fluxes_are_antisymmetric_with_all_methods() -> Result<(), StrError> {
    let model = OneP::new(&water(4.5e-7))?;
    let mut kk = HomogeneousSpatialParams::new_isotropic(2, 1e-12, 0.2);
    kk.permeability.set(0, 1, 3e-13);
    kk.permeability.set(1, 0, 3e-13);
    let problem = TwoCells { spatial: kk };
    let cases = [
        (Method::CcTpfa, SampleMeshes::structured_2d(3, 3, 1.0, 1.0)),
        (Method::CcMpfa, SampleMeshes::distorted_quads()),
    ];
    for (method, mesh) in cases {
        let grid = FvGrid::new_cell_centered(&mesh)?;
        let mut config = Config::new(2);
        config.set_method(method)?.set_stationary(true)?.set_enable_gravity(true)?;
        let assembler = Assembler::new(LocalResidual::new(&grid, &problem, &model, &config)?)?;
        let values: Vec<f64> = (0..grid.n_dof()).map(|i| 1e5 + 1e3 * ((i * 7 % 5) as f64)).collect();
        let uu = Vector::from(&values);
        let volvars = assembler.volume_variables(&uu)?;
        let elem = ElementVolumeVariables::new(&volvars);
        for f in 0..grid.n_scvf() {
            let scvf = grid.scvf(f);
            if scvf.boundary {
                continue;
            }
            let twin = grid.flip_scvf(f, 0);
            let a = assembler.residual.advective_flux(scvf, 0, &elem, None)?;
            let b = assembler.residual.advective_flux(grid.scvf(twin), 0, &elem, None)?;
            approx_eq(a + b, 0.0, 1e-14 * f64::max(1.0, f64::abs(a)));
        }
    }
    Ok(())
}

#[test]
fn upwinding_depends_only_on_the_sign() {
    let (inside, outside) = (3.0, 5.0);
    for nf in [1e-30, 1.0, 1e20] {
        assert!(upstream_is_inside(nf));
        assert_eq!(upwind(1.0, nf, inside, outside), inside * nf);
        assert!(!upstream_is_inside(-nf));
        assert_eq!(upwind(1.0, -nf, inside, outside), -outside * nf);
    }
    // zero normal flux: the inside SCV is upstream
    assert!(upstream_is_inside(0.0));
    // partial upwinding
    approx_eq(upwind(0.75, 2.0, inside, outside), 2.0 * (0.75 * 3.0 + 0.25 * 5.0), 1e-15);
}
