use crate::StrError;
use russell_lab::Vector;
use russell_sparse::{Genie, LinSolver, SparseMatrix, Sym};

/// Defines the linear solver used by the Newton method
///
/// The solver must solve `K x = rhs` for a square sparse matrix and return an error if it
/// cannot (e.g., singular matrix).
pub trait LinearSolverBackend {
    /// Solves the linear system
    fn solve(&mut self, x: &mut Vector, kk: &mut SparseMatrix, rhs: &Vector, verbose: bool) -> Result<(), StrError>;
}

/// Implements a direct sparse solver (factorization followed by back-substitution)
pub struct DirectSolver<'a> {
    solver: LinSolver<'a>,
}

impl<'a> DirectSolver<'a> {
    /// Allocates a new instance
    pub fn new(genie: Genie) -> Result<Self, StrError> {
        Ok(DirectSolver {
            solver: LinSolver::new(genie)?,
        })
    }
}

impl<'a> LinearSolverBackend for DirectSolver<'a> {
    fn solve(&mut self, x: &mut Vector, kk: &mut SparseMatrix, rhs: &Vector, verbose: bool) -> Result<(), StrError> {
        self.solver.actual.factorize(kk, None)?;
        self.solver.actual.solve(x, kk, rhs, verbose)
    }
}

/// Holds variables to solve the global linear system
pub struct LinearSystem {
    /// Total number of global equations (number of DOFs × number of equations)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// Each element couples the equations of its SCVs to all DOFs of its stencil; in addition,
    /// one diagonal entry is reserved for each equation (constrained or non-owned rows).
    pub nnz_sup: usize,

    /// Holds the residual vector R
    pub rr: Vector,

    /// Holds the global Jacobian matrix K = ∂R/∂u
    pub kk: SparseMatrix,

    /// Holds the "minus-delta-U" vector (the solution of K mdu = R)
    pub mdu: Vector,
}

impl LinearSystem {
    /// Allocates a new instance
    pub fn new(n_equation: usize, nnz_sup: usize) -> Result<Self, StrError> {
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            rr: Vector::new(n_equation),
            kk: SparseMatrix::new_coo(n_equation, n_equation, nnz_sup, Sym::No)?,
            mdu: Vector::new(n_equation),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{DirectSolver, LinearSolverBackend, LinearSystem};
    use crate::StrError;
    use russell_lab::{vec_approx_eq, Vector};
    use russell_sparse::Genie;

    #[test]
    fn new_captures_errors() {
        assert!(LinearSystem::new(0, 1).is_err());
    }

    #[test]
    fn direct_solver_works() -> Result<(), StrError> {
        //  2  1     x0     3
        //  1  3  ·  x1  =  5
        let mut ls = LinearSystem::new(2, 4)?;
        ls.kk.put(0, 0, 2.0)?;
        ls.kk.put(0, 1, 1.0)?;
        ls.kk.put(1, 0, 1.0)?;
        ls.kk.put(1, 1, 3.0)?;
        ls.rr[0] = 3.0;
        ls.rr[1] = 5.0;
        let mut solver = DirectSolver::new(Genie::Umfpack)?;
        solver.solve(&mut ls.mdu, &mut ls.kk, &ls.rr, false)?;
        vec_approx_eq(ls.mdu.as_data(), &[0.8, 1.4], 1e-14);
        Ok(())
    }
}
