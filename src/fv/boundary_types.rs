use crate::base::BcKind;

/// Holds the kind of boundary condition of each equation at one boundary face (or vertex)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundaryTypes {
    kinds: Vec<BcKind>,
}

impl BoundaryTypes {
    /// Allocates a new instance with Neumann conditions for all equations
    pub fn new(num_eq: usize) -> Self {
        BoundaryTypes {
            kinds: vec![BcKind::Neumann; num_eq],
        }
    }

    /// Returns the number of equations
    pub fn num_eq(&self) -> usize {
        self.kinds.len()
    }

    /// Returns the kind of boundary condition of an equation
    pub fn kind(&self, eq: usize) -> BcKind {
        self.kinds[eq]
    }

    /// Sets the kind of boundary condition of an equation
    pub fn set(&mut self, eq: usize, kind: BcKind) -> &mut Self {
        self.kinds[eq] = kind;
        self
    }

    pub fn set_all_dirichlet(&mut self) -> &mut Self {
        self.kinds.iter_mut().for_each(|k| *k = BcKind::Dirichlet);
        self
    }

    pub fn set_all_neumann(&mut self) -> &mut Self {
        self.kinds.iter_mut().for_each(|k| *k = BcKind::Neumann);
        self
    }

    pub fn set_all_outflow(&mut self) -> &mut Self {
        self.kinds.iter_mut().for_each(|k| *k = BcKind::Outflow);
        self
    }

    pub fn is_dirichlet(&self, eq: usize) -> bool {
        self.kinds[eq] == BcKind::Dirichlet
    }

    pub fn is_neumann(&self, eq: usize) -> bool {
        self.kinds[eq] == BcKind::Neumann
    }

    pub fn is_outflow(&self, eq: usize) -> bool {
        self.kinds[eq] == BcKind::Outflow
    }

    pub fn has_dirichlet(&self) -> bool {
        self.kinds.contains(&BcKind::Dirichlet)
    }

    pub fn has_neumann(&self) -> bool {
        self.kinds.contains(&BcKind::Neumann)
    }

    pub fn has_outflow(&self) -> bool {
        self.kinds.contains(&BcKind::Outflow)
    }

    pub fn has_only_dirichlet(&self) -> bool {
        self.kinds.iter().all(|k| *k == BcKind::Dirichlet)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
