use super::Assembler;
use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of a simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    /// Time
    pub t: f64,

    /// Time step size
    pub dt: f64,

    /// Number of accepted time steps
    pub timestep: usize,

    /// Primary unknowns {U} at the current time
    ///
    /// (n_dof × num_eq)
    pub uu: Vector,

    /// Primary unknowns at the last accepted time
    ///
    /// (n_dof × num_eq)
    pub uu_old: Vector,
}

impl State {
    /// Allocates a new instance with the initial values given by the problem
    pub fn new(assembler: &Assembler) -> Result<Self, StrError> {
        let grid = assembler.residual.grid;
        let problem = assembler.residual.problem;
        let config = assembler.residual.config;
        let neq = assembler.residual.num_eq();
        if grid.n_dof() == 0 {
            return Err("there are no degrees of freedom in the grid");
        }
        let mut uu = Vector::new(assembler.n_equation());
        let mut values = vec![0.0; neq];
        for s in 0..grid.n_scv() {
            let scv = grid.scv(s);
            problem.initial(&mut values, scv);
            for eq in 0..neq {
                uu[scv.dof * neq + eq] = values[eq];
            }
        }
        Ok(State {
            t: config.t_ini,
            dt: config.dt_ini,
            timestep: 0,
            uu: uu.clone(),
            uu_old: uu,
        })
    }

    /// Reads a JSON file containing the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(state)
    }

    /// Writes a JSON file with the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
