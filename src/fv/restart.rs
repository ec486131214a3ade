use crate::StrError;
use russell_lab::Vector;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the primary unknowns as text: one line per DOF with the components separated by two spaces
pub fn write_restart_to<W: Write>(writer: &mut W, uu: &Vector, num_eq: usize) -> Result<(), StrError> {
    if num_eq == 0 || uu.dim() % num_eq != 0 {
        return Err("the number of unknowns must be a multiple of the number of equations");
    }
    let data = uu.as_data();
    for dof in 0..uu.dim() / num_eq {
        let line: Vec<String> = data[dof * num_eq..(dof + 1) * num_eq]
            .iter()
            .map(|v| format!("{:?}", v))
            .collect();
        writeln!(writer, "{}", line.join("  ")).map_err(|_| "cannot write restart data")?;
    }
    Ok(())
}

/// Reads the primary unknowns written by [write_restart_to]
///
/// Fields are whitespace-delimited. The number of lines must equal `n_dof` and each line must
/// hold `num_eq` values.
pub fn read_restart_from<R: BufRead>(reader: R, n_dof: usize, num_eq: usize) -> Result<Vector, StrError> {
    let mut uu = Vector::new(n_dof * num_eq);
    let mut dof = 0;
    for line in reader.lines() {
        let line = line.map_err(|_| "cannot read restart data")?;
        if line.trim().is_empty() {
            continue;
        }
        if dof == n_dof {
            return Err("the restart data has more lines than DOFs");
        }
        let mut eq = 0;
        for field in line.split_whitespace() {
            if eq == num_eq {
                return Err("the restart data has too many values in a line");
            }
            uu[dof * num_eq + eq] = field.parse().map_err(|_| "cannot parse restart value")?;
            eq += 1;
        }
        if eq != num_eq {
            return Err("the restart data has too few values in a line");
        }
        dof += 1;
    }
    if dof != n_dof {
        return Err("the restart data has fewer lines than DOFs");
    }
    Ok(uu)
}

/// Writes a restart file
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn write_restart<P>(full_path: &P, uu: &Vector, num_eq: usize) -> Result<(), StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
    }
    let file = File::create(&path).map_err(|_| "cannot create file")?;
    let mut writer = BufWriter::new(file);
    write_restart_to(&mut writer, uu, num_eq)?;
    writer.flush().map_err(|_| "cannot write file")?;
    Ok(())
}

/// Reads a restart file
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_restart<P>(full_path: &P, n_dof: usize, num_eq: usize) -> Result<Vector, StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    let input = File::open(path).map_err(|_| "cannot open file")?;
    read_restart_from(BufReader::new(input), n_dof, num_eq)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
