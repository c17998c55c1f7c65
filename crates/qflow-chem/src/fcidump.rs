//! FCIDUMP integral files.
//!
//! ```text
//!  &FCI NORB=2,NELEC=2,MS2=0,
//!   ORBSYM=1,1,
//!   ISYM=1,
//!  &END
//!   0.6744887663   1   1   1   1
//!  -1.2524635735   1   1   0   0
//!   0.7137539936   0   0   0   0
//! ```
//!
//! Orbital indices are 1-based. A line with all indices zero is the core
//! energy, `i j 0 0` a one-electron integral, `i 0 0 0` an orbital energy
//! (ignored), anything else a two-electron integral `(ij|kl)`. Only one
//! symmetry-unique representative of each integral needs to be present.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::error::{ChemError, ChemResult};
use crate::integrals::ElectronicIntegrals;

/// Header fields of an FCIDUMP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcidumpHeader {
    /// Number of orbitals.
    pub norb: usize,
    /// Number of electrons.
    pub nelec: usize,
    /// `2·S_z`.
    pub ms2: i32,
    /// Irrep label per orbital.
    pub orbsym: Vec<u32>,
    /// Irrep of the target state.
    pub isym: u32,
}

/// Read and parse an FCIDUMP file.
pub fn read(path: impl AsRef<Path>) -> ChemResult<ElectronicIntegrals> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ChemError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ints = parse(&text)?;
    info!(
        path = %path.display(),
        n_orbitals = ints.n_orbitals,
        n_electrons = ints.n_electrons,
        "loaded FCIDUMP integrals"
    );
    Ok(ints)
}

/// Parse FCIDUMP text.
pub fn parse(text: &str) -> ChemResult<ElectronicIntegrals> {
    let (header, body_start) = parse_header(text)?;
    let mut ints = ElectronicIntegrals::zeros(header.norb, header.nelec);
    ints.ms2 = header.ms2;

    for (offset, raw) in text.lines().skip(body_start).enumerate() {
        let line_no = body_start + offset + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 5 {
            return Err(parse_error(line_no, format!("expected 5 fields, found {}", fields.len())));
        }
        let value = parse_float(fields[0]).ok_or_else(|| {
            parse_error(line_no, format!("invalid integral value '{}'", fields[0]))
        })?;
        let mut idx = [0_usize; 4];
        for (slot, field) in idx.iter_mut().zip(&fields[1..]) {
            *slot = field
                .parse()
                .map_err(|_| parse_error(line_no, format!("invalid orbital index '{field}'")))?;
            if *slot > header.norb {
                return Err(parse_error(
                    line_no,
                    format!("orbital index {slot} exceeds NORB={}", header.norb),
                ));
            }
        }
        match idx {
            [0, 0, 0, 0] => ints.core_energy += value,
            [_, 0, 0, 0] => {}
            [i, j, 0, 0] if i > 0 && j > 0 => ints.set_one_body(i - 1, j - 1, value),
            [i, j, k, l] if i > 0 && j > 0 && k > 0 && l > 0 => {
                ints.set_two_body(i - 1, j - 1, k - 1, l - 1, value);
            }
            _ => {
                return Err(parse_error(
                    line_no,
                    format!("unrecognised index pattern {idx:?}"),
                ));
            }
        }
    }
    Ok(ints)
}

/// Serialize integrals as FCIDUMP text, one symmetry-unique entry per integral.
pub fn write(ints: &ElectronicIntegrals) -> String {
    let n = ints.n_orbitals;
    let mut out = String::new();
    let orbsym = vec!["1"; n].join(",");
    let _ = writeln!(
        out,
        " &FCI NORB={n},NELEC={},MS2={},\n  ORBSYM={orbsym},\n  ISYM=1,\n &END",
        ints.n_electrons, ints.ms2
    );
    for i in 0..n {
        for j in 0..=i {
            for k in 0..n {
                for l in 0..=k {
                    if (i * (i + 1) / 2 + j) < (k * (k + 1) / 2 + l) {
                        continue;
                    }
                    let v = ints.two_body[[i, j, k, l]];
                    if v != 0.0 {
                        let _ = writeln!(out, "{v:24.16e} {:4} {:4} {:4} {:4}", i + 1, j + 1, k + 1, l + 1);
                    }
                }
            }
        }
    }
    for i in 0..n {
        for j in 0..=i {
            let v = ints.one_body[[i, j]];
            if v != 0.0 {
                let _ = writeln!(out, "{v:24.16e} {:4} {:4} {:4} {:4}", i + 1, j + 1, 0, 0);
            }
        }
    }
    let _ = writeln!(out, "{:24.16e} {:4} {:4} {:4} {:4}", ints.core_energy, 0, 0, 0, 0);
    out
}

fn parse_error(line: usize, message: String) -> ChemError {
    ChemError::Parse { line, message }
}

/// Parse a float, accepting Fortran `D` exponents.
fn parse_float(field: &str) -> Option<f64> {
    field.replace(['D', 'd'], "E").parse().ok()
}

/// Parse the namelist header, returning it and the index of the first body line.
fn parse_header(text: &str) -> ChemResult<(FcidumpHeader, usize)> {
    let mut namelist = String::new();
    let mut body_start = None;
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("&END") || trimmed == "/" {
            body_start = Some(i + 1);
            break;
        }
        let content = match upper.find("&END") {
            Some(pos) => {
                body_start = Some(i + 1);
                &upper[..pos]
            }
            None => upper.as_str(),
        };
        namelist.push_str(content);
        namelist.push(',');
        if body_start.is_some() {
            break;
        }
    }
    let body_start = body_start.ok_or_else(|| parse_error(1, "header is not terminated by &END".into()))?;
    let namelist = namelist.trim_start().trim_start_matches("&FCI");

    let mut norb = None;
    let mut nelec = None;
    let mut ms2 = 0;
    let mut orbsym = Vec::new();
    let mut isym = 1;
    let mut current: Option<String> = None;
    for token in namelist.split([',', ' ', '\t']).filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => {
                current = Some(k.trim().to_string());
                (k.trim().to_string(), v.trim())
            }
            None => match &current {
                Some(k) => (k.clone(), token),
                None => continue,
            },
        };
        if value.is_empty() {
            continue;
        }
        let bad = || parse_error(1, format!("invalid value '{value}' for {key}"));
        match key.as_str() {
            "NORB" => norb = Some(value.parse().map_err(|_| bad())?),
            "NELEC" => nelec = Some(value.parse().map_err(|_| bad())?),
            "MS2" => ms2 = value.parse().map_err(|_| bad())?,
            "ORBSYM" => orbsym.push(value.parse().map_err(|_| bad())?),
            "ISYM" => isym = value.parse().map_err(|_| bad())?,
            _ => {}
        }
    }

    let header = FcidumpHeader {
        norb: norb.ok_or(ChemError::MissingField("NORB"))?,
        nelec: nelec.ok_or(ChemError::MissingField("NELEC"))?,
        ms2,
        orbsym,
        isym,
    };
    Ok((header, body_start))
}
