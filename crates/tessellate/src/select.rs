//! Atom selection from GROMACS-style index (`.ndx`) files.
//!
//! Format: a `[ name ]` header line starts a group; following lines hold
//! whitespace-separated 1-based atom numbers. Groups are kept 0-based and in
//! file order.

use std::fmt;

use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexError {
    NumberBeforeHeader { line: usize },
    BadNumber { line: usize, token: String },
    EmptyName { line: usize },
    UnknownGroup(String),
    NoGroups,
    OutOfRange { atom: usize, natoms: usize },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumberBeforeHeader { line } => {
                write!(f, "line {line}: atom numbers before any [ group ] header")
            }
            Self::BadNumber { line, token } => {
                write!(f, "line {line}: '{token}' is not a 1-based atom number")
            }
            Self::EmptyName { line } => write!(f, "line {line}: empty group name"),
            Self::UnknownGroup(name) => write!(f, "no index group named '{name}'"),
            Self::NoGroups => write!(f, "index file has no groups"),
            Self::OutOfRange { atom, natoms } => {
                write!(f, "atom {atom} (0-based) outside a frame of {natoms} atoms")
            }
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexGroups {
    groups: Vec<(String, Vec<usize>)>,
}

impl IndexGroups {
    pub fn parse(text: &str) -> Result<Self, IndexError> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (k, raw) in text.lines().enumerate() {
            let line_no = k + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(inner) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let name = inner.trim();
                if name.is_empty() {
                    return Err(IndexError::EmptyName { line: line_no });
                }
                groups.push((name.to_string(), Vec::new()));
                continue;
            }
            let (_, atoms) = groups
                .last_mut()
                .ok_or(IndexError::NumberBeforeHeader { line: line_no })?;
            for token in line.split_whitespace() {
                match token.parse::<usize>() {
                    Ok(n) if n >= 1 => atoms.push(n - 1),
                    _ => {
                        return Err(IndexError::BadNumber {
                            line: line_no,
                            token: token.to_string(),
                        })
                    }
                }
            }
        }
        Ok(Self { groups })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(n, _)| n.as_str())
    }

    /// Atoms of group `name` (0-based).
    pub fn get(&self, name: &str) -> Result<&[usize], IndexError> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a.as_slice())
            .ok_or_else(|| IndexError::UnknownGroup(name.to_string()))
    }

    /// First group in the file, the default selection.
    pub fn first(&self) -> Result<(&str, &[usize]), IndexError> {
        self.groups
            .first()
            .map(|(n, a)| (n.as_str(), a.as_slice()))
            .ok_or(IndexError::NoGroups)
    }
}

/// Reduce a frame to the selected atoms, in selection order.
pub fn select(coords: &[Vector3<f64>], atoms: &[usize]) -> Result<Vec<Vector3<f64>>, IndexError> {
    atoms
        .iter()
        .map(|&a| {
            coords.get(a).copied().ok_or(IndexError::OutOfRange {
                atom: a,
                natoms: coords.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    const NDX: &str = "\
[ System ]
   1    2    3    4
   5

[ P ]
2 4
; comment line
5
";

    #[test]
    fn parses_groups_in_file_order() {
        let groups = IndexGroups::parse(NDX).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.names().collect::<Vec<_>>(), vec!["System", "P"]);
        assert_eq!(groups.get("P").unwrap(), &[1, 3, 4]);
        let (name, atoms) = groups.first().unwrap();
        assert_eq!(name, "System");
        assert_eq!(atoms, &[0, 1, 2, 3, 4]);
        assert_eq!(groups.get("Water"), Err(IndexError::UnknownGroup("Water".into())));
    }

    #[test]
    fn rejects_malformed_files() {
        assert_eq!(
            IndexGroups::parse("1 2\n[ a ]\n"),
            Err(IndexError::NumberBeforeHeader { line: 1 })
        );
        assert_eq!(
            IndexGroups::parse("[ a ]\n1 0\n"),
            Err(IndexError::BadNumber {
                line: 2,
                token: "0".into()
            })
        );
        assert_eq!(IndexGroups::parse("[  ]"), Err(IndexError::EmptyName { line: 1 }));
        assert_eq!(IndexGroups::parse("").unwrap().first(), Err(IndexError::NoGroups));
    }

    #[test]
    fn select_keeps_order_and_checks_range() {
        let coords: Vec<_> = (0..5).map(|i| vector![i as f64, 0.0, 0.0]).collect();
        let picked = select(&coords, &[4, 1]).unwrap();
        assert_eq!(picked, vec![vector![4.0, 0.0, 0.0], vector![1.0, 0.0, 0.0]]);
        assert_eq!(
            select(&coords, &[5]),
            Err(IndexError::OutOfRange { atom: 5, natoms: 5 })
        );
    }
}
