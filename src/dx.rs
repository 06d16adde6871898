//! Diagnosis codes and sets of them.
//!
//! Codes arrive as plain integers (e.g. mapped ICD-10 identifiers). We never
//! interpret them; equality and ordering are the only operations we need.

use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_set, BTreeSet},
    fmt, iter, ops,
};

/// An integer diagnosis code, treated as opaque.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DxCode(i64);

impl DxCode {
    pub fn new(raw: i64) -> Self {
        DxCode(raw)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for DxCode {
    fn from(raw: i64) -> Self {
        DxCode(raw)
    }
}

impl fmt::Debug for DxCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for DxCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A set of diagnosis codes.
///
/// Iteration is always in ascending code order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSet {
    codes: BTreeSet<DxCode>,
}

impl CodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: DxCode) -> bool {
        self.codes.contains(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> iter::Copied<btree_set::Iter<'_, DxCode>> {
        self.codes.iter().copied()
    }

    pub fn insert(&mut self, code: DxCode) {
        self.codes.insert(code);
    }
}

impl FromIterator<DxCode> for CodeSet {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = DxCode>,
    {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeSet<DxCode>> for CodeSet {
    fn from(codes: BTreeSet<DxCode>) -> Self {
        Self { codes }
    }
}

/// Subtraction for `CodeSet`s is defined as the 'set minus' operation, i.e. A - B := the set of
/// all codes that are in A but *not* in B
impl ops::Sub<&CodeSet> for &CodeSet {
    type Output = CodeSet;
    fn sub(self, rhs: &CodeSet) -> Self::Output {
        CodeSet::from_iter(self.codes.difference(&rhs.codes).copied())
    }
}

impl fmt::Display for CodeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut codes = self.codes.iter();
        if let Some(code) = codes.next() {
            write!(f, "{}", code)?;
        }
        for code in codes {
            write!(f, ", {}", code)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use super::{CodeSet, DxCode};

    fn set(raw: &[i64]) -> CodeSet {
        raw.iter().copied().map(DxCode::new).collect()
    }

    #[test]
    fn set_minus() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[2, 4, 9]);
        assert_eq!(&a - &b, set(&[1, 3]));
        assert_eq!(&b - &a, set(&[9]));
        assert_eq!(&a - &CodeSet::new(), a);
    }

    #[test]
    fn iteration_is_ascending() {
        let mut codes = CodeSet::new();
        for raw in [5, -2, 5, 11, 0] {
            codes.insert(DxCode::new(raw));
        }
        assert_eq!(codes.len(), 4);
        let flat: Vec<i64> = codes.iter().map(DxCode::as_i64).collect();
        assert_eq!(flat, [-2, 0, 5, 11]);
    }

    #[test]
    fn display() {
        assert_eq!(set(&[3, 1, 2]).to_string(), "{1, 2, 3}");
        assert_eq!(CodeSet::new().to_string(), "{}");
    }
}
