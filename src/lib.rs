//! Reduce per-patient visit histories to newly recorded diagnosis codes.
//!
//! The input is a JSON mapping from patient ID to that patient's visits in
//! chronological order, each visit a list of integer diagnosis codes. The
//! output has the same shape, but each visit after the first keeps only the
//! codes that were not present at the visit immediately before it.

mod dx;
pub mod novelty;

pub use anyhow::{Context, Error};
use qu::ick_use::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

pub use crate::dx::{CodeSet, DxCode};

pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
pub type PatientId = u64;

/// One clinical encounter's diagnosis codes, in recorded order.
///
/// Raw visits may contain duplicates and arrive unsorted; visits produced by
/// this crate are always strictly ascending with no repeats.
pub type Visit = Vec<DxCode>;

/// All patients' visit histories, keyed by patient ID.
///
/// Serializes as the raw mapping `{"<patient id>": [[code, ...], ...]}`, so
/// the on-disk format matches what upstream extracts produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientMap {
    els: BTreeMap<PatientId, Vec<Visit>>,
}

impl PatientMap {
    /// Load a patient map from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<PatientMap> {
            let reader = io::BufReader::new(fs::File::open(path)?);
            serde_json::from_reader(reader).map_err(Into::into)
        }
        let path = path.as_ref();
        inner(path)
            .with_context(|| format!("unable to load patient map from \"{}\"", path.display()))
    }

    /// Save this map as pretty-printed JSON.
    ///
    /// The data is written to a sibling `<path>.tmp` file and renamed into
    /// place, so a failure part way through never leaves a truncated file at
    /// `path`. On failure the temporary file is removed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result {
        fn inner(this: &PatientMap, path: &Path) -> Result {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("could not create parent directory")?;
            }
            if path_exists(path)? {
                event!(
                    Level::WARN,
                    "overwriting existing file at \"{}\"",
                    path.display()
                );
            }
            let tmp = tmp_path(path);
            let mut out = io::BufWriter::new(fs::File::create(&tmp)?);
            let write = (|| -> Result {
                serde_json::to_writer_pretty(&mut out, this)?;
                out.write_all(b"\n")?;
                out.flush()?;
                Ok(())
            })();
            drop(out);
            if let Err(e) = write {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            if let Err(e) = fs::rename(&tmp, path) {
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            Ok(())
        }
        let path = path.as_ref();
        inner(self, path)
            .with_context(|| format!("unable to save patient map to \"{}\"", path.display()))
    }

    /// Reduce every patient's visits to newly recorded codes only.
    ///
    /// Patients carry no cross-dependencies, so they are filtered in parallel
    /// and merged into a fresh map. Each patient's own visits are scanned
    /// strictly in order (visit i+1 is compared against visit i).
    pub fn keep_new_per_visit(&self) -> Self {
        self.els
            .par_iter()
            .map(|(id, visits)| (*id, novelty::keep_new_per_visit(visits)))
            .collect::<BTreeMap<_, _>>()
            .into()
    }

    /// Total number of codes across every visit of every patient.
    pub fn total_codes(&self) -> usize {
        self.els.values().flatten().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.els.len()
    }

    pub fn is_empty(&self) -> bool {
        self.els.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PatientId, &[Visit])> + '_ {
        self.els.iter().map(|(id, visits)| (*id, visits.as_slice()))
    }

    pub fn visits_for_patient(&self, id: PatientId) -> Option<&[Visit]> {
        self.els.get(&id).map(Vec::as_slice)
    }
}

impl From<BTreeMap<PatientId, Vec<Visit>>> for PatientMap {
    fn from(els: BTreeMap<PatientId, Vec<Visit>>) -> Self {
        Self { els }
    }
}

impl FromIterator<(PatientId, Vec<Visit>)> for PatientMap {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (PatientId, Vec<Visit>)>,
    {
        Self {
            els: iter.into_iter().collect(),
        }
    }
}

/// `path` with `.tmp` appended (not substituted for the extension).
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Converts a not found error to Ok(false)
pub fn path_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}
