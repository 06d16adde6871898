//! The "new findings only" transformation over one patient's visits.

use crate::{
    dx::{CodeSet, DxCode},
    Visit,
};
use itertools::Itertools;

/// Deduplicate a visit's codes and sort them ascending.
///
/// The input order carries no meaning, so this is the canonical form of a
/// visit. Pure: normalizing an already-normal visit returns it unchanged.
pub fn normalize(codes: &[DxCode]) -> Visit {
    codes.iter().copied().sorted().dedup().collect()
}

/// Given a patient's visits (chronological), keep only the codes that were not
/// recorded at the immediately preceding visit.
///
/// The first visit is kept whole (normalized, never filtered). Every later
/// visit is compared against the *previous visit's full normalized set*, not
/// against everything seen so far, so a code can drop out for one visit and
/// reappear at the next. The comparison set is rebuilt from the normalized
/// visit each iteration, including codes that were filtered from the output.
pub fn keep_new_per_visit(visits: &[Visit]) -> Vec<Visit> {
    let mut result = Vec::with_capacity(visits.len());
    let mut prev = CodeSet::new();

    for (i, raw) in visits.iter().enumerate() {
        let visit = normalize(raw);
        let current: CodeSet = visit.iter().copied().collect();

        if i == 0 {
            result.push(visit);
        } else {
            result.push((&current - &prev).iter().collect());
        }

        prev = current;
    }
    result
}
