use clap::Parser;
use dx_novelty::PatientMap;
use qu::ick_use::*;
use std::path::PathBuf;

/// Rewrite a patient visit map so that each visit keeps only the diagnosis
/// codes not recorded at the visit immediately before it.
#[derive(Parser)]
struct Opt {
    /// JSON file mapping patient IDs to their chronological visits.
    input: PathBuf,
    /// Where to write the filtered map.
    output: PathBuf,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let patients = PatientMap::load(&opt.input)?;
    ensure!(
        !patients.is_empty(),
        "input \"{}\" parsed but contains no patients",
        opt.input.display()
    );

    let codes_before = patients.total_codes();
    let filtered = patients.keep_new_per_visit();
    let codes_after = filtered.total_codes();

    filtered.save(&opt.output)?;

    event!(
        Level::INFO,
        "{} patients processed: {} codes in, {} codes kept",
        patients.len(),
        codes_before,
        codes_after
    );
    Ok(())
}
