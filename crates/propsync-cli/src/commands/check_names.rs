use std::path::Path;
use std::process::ExitCode;

use matching::{duplicate_names, name_conflicts};

use crate::support::{read_document, CliError};

/// Report naming problems; exit 1 when capture would be refused.
pub fn run(document: &Path) -> Result<ExitCode, CliError> {
    let doc = read_document(document)?;
    let names: Vec<&str> = doc.geometries().iter().map(|g| g.name.as_str()).collect();

    let duplicates = duplicate_names(&names);
    let conflicts = name_conflicts(&names);

    for name in &duplicates {
        println!("duplicate: {name}");
    }
    for (short, long) in &conflicts {
        println!("conflict: \"{short}\" is contained in \"{long}\"");
    }
    if duplicates.is_empty() && conflicts.is_empty() {
        println!("{} geometry names ok", names.len());
    }

    Ok(if duplicates.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
