//! `modgraph check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use modgraph::resolve;

pub fn execute(args: CheckArgs) -> Result<()> {
    let (registry, options) = super::open_registry(&args.source)?;

    let plan = resolve(&registry, &options)?;

    let dynamic: usize = plan.modules.iter().map(|m| m.dynamic.len()).sum();
    println!(
        "ok: {} modules resolve ({} runtime-loaded references)",
        plan.len(),
        dynamic
    );

    Ok(())
}
