//! `modgraph plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use modgraph::resolve;

pub fn execute(args: PlanArgs) -> Result<()> {
    let (registry, options) = super::open_registry(&args.source)?;

    let plan = resolve(&registry, &options)?;

    match args.output {
        Some(path) => {
            plan.write_json(&path)?;
            tracing::info!("Wrote build plan to {}", path.display());
        }
        None => println!("{}", plan.to_json()?),
    }

    Ok(())
}
