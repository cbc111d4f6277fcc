//! `modgraph order` command

use anyhow::Result;

use crate::cli::OrderArgs;
use modgraph::resolve;

pub fn execute(args: OrderArgs) -> Result<()> {
    let (registry, options) = super::open_registry(&args.source)?;

    let plan = resolve(&registry, &options)?;

    for name in plan.order() {
        println!("{}", name);
    }

    Ok(())
}
