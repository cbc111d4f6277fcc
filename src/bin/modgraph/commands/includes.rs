//! `modgraph includes` command

use anyhow::Result;

use crate::cli::IncludesArgs;
use modgraph::resolve;
use modgraph::util::diagnostic::suggestions;

pub fn execute(args: IncludesArgs) -> Result<()> {
    let (registry, options) = super::open_registry(&args.source)?;

    let plan = resolve(&registry, &options)?;

    let module = plan.module(&args.module).ok_or_else(|| {
        anyhow::anyhow!(
            "module `{}` not found\n{}",
            args.module,
            suggestions::MODULE_NOT_FOUND
        )
    })?;

    println!("Include paths for '{}':", module.name);
    println!();

    for (i, entry) in module.include_paths.iter().enumerate() {
        println!("  {}. {}", i + 1, entry.location.display());
        if entry.origin == module.name {
            println!("     Declared by: {}", entry.origin);
        } else {
            println!("     Inherited from: {}", entry.origin);
        }
        println!();
    }

    if module.include_paths.is_empty() {
        println!("  (no include paths)");
    }

    Ok(())
}
