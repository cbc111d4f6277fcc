//! `modgraph tree` command

use std::collections::HashSet;

use anyhow::Result;
use petgraph::graph::NodeIndex;

use crate::cli::TreeArgs;
use modgraph::resolver::DependencyGraph;
use modgraph::util::diagnostic::suggestions;
use modgraph::Visibility;

pub fn execute(args: TreeArgs) -> Result<()> {
    let (registry, _) = super::open_registry(&args.source)?;

    let graph = DependencyGraph::build(&registry.snapshot()?)?;

    let root = graph.node(&args.module).ok_or_else(|| {
        anyhow::anyhow!(
            "module `{}` not found\n{}",
            args.module,
            suggestions::MODULE_NOT_FOUND
        )
    })?;

    let printer = TreePrinter {
        graph: &graph,
        max_depth: args.depth.unwrap_or(usize::MAX),
        dynamic: args.dynamic,
    };

    let mut seen = HashSet::new();
    printer.print(root, None, 0, &mut seen);

    Ok(())
}

struct TreePrinter<'a> {
    graph: &'a DependencyGraph,
    max_depth: usize,
    dynamic: bool,
}

impl TreePrinter<'_> {
    fn print(
        &self,
        node: NodeIndex,
        visibility: Option<Visibility>,
        depth: usize,
        seen: &mut HashSet<NodeIndex>,
    ) {
        if depth > self.max_depth {
            return;
        }

        // Repeated subtrees (and cycles) are printed once
        let is_duplicate = !seen.insert(node);

        let prefix = if depth == 0 {
            String::new()
        } else {
            format!("{}├── ", "│   ".repeat(depth - 1))
        };

        let label = match visibility {
            Some(visibility) => format!(" ({})", visibility),
            None => String::new(),
        };
        let external = if self.graph.module(node).is_external() {
            " [external]"
        } else {
            ""
        };
        let dup_marker = if is_duplicate { " (*)" } else { "" };

        println!(
            "{}{}{}{}{}",
            prefix,
            self.graph.name(node),
            label,
            external,
            dup_marker
        );

        if is_duplicate {
            return;
        }

        let show_dynamic = self.dynamic;
        let deps = self
            .graph
            .deps(node, |visibility| show_dynamic || visibility.is_static());
        for (dep, visibility) in deps {
            self.print(dep, Some(visibility), depth + 1, seen);
        }
    }
}
