//! Command dispatch: resolves settings, wires services, renders output

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::{BundleOptions, BundleService, BundledEdge, Stroke};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

/// JSON document emitted by `edges --json`.
#[derive(Debug, Serialize)]
struct EdgesDocument<'a> {
    split_depth: u32,
    edges: &'a [BundledEdge],
    strokes: Vec<Stroke>,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = resolve_settings(cli)?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { file } => _tree(&container, file),
        Commands::Links { file, json } => _links(&container, file, *json),
        Commands::Layout { file, json } => _layout(&container, file, *json),
        Commands::Edges {
            file,
            split_depth,
            beta,
            json,
            output,
        } => {
            let mut options = container.bundle_options();
            if let Some(k) = split_depth {
                options.split_depth = *k;
            }
            if let Some(b) = beta {
                options.beta = *b;
            }
            _edges(&container, file, &options, *json, output.as_deref())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => _config_show(&container),
            ConfigCommands::Path => _config_path(&container, cli.config.as_deref()),
        },
        Commands::Completion { .. } => Ok(()),
    }
}

/// Layered settings with global command line flags on top.
fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(delimiter) = &cli.delimiter {
        settings.delimiter = delimiter.clone();
    }
    if let Some(root) = &cli.implicit_root {
        settings.implicit_root = Some(root.clone());
    }
    settings.validate()?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn check_input(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    if container.fs.exists(file) && !container.fs.is_file(file) {
        return Err(CliError::InvalidArgs(format!(
            "not a file: {}",
            file.display()
        )));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    check_input(container, file)?;
    let service = &container.bundle_service;
    let records = service.load_records(file)?;
    let hierarchy = service.build(&records, &container.bundle_options())?;
    output::info(&hierarchy.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _links(container: &ServiceContainer, file: &Path, json: bool) -> CliResult<()> {
    check_input(container, file)?;
    let service = &container.bundle_service;
    let records = service.load_records(file)?;
    let hierarchy = service.build(&records, &container.bundle_options())?;
    let summaries = BundleService::leaf_summaries(&hierarchy);

    if json {
        let text = serde_json::to_string_pretty(&summaries).map_err(InfraError::from)?;
        output::info(&text);
        return Ok(());
    }

    output::header(&format!("{} leaves", summaries.len()));
    for summary in &summaries {
        output::detail(&format!(
            "{} (out: {}, in: {})",
            summary.name, summary.outgoing, summary.incoming
        ));
    }
    for summary in summaries.iter().filter(|s| !s.dangling.is_empty()) {
        output::warning(&format!(
            "{}: unresolved references: {}",
            summary.name,
            summary.dangling.iter().join(", ")
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _layout(container: &ServiceContainer, file: &Path, json: bool) -> CliResult<()> {
    check_input(container, file)?;
    let mut options = container.bundle_options();
    // placements do not depend on fragments
    options.split_depth = 0;
    let bundled = container.bundle_service.bundle_file(file, &options)?;
    let placements = bundled.placements();

    if json {
        let text = serde_json::to_string_pretty(&placements).map_err(InfraError::from)?;
        output::info(&text);
        return Ok(());
    }

    for p in &placements {
        output::info(&format!(
            "{}\t{:.4}\t{:.2}\t{:.2},{:.2}\t{:?}",
            p.name, p.angle, p.radius, p.x, p.y, p.anchor
        ));
    }
    Ok(())
}

#[instrument(skip(container, options))]
fn _edges(
    container: &ServiceContainer,
    file: &Path,
    options: &BundleOptions,
    json: bool,
    out: Option<&Path>,
) -> CliResult<()> {
    check_input(container, file)?;
    let bundled = container.bundle_service.bundle_file(file, options)?;
    debug!("edges: {} bundled", bundled.edges.len());

    let text = if json {
        let doc = EdgesDocument {
            split_depth: bundled.split_depth,
            edges: &bundled.edges,
            strokes: bundled.strokes(),
        };
        serde_json::to_string_pretty(&doc).map_err(InfraError::from)?
    } else {
        bundled
            .edges
            .iter()
            .flat_map(|edge| {
                edge.fragments.iter().map(move |f| {
                    format!(
                        "{}\t{}\t{}\t{}\t{}",
                        edge.source, edge.target, f.index, f.color, f.path
                    )
                })
            })
            .join("\n")
    };

    match out {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            container
                .fs
                .write(path, &text)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!(
                "{} edges written to {}",
                bundled.edges.len(),
                path.display()
            ));
        }
        None => output::info(&text),
    }
    Ok(())
}

fn _config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}

fn _config_path(container: &ServiceContainer, explicit: Option<&Path>) -> CliResult<()> {
    let mark = |p: &Path| {
        if container.fs.exists(p) {
            "exists"
        } else {
            "missing"
        }
    };

    match global_config_path() {
        Some(p) => output::action("global", &format!("{} ({})", p.display(), mark(&p))),
        None => output::warning("no config directory for this platform"),
    }
    let local = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| local_config_path(Path::new(".")));
    output::action("local", &format!("{} ({})", local.display(), mark(&local)));
    Ok(())
}
