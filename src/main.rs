//! Main entry point for the zipack CLI app

use tracing::warn;
use tracing_subscriber::EnvFilter;
use zipack::archive::{self, ArchiveFormat};
use zipack::cli::{self, Commands};
use zipack::scan::{self, ScanOptions};

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::Create {
            inputs,
            output,
            keep_parent,
            symlink,
            exclude,
            allow_git,
            disable_ignore,
            level,
            format,
        } => {
            let opts = ScanOptions {
                symlink: *symlink,
                keep_parent: *keep_parent,
                allow_git: *allow_git,
                excludes: exclude.clone(),
                disable_ignore: *disable_ignore,
            };
            let resolution = scan::resolve_entries(inputs, &opts);

            for conflict in &resolution.conflicts {
                warn!(
                    excluded = %conflict.conflicting_path.display(),
                    kept = %conflict.conflicting_with_path.display(),
                    "archive path conflict"
                );
            }
            if resolution.entries.is_empty() {
                return Err("nothing to archive: all inputs were empty, missing or excluded".into());
            }

            let format = (*format)
                .or_else(|| ArchiveFormat::from_path(output))
                .unwrap_or(ArchiveFormat::Zip);
            archive::create_archive(&resolution.entries, output, format, *level)?;
            println!(
                "{}: {} entries ({} conflicts, {} broken links)",
                output.display(),
                resolution.entries.len(),
                resolution.conflicts.len(),
                resolution.broken_links.len(),
            );
        }
        Commands::Extract { archive, output } => {
            let dest = output.clone().unwrap_or_else(|| std::path::PathBuf::from("."));
            archive::extract_archive(archive, &dest)?;
        }
        Commands::List { archive, json } => {
            archive::list_archive(archive, *json)?;
        }
    }

    Ok(())
}
