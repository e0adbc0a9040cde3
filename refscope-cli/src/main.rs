mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show refscope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("refscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Modules {
            path,
            cache,
            config,
            root,
            ildasm,
            output,
            raw,
        } => commands::modules::run(
            path,
            &commands::modules::ModulesOptions {
                cache: cache.as_deref(),
                configs: config,
                root: root.as_deref(),
                ildasm,
                output: output.as_deref(),
                raw: *raw,
            },
            &cli.global,
        ),
        Command::Conflicts {
            path,
            max_reports,
            msbuild,
            output,
            raw,
        } => commands::conflicts::run(
            path,
            *max_reports,
            msbuild,
            output.as_deref(),
            *raw,
            &cli.global,
        ),
        Command::Redirects { path } => commands::redirects::run(path, &cli.global),
    }
}
