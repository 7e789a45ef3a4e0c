//! platconf CLI - CMake configuration front end for engine target platforms

use anyhow::{Context, Result};
use clap::{ArgMatches, FromArgMatches};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::GlobalArgs;
use platconf::core::environment::EnvironmentError;
use platconf::core::platform::{available_platforms, registry_for};
use platconf::core::{Platform, SchemaRegistry};
use platconf::ops::ConfigureError;
use platconf::util::diagnostic::{self, Diagnostic};
use platconf::util::Shell;

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub args: GlobalArgs,
}

fn main() {
    let platforms = available_platforms();
    let registry = match registry_for(&platforms) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let matches = cli::build_cli(&registry, &platforms).get_matches();
    let args = match GlobalArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // Set up logging
    let filter = if args.verbose {
        EnvFilter::new("platconf=debug")
    } else {
        EnvFilter::new("platconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = GlobalOptions {
        shell: Shell::from_flags(args.quiet, args.verbose, args.color),
        args,
    };

    if let Err(e) = run(&registry, &matches, &global) {
        std::process::exit(report(&e, &global.shell));
    }
}

fn run(registry: &SchemaRegistry, matches: &ArgMatches, global: &GlobalOptions) -> Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };

    match name {
        "platforms" => commands::platforms::execute(),
        "env" => commands::env::execute(cli::EnvArgs::from_arg_matches(sub)?, global),
        "completions" => commands::completions::execute(
            cli::CompletionsArgs::from_arg_matches(sub)?,
            registry,
        ),
        platform => {
            let platform: Platform = platform.parse().map_err(anyhow::Error::msg)?;
            let schema = registry
                .get(name)
                .with_context(|| format!("no schema registered for `{}`", name))?;
            commands::configure::execute(platform, schema, sub, global)
        }
    }
}

/// Print an error and pick the exit code.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    let color = shell.use_color();

    if let Some(e) = err.downcast_ref::<ConfigureError>() {
        diagnostic::emit(&e.to_diagnostic(), color);
        return e.exit_code();
    }

    if let Some(e) = err.downcast_ref::<EnvironmentError>() {
        diagnostic::emit(&e.to_diagnostic(), color);
        return 1;
    }

    let mut diag = Diagnostic::error(err.to_string());
    for cause in err.chain().skip(1) {
        diag = diag.with_context(cause.to_string());
    }
    diagnostic::emit(&diag, color);
    1
}
