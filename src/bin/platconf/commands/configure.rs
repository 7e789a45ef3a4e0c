//! `platconf <platform>` command

use std::time::Instant;

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches};

use crate::cli::{options_from_matches, ConfigureArgs};
use crate::GlobalOptions;
use platconf::core::options::OptionValue;
use platconf::core::schema::CommandSchema;
use platconf::core::Platform;
use platconf::ops::{configure, ConfigureOptions};
use platconf::util::fs::display_path;
use platconf::util::shell::format_duration;
use platconf::util::{GlobalContext, Status};

pub fn execute(
    platform: Platform,
    schema: &CommandSchema,
    matches: &ArgMatches,
    global: &GlobalOptions,
) -> Result<()> {
    let shell = &global.shell;
    let args = ConfigureArgs::from_arg_matches(matches)?;
    let start = Instant::now();

    let ctx = GlobalContext::new()?.with_env_file(global.args.env_file.clone());
    let (config, env) = ctx.load_environment()?;

    let mut options = options_from_matches(schema, matches);

    // --cpp falls back to the configured default
    if !options.contains("cpp") {
        options.insert("cpp", OptionValue::Text(config.cpp_std().to_string()));
    }
    if let Some(prefix_path) = &args.prefix_path {
        options.insert(
            "prefix_path",
            OptionValue::Text(prefix_path.display().to_string()),
        );
    }

    let opts = ConfigureOptions {
        platform,
        options,
        source_dir: args.source,
        output_dir: args.output,
        generator: args.generator,
        dry_run: args.dry_run,
    };

    if !opts.dry_run {
        shell.status(Status::Configuring, format!("{} build", platform));
    }

    let plan = configure(&opts, &env)?;

    if opts.dry_run {
        print!("{}", plan.render(args.format)?);
        return Ok(());
    }

    shell.verbose(plan.command_line());
    shell.status(
        Status::Finished,
        format!(
            "{} build tree in {} in {}",
            platform,
            display_path(&plan.invocation.output_dir),
            format_duration(start.elapsed())
        ),
    );

    Ok(())
}
