//! `platconf env` command

use anyhow::Result;

use crate::cli::EnvArgs;
use crate::GlobalOptions;
use platconf::core::platform::available_platforms;
use platconf::ops::{env_report, format_report, OutputFormat};
use platconf::util::GlobalContext;

pub fn execute(args: EnvArgs, global: &GlobalOptions) -> Result<()> {
    let ctx = GlobalContext::new()?.with_env_file(global.args.env_file.clone());
    let (config, env) = ctx.load_environment()?;

    let platforms = available_platforms();
    let report = env_report(&ctx.env_layers(), &config, &env, &platforms);

    match args.format {
        OutputFormat::Text => print!("{}", format_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    for platform in platforms {
        if !report.is_complete_for(platform) {
            global
                .shell
                .warn(format!("`{}` is missing required paths", platform.command()));
        }
    }

    Ok(())
}
