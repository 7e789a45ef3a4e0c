//! `platconf completions` command
//!
//! Generates shell completions for the platform commands this host offers.

use std::io;

use anyhow::Result;
use clap_complete::generate;

use crate::cli::{build_cli, CompletionsArgs};
use platconf::core::platform::available_platforms;
use platconf::core::SchemaRegistry;

pub fn execute(args: CompletionsArgs, registry: &SchemaRegistry) -> Result<()> {
    let mut cmd = build_cli(registry, &available_platforms());
    let name = cmd.get_name().to_string();

    generate(args.shell, &mut cmd, name, &mut io::stdout());

    Ok(())
}
