//! CLI definitions using clap.
//!
//! Global flags and the fixed subcommands are derived. Platform subcommands
//! are built at startup from each platform's option schema, so only the
//! platforms available on this host are offered.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Args, Command};

use platconf::core::options::{OptionValue, OptionsRecord};
use platconf::core::schema::{CommandSchema, SchemaRegistry};
use platconf::core::Platform;
use platconf::ops::OutputFormat;
use platconf::util::ColorChoice;

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Extra environment file layered over .platconf/env.toml
    #[arg(long, global = true, value_name = "PATH", env = "PLATCONF_ENV_FILE")]
    pub env_file: Option<PathBuf>,
}

/// Flags shared by every platform command that aren't part of its schema.
#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// Source tree to configure
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source: PathBuf,

    /// Build tree to generate into [default: build/<platform>]
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Generator kind [default: first listed]
    #[arg(short = 'G', long, value_name = "KIND")]
    pub generator: Option<String>,

    /// Where CMake looks for third-party packages [default: <dependencies>/<Platform>]
    #[arg(long, value_name = "DIR")]
    pub prefix_path: Option<PathBuf>,

    /// Print the resolved configuration instead of running the generator
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run: text, json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: OutputFormat,
}

/// `platconf env` flags.
#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Output format: text, json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: OutputFormat,
}

/// `platconf completions` flags.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Build the full command tree.
pub fn build_cli(registry: &SchemaRegistry, platforms: &[Platform]) -> Command {
    let root = Command::new("platconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate CMake build trees for every engine target platform")
        .subcommand_required(true)
        .arg_required_else_help(true);

    let mut root = GlobalArgs::augment_args(root);

    for platform in platforms {
        if let Some(schema) = registry.get(platform.command()) {
            root = root.subcommand(platform_command(*platform, schema));
        }
    }

    root.subcommand(Command::new("platforms").about("List target platforms and host availability"))
        .subcommand(EnvArgs::augment_args(
            Command::new("env").about("Show the loaded environment and where each path came from"),
        ))
        .subcommand(CompletionsArgs::augment_args(
            Command::new("completions").about("Generate shell completions"),
        ))
}

/// Build one platform subcommand from its schema.
fn platform_command(platform: Platform, schema: &CommandSchema) -> Command {
    let descriptor = platform.descriptor();

    let mut cmd = ConfigureArgs::augment_args(
        Command::new(descriptor.command).about(descriptor.about),
    )
    .mut_arg("generator", |arg| {
        arg.value_parser(PossibleValuesParser::new(descriptor.generators.iter().copied()))
            .ignore_case(true)
    });

    for component in &schema.components {
        let key = component.toggle_key();
        cmd = cmd.arg(
            Arg::new(key.clone())
                .long(key.replace('_', "-"))
                .action(ArgAction::SetTrue)
                .help(component.description.clone()),
        );

        if let Some(choices) = &component.choices {
            cmd = cmd.arg(
                Arg::new(component.name.clone())
                    .long(component.name.clone())
                    .value_name("BACKEND")
                    .value_parser(PossibleValuesParser::new(choices.values.clone()))
                    .conflicts_with(key)
                    .help(format!("{} backend to use", component.name)),
            );
        }
    }

    for library in schema.system_libraries.iter().filter(|l| l.supported) {
        let flag = library.flag();
        let no_flag = format!("no_{}", flag);
        cmd = cmd
            .arg(
                Arg::new(flag.clone())
                    .long(flag.clone())
                    .value_name("VERSION")
                    .value_parser(PossibleValuesParser::new(library.versions.clone()))
                    .help(format!("{} version to use", library.name)),
            )
            .arg(
                Arg::new(no_flag.clone())
                    .long(no_flag.replace('_', "-"))
                    .action(ArgAction::SetTrue)
                    .conflicts_with(flag)
                    .help(format!("build without {} support", library.name)),
            );
    }

    for library in &schema.libraries {
        let flag = library.flag();
        cmd = cmd.arg(
            Arg::new(flag.clone())
                .long(flag)
                .value_name("PATH")
                .help(format!("path to {}", library.name)),
        );
    }

    for spec in &schema.passthrough {
        let mut arg = Arg::new(spec.option.clone())
            .long(spec.option.clone())
            .help(spec.description.clone());
        if spec.format.is_list() {
            arg = arg.value_name("NAME").num_args(1..).action(ArgAction::Append);
        } else {
            arg = arg.value_name("VALUE");
        }
        cmd = cmd.arg(arg);
    }

    cmd
}

/// Collect the schema-driven options a platform command was given.
pub fn options_from_matches(schema: &CommandSchema, matches: &ArgMatches) -> OptionsRecord {
    let mut options = OptionsRecord::new();

    for component in &schema.components {
        let key = component.toggle_key();
        if matches.get_flag(&key) {
            options.insert(key, OptionValue::Flag(true));
        }
        if component.choices.is_some() {
            insert_text(&mut options, matches, &component.name);
        }
    }

    for library in schema.system_libraries.iter().filter(|l| l.supported) {
        let flag = library.flag();
        let no_flag = format!("no_{}", flag);
        if matches.get_flag(&no_flag) {
            options.insert(no_flag, OptionValue::Flag(true));
        }
        insert_text(&mut options, matches, &flag);
    }

    for library in &schema.libraries {
        insert_text(&mut options, matches, &library.flag());
    }

    for spec in &schema.passthrough {
        if spec.format.is_list() {
            if let Some(values) = matches.get_many::<String>(&spec.option) {
                options.insert(
                    spec.option.clone(),
                    OptionValue::List(values.cloned().collect()),
                );
            }
        } else {
            insert_text(&mut options, matches, &spec.option);
        }
    }

    options
}

fn insert_text(options: &mut OptionsRecord, matches: &ArgMatches, id: &str) {
    if let Some(value) = matches.get_one::<String>(id) {
        options.insert(id.to_string(), OptionValue::Text(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platconf::core::platform::registry_for;

    fn parse(platform: Platform, args: &[&str]) -> (OptionsRecord, ConfigureArgs) {
        let registry = registry_for(&[platform]).unwrap();
        let cli = build_cli(&registry, &[platform]);

        let mut argv = vec!["platconf", platform.command()];
        argv.extend_from_slice(args);
        let matches = cli.try_get_matches_from(argv).unwrap();

        let (_, sub) = matches.subcommand().unwrap();
        let schema = registry.get(platform.command()).unwrap();
        let configure = <ConfigureArgs as clap::FromArgMatches>::from_arg_matches(sub).unwrap();
        (options_from_matches(schema, sub), configure)
    }

    #[test]
    fn test_cli_is_consistent() {
        let registry = registry_for(&Platform::ALL).unwrap();
        build_cli(&registry, &Platform::ALL).debug_assert();
    }

    #[test]
    fn test_component_toggles() {
        let (options, args) = parse(Platform::Android, &["--no-sound", "--no-pch", "--dry-run"]);

        assert!(options.flag("no_sound"));
        assert!(options.flag("no_pch"));
        assert!(!options.flag("no_tests"));
        assert!(args.dry_run);
        assert_eq!(args.source, PathBuf::from("."));
    }

    #[test]
    fn test_library_paths_and_passthrough() {
        let (options, _) = parse(
            Platform::Android,
            &["--png", "/opt/png", "--api", "21", "--cpp", "17"],
        );

        assert_eq!(options.text("png"), Some("/opt/png"));
        assert_eq!(options.text("api"), Some("21"));
        assert_eq!(options.text("cpp"), Some("17"));
        assert!(!options.contains("zlib"));
    }

    #[test]
    fn test_codesign_list() {
        let (options, _) = parse(
            Platform::Ios,
            &["--identifier", "com.example.demo", "--codesign", "iPhone", "Developer"],
        );

        assert_eq!(options.text("identifier"), Some("com.example.demo"));
        assert_eq!(options.list("codesign"), Some(vec!["iPhone", "Developer"]));
    }

    #[test]
    fn test_desktop_qt_flags() {
        let (options, _) = parse(Platform::Windows, &["--qt", "qt5", "--renderer", "direct3d12"]);
        assert_eq!(options.text("qt"), Some("qt5"));
        assert_eq!(options.text("renderer"), Some("direct3d12"));

        let (options, _) = parse(Platform::Windows, &["--no-qt"]);
        assert!(options.flag("no_qt"));
    }

    #[test]
    fn test_mobile_has_no_qt_flag() {
        let registry = registry_for(&[Platform::Android]).unwrap();
        let cli = build_cli(&registry, &[Platform::Android]);

        assert!(cli
            .try_get_matches_from(["platconf", "android", "--qt", "qt5"])
            .is_err());
    }

    #[test]
    fn test_generator_choices() {
        let (_, args) = parse(Platform::Android, &["-G", "Ninja"]);
        assert_eq!(args.generator.as_deref(), Some("Ninja"));

        let registry = registry_for(&[Platform::Android]).unwrap();
        let cli = build_cli(&registry, &[Platform::Android]);
        assert!(cli
            .try_get_matches_from(["platconf", "android", "-G", "Xcode"])
            .is_err());
    }
}
