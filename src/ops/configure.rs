//! Configure a platform build tree.
//!
//! Builds the platform's option schema, resolves the user's options against
//! the machine environment, and either hands the result to the generator or
//! returns it as a plan (`--dry-run`).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::builder::cmake::{CMake, Generator, GeneratorError, GeneratorInvocation};
use crate::core::environment::{EnvKey, Environment, EnvironmentError};
use crate::core::options::OptionsRecord;
use crate::core::platform::{registry_for, Platform};
use crate::core::schema::SchemaError;
use crate::resolver::{resolve_platform, ResolveError};
use crate::util::diagnostic::{suggestions, Diagnostic, UnavailablePlatformError};
use crate::util::fs::absolute_path;

/// How a plan is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `KEY=VALUE` lines followed by the generator command
    #[default]
    Text,
    /// A JSON object
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "invalid format '{}'; expected 'text' or 'json'",
                s
            )),
        }
    }
}

/// Options for configuring one platform.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Target platform
    pub platform: Platform,
    /// Parsed command-line options
    pub options: OptionsRecord,
    /// Source tree handed to the generator
    pub source_dir: PathBuf,
    /// Build tree; defaults to `build/<platform>`
    pub output_dir: Option<PathBuf>,
    /// Generator kind; defaults to the platform's first
    pub generator: Option<String>,
    /// Resolve only, don't run the generator
    pub dry_run: bool,
}

impl ConfigureOptions {
    /// Options with every default for a platform.
    pub fn new(platform: Platform) -> Self {
        ConfigureOptions {
            platform,
            options: OptionsRecord::new(),
            source_dir: PathBuf::from("."),
            output_dir: None,
            generator: None,
            dry_run: false,
        }
    }
}

/// Errors from `platconf <platform>`.
#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error(transparent)]
    Unavailable(#[from] UnavailablePlatformError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

impl From<EnvironmentError> for ConfigureError {
    fn from(err: EnvironmentError) -> Self {
        ConfigureError::Resolve(ResolveError::Environment(err))
    }
}

impl ConfigureError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::Unavailable(err) => err.to_diagnostic(),
            ConfigureError::Schema(err) => Diagnostic::error(err.to_string()),
            ConfigureError::Resolve(err) => err.to_diagnostic(),
            ConfigureError::Generator(err) => Diagnostic::error(err.to_string())
                .with_suggestion(suggestions::GENERATOR_FAILED.trim_start_matches("help: ")),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigureError::Generator(err) => err.exit_code(),
            _ => 1,
        }
    }
}

/// A fully resolved configuration, ready to run.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurePlan {
    /// Platform command name
    pub platform: &'static str,
    /// CMake executable that will be run
    pub cmake: PathBuf,
    #[serde(flatten)]
    pub invocation: GeneratorInvocation,
}

impl ConfigurePlan {
    /// The full command line, quoted for a shell.
    pub fn command_line(&self) -> String {
        self.invocation.command(&self.cmake).display_command()
    }

    /// Render the plan in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(format!(
                "{}\n{}\n",
                self.invocation.mapping,
                self.command_line()
            )),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(self)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// Resolve a platform's configuration without running anything.
pub fn plan(opts: &ConfigureOptions, env: &Environment) -> Result<ConfigurePlan, ConfigureError> {
    let platform = opts.platform;
    if !platform.is_available() {
        return Err(UnavailablePlatformError {
            platform: platform.command().to_string(),
            host: std::env::consts::OS,
        }
        .into());
    }

    let schema = registry_for(&[platform])?.into_schema(platform.command());

    let generator_kind = select_generator(platform, opts.generator.as_deref())?;

    tracing::debug!("resolving {} options", platform.command());
    let mapping = resolve_platform(platform, &opts.options, &schema, env)?;

    let install_prefix = env.prebuilt()?.join(platform.dir_name());
    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| Path::new("build").join(platform.command()));

    let invocation = GeneratorInvocation {
        generator_kind,
        source_dir: absolute(&opts.source_dir)?,
        output_dir: absolute(&output_dir)?,
        install_prefix: absolute(&install_prefix)?,
        mapping,
    };

    // A dry run is still useful on machines without cmake.
    let cmake = match env.get(EnvKey::CMake) {
        Some(path) => path.to_path_buf(),
        None if opts.dry_run => PathBuf::from("cmake"),
        None => return Err(EnvironmentError::missing(EnvKey::CMake).into()),
    };

    Ok(ConfigurePlan {
        platform: platform.command(),
        cmake,
        invocation,
    })
}

/// Resolve and, unless this is a dry run, run the given generator.
pub fn configure_with(
    opts: &ConfigureOptions,
    env: &Environment,
    generator: &dyn Generator,
) -> Result<ConfigurePlan, ConfigureError> {
    let plan = plan(opts, env)?;
    run(plan, opts.dry_run, generator)
}

/// Resolve and run the CMake executable from the environment.
pub fn configure(
    opts: &ConfigureOptions,
    env: &Environment,
) -> Result<ConfigurePlan, ConfigureError> {
    let plan = plan(opts, env)?;
    let cmake = CMake::new(&plan.cmake);
    run(plan, opts.dry_run, &cmake)
}

fn run(
    plan: ConfigurePlan,
    dry_run: bool,
    generator: &dyn Generator,
) -> Result<ConfigurePlan, ConfigureError> {
    if dry_run {
        tracing::debug!("dry run, not invoking the generator");
        return Ok(plan);
    }

    tracing::debug!("{}", plan.command_line());
    generator.generate(&plan.invocation)?;
    Ok(plan)
}

fn select_generator(platform: Platform, requested: Option<&str>) -> Result<String, ResolveError> {
    let kinds = platform.descriptor().generators;
    match requested {
        None => Ok(platform.default_generator().to_string()),
        Some(kind) => kinds
            .iter()
            .find(|k| k.eq_ignore_ascii_case(kind))
            .map(|k| k.to_string())
            .ok_or_else(|| ResolveError::InvalidChoice {
                option: "generator".to_string(),
                value: kind.to_string(),
                allowed: kinds.iter().map(|k| k.to_string()).collect(),
            }),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ResolveError> {
    absolute_path(path).map_err(|source| ResolveError::Path {
        path: path.to_path_buf(),
        source,
    })
}
