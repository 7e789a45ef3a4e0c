//! Option schema registry.
//!
//! Every platform command declares the options it understands: component
//! toggles, third-party libraries, system libraries with selectable versions
//! and plain pass-through values. The registry keeps these declarations in
//! registration order, which fixes the order of the resolved mapping.

use std::collections::BTreeSet;

use thiserror::Error;

/// Error raised while building a command schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("option `{name}` is registered twice for command `{command}`")]
    DuplicateOption { command: String, name: String },
}

/// A togglable engine component (`pch`, `sound`, `renderer`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Option name, also the flag stem (`--no-sound`)
    pub name: String,
    /// Generator variable receiving the `ON`/`OFF` sentinel
    pub variable: String,
    /// Whether the component is built when no flag is given
    pub default: bool,
    /// Help text for the CLI
    pub description: String,
    /// Selectable values, for enum-valued components
    pub choices: Option<ChoiceSpec>,
    /// Name of an enum-valued feature this component can't be built without
    pub requires: Option<String>,
}

/// Selectable values of an enum-valued component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSpec {
    /// Generator variable receiving the selected value
    pub variable: String,
    /// Allowed values; the first one is the default
    pub values: Vec<String>,
}

impl ComponentSpec {
    /// Create a component that is enabled by default.
    pub fn new(name: impl Into<String>, variable: impl Into<String>) -> Self {
        ComponentSpec {
            name: name.into(),
            variable: variable.into(),
            default: true,
            description: String::new(),
            choices: None,
            requires: None,
        }
    }

    /// Set whether the component is enabled by default.
    pub fn default(mut self, enabled: bool) -> Self {
        self.default = enabled;
        self
    }

    /// Set the help text.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Make the component enum-valued.
    pub fn with_choices<I, S>(mut self, variable: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(ChoiceSpec {
            variable: variable.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Require another enum-valued feature to be enabled.
    pub fn requires(mut self, feature: impl Into<String>) -> Self {
        self.requires = Some(feature.into());
        self
    }

    /// Option key of the flag that flips the default.
    ///
    /// `no_<name>` for components enabled by default, `<name>` otherwise.
    pub fn toggle_key(&self) -> String {
        if self.default {
            format!("no_{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// A third-party library shipped with or located next to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySpec {
    /// Library name as it appears in the dependency root (`PNG`, `jsoncpp`)
    pub name: String,
    /// Whether the library is shipped inside the dependency root
    pub bundled: bool,
    /// Whether the library is configured when no path is given
    pub enabled_by_default: bool,
}

impl LibrarySpec {
    /// A library shipped inside the dependency root.
    pub fn bundled(name: impl Into<String>) -> Self {
        LibrarySpec {
            name: name.into(),
            bundled: true,
            enabled_by_default: true,
        }
    }

    /// A library the generator locates on the system.
    pub fn system(name: impl Into<String>) -> Self {
        LibrarySpec {
            bundled: false,
            ..LibrarySpec::bundled(name)
        }
    }

    /// Whether the library is configured when no path is given.
    pub fn default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    /// Generator variable for this library (`DC_PNG_LIBRARY`).
    pub fn variable(&self) -> String {
        format!("DC_{}_LIBRARY", self.name.to_uppercase())
    }

    /// Option key and flag stem (`png`).
    pub fn flag(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A library located by the generator itself, with a version selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLibrarySpec {
    /// Library name (`Qt`)
    pub name: String,
    /// Generator variable receiving the selected version
    pub variable: String,
    /// Allowed versions; the first one is the default
    pub versions: Vec<String>,
    /// Whether the library can be used on this command at all
    pub supported: bool,
}

impl SystemLibrarySpec {
    /// Option key and flag stem (`qt`).
    pub fn flag(&self) -> String {
        self.name.to_lowercase()
    }
}

/// How a pass-through value is written into the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassFormat {
    /// Copied as is
    Verbatim,
    /// List joined with single spaces
    SpaceJoined,
    /// Value prefixed with a fixed string (`android-`)
    Prefixed(&'static str),
}

impl PassFormat {
    /// Whether the option accepts several values.
    pub fn is_list(&self) -> bool {
        matches!(self, PassFormat::SpaceJoined)
    }
}

/// An optional value copied into the mapping when supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassThroughSpec {
    /// Option name and flag stem (`identifier`)
    pub option: String,
    /// Generator variable
    pub variable: String,
    /// Output formatting
    pub format: PassFormat,
    /// Help text for the CLI
    pub description: String,
}

impl PassThroughSpec {
    /// Create a verbatim pass-through.
    pub fn new(option: impl Into<String>, variable: impl Into<String>) -> Self {
        PassThroughSpec {
            option: option.into(),
            variable: variable.into(),
            format: PassFormat::Verbatim,
            description: String::new(),
        }
    }

    /// Set the output format.
    pub fn format(mut self, format: PassFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the help text.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// All options declared for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSchema {
    /// Command name (`android`)
    pub command: String,
    /// Component toggles, in registration order
    pub components: Vec<ComponentSpec>,
    /// System libraries, in registration order
    pub system_libraries: Vec<SystemLibrarySpec>,
    /// Third-party libraries, in registration order
    pub libraries: Vec<LibrarySpec>,
    /// Pass-through values, in registration order
    pub passthrough: Vec<PassThroughSpec>,
    /// Lower-cased names already taken
    names: BTreeSet<String>,
}

impl CommandSchema {
    /// Create an empty schema for a command.
    pub fn new(command: impl Into<String>) -> Self {
        CommandSchema {
            command: command.into(),
            ..CommandSchema::default()
        }
    }

    /// Find a component by name.
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Find a system library by name.
    pub fn system_library(&self, name: &str) -> Option<&SystemLibrarySpec> {
        self.system_libraries.iter().find(|l| l.name == name)
    }

    /// Find a library by name.
    pub fn library(&self, name: &str) -> Option<&LibrarySpec> {
        self.libraries.iter().find(|l| l.name == name)
    }

    fn claim(&mut self, name: &str) -> Result<(), SchemaError> {
        // Flags are lower-cased, so `Zlib` and `zlib` would collide on the CLI
        if !self.names.insert(name.to_lowercase()) {
            return Err(SchemaError::DuplicateOption {
                command: self.command.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Schemas for every registered command.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<CommandSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Add a togglable component.
    pub fn register(&mut self, command: &str, component: ComponentSpec) -> Result<(), SchemaError> {
        let schema = self.schema_mut(command);
        schema.claim(&component.name)?;
        schema.components.push(component);
        Ok(())
    }

    /// Add a third-party library.
    pub fn register_library(
        &mut self,
        command: &str,
        library: LibrarySpec,
    ) -> Result<(), SchemaError> {
        let schema = self.schema_mut(command);
        schema.claim(&library.name)?;
        schema.libraries.push(library);
        Ok(())
    }

    /// Add a system library with selectable versions.
    pub fn register_system_library(
        &mut self,
        command: &str,
        name: &str,
        variable: &str,
        versions: &[&str],
    ) -> Result<(), SchemaError> {
        let schema = self.schema_mut(command);
        schema.claim(name)?;
        schema.system_libraries.push(SystemLibrarySpec {
            name: name.to_string(),
            variable: variable.to_string(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            supported: true,
        });
        Ok(())
    }

    /// Declare a system library that doesn't exist for this command.
    ///
    /// The library gets no CLI options but still owns its variable, so the
    /// resolver can tell "not applicable" apart from "never declared".
    pub fn register_unsupported_system_library(
        &mut self,
        command: &str,
        name: &str,
        variable: &str,
    ) -> Result<(), SchemaError> {
        let schema = self.schema_mut(command);
        schema.claim(name)?;
        schema.system_libraries.push(SystemLibrarySpec {
            name: name.to_string(),
            variable: variable.to_string(),
            versions: Vec::new(),
            supported: false,
        });
        Ok(())
    }

    /// Add a pass-through value.
    pub fn register_passthrough(
        &mut self,
        command: &str,
        spec: PassThroughSpec,
    ) -> Result<(), SchemaError> {
        let schema = self.schema_mut(command);
        schema.claim(&spec.option)?;
        schema.passthrough.push(spec);
        Ok(())
    }

    /// Get the schema of a command.
    pub fn get(&self, command: &str) -> Option<&CommandSchema> {
        self.schemas.iter().find(|s| s.command == command)
    }

    /// Iterate over schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSchema> {
        self.schemas.iter()
    }

    /// Take one command's schema out of the registry. A command that was
    /// never registered yields an empty schema.
    pub fn into_schema(mut self, command: &str) -> CommandSchema {
        match self.schemas.iter().position(|s| s.command == command) {
            Some(index) => self.schemas.swap_remove(index),
            None => CommandSchema::new(command),
        }
    }

    fn schema_mut(&mut self, command: &str) -> &mut CommandSchema {
        let index = match self.schemas.iter().position(|s| s.command == command) {
            Some(index) => index,
            None => {
                self.schemas.push(CommandSchema::new(command));
                self.schemas.len() - 1
            }
        };
        &mut self.schemas[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = SchemaRegistry::new();
        registry
            .register("android", ComponentSpec::new("sound", "DC_SOUND_ENABLED"))
            .unwrap();
        registry
            .register("android", ComponentSpec::new("pch", "DC_USE_PCH"))
            .unwrap();
        registry.register_library("android", LibrarySpec::bundled("PNG")).unwrap();
        registry.register_library("android", LibrarySpec::bundled("Lua")).unwrap();

        let schema = registry.get("android").unwrap();
        let components: Vec<_> = schema.components.iter().map(|c| c.name.as_str()).collect();
        let libraries: Vec<_> = schema.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(components, vec!["sound", "pch"]);
        assert_eq!(libraries, vec!["PNG", "Lua"]);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_library("windows", LibrarySpec::bundled("Zlib")).unwrap();

        let err = registry
            .register_library("windows", LibrarySpec::bundled("zlib"))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateOption {
                command: "windows".to_string(),
                name: "zlib".to_string(),
            }
        );

        // Components and libraries share one namespace
        registry
            .register("windows", ComponentSpec::new("sound", "DC_SOUND_ENABLED"))
            .unwrap();
        assert!(registry
            .register_library("windows", LibrarySpec::bundled("Sound"))
            .is_err());
    }

    #[test]
    fn test_same_name_on_different_commands() {
        let mut registry = SchemaRegistry::new();
        registry.register_library("android", LibrarySpec::bundled("PNG")).unwrap();
        registry.register_library("ios", LibrarySpec::bundled("PNG")).unwrap();

        assert_eq!(registry.iter().count(), 2);

        let ios = registry.into_schema("ios");
        assert_eq!(ios.command, "ios");
        assert_eq!(ios.libraries.len(), 1);
    }

    #[test]
    fn test_toggle_key() {
        let enabled = ComponentSpec::new("sound", "DC_SOUND_ENABLED");
        let disabled = ComponentSpec::new("pch", "DC_USE_PCH").default(false);

        assert_eq!(enabled.toggle_key(), "no_sound");
        assert_eq!(disabled.toggle_key(), "pch");
    }

    #[test]
    fn test_library_variable() {
        let lib = LibrarySpec::bundled("jsoncpp");
        assert_eq!(lib.variable(), "DC_JSONCPP_LIBRARY");
        assert_eq!(lib.flag(), "jsoncpp");
        assert!(lib.bundled && lib.enabled_by_default);

        let fbx = LibrarySpec::system("FBX").default(false);
        assert!(!fbx.bundled);
        assert!(!fbx.enabled_by_default);
    }
}
