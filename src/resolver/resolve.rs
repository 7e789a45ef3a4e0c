//! Options to configuration mapping.
//!
//! Resolution is a pure function of the options, the command schema, the
//! platform descriptor and the environment. It runs in fixed passes so the
//! output order only depends on registration order:
//!
//! 1. component toggles
//! 2. enum-valued features (component choices, then system libraries)
//! 3. third-party libraries
//! 4. `CMAKE_PREFIX_PATH`
//! 5. `CMAKE_TOOLCHAIN_FILE`, when the platform needs one
//! 6. pass-through values that were supplied
//!
//! Platform overrides are layered on afterwards by [`apply_platform_overrides`].

use std::path::{Path, PathBuf};

use crate::core::environment::{EnvKey, Environment};
use crate::core::mapping::{disable_option, ConfigurationMapping, DISABLED_CHOICE};
use crate::core::options::OptionsRecord;
use crate::core::platform::{Platform, PlatformDescriptor, DEFAULT_ANDROID_API};
use crate::core::schema::{CommandSchema, ComponentSpec, PassFormat, SystemLibrarySpec};
use crate::resolver::errors::ResolveError;
use crate::util::fs::{absolute_path, cmake_path};

/// Sentinel for a non-bundled library the generator has to find itself.
pub const SYSTEM_LIBRARY: &str = "System";

/// State of an enum-valued feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The feature doesn't exist for this command
    NotApplicable,
    /// The feature exists but was switched off
    Disabled,
    /// The feature is on with the given value
    Enabled(String),
}

impl Selection {
    /// Whether the feature is on.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Selection::Enabled(_))
    }
}

/// Resolve a command's options into a configuration mapping.
pub fn resolve(
    options: &OptionsRecord,
    schema: &CommandSchema,
    platform: &PlatformDescriptor,
    env: &Environment,
) -> Result<ConfigurationMapping, ResolveError> {
    let mut mapping = ConfigurationMapping::new();

    for component in &schema.components {
        let enabled = component_enabled(options, schema, component)?;
        mapping.set(&component.variable, disable_option(!enabled));
    }

    for component in &schema.components {
        if let Some(choices) = &component.choices {
            let selection = select_component(options, schema, component)?;
            mapping.set(&choices.variable, render_selection(&selection, false));
        }
    }

    for library in &schema.system_libraries {
        let selection = select_system_library(options, library)?;
        mapping.set(&library.variable, render_selection(&selection, true));
    }

    for library in &schema.libraries {
        let value = match options.text(&library.flag()) {
            Some(path) => cmake_path(&resolve_path(path)?),
            None if !library.enabled_by_default => {
                tracing::debug!("{} not requested, skipping", library.name);
                continue;
            }
            None if library.bundled => {
                let path = env
                    .dependencies()?
                    .join(platform.dir_name)
                    .join(&library.name);
                cmake_path(&path)
            }
            None => SYSTEM_LIBRARY.to_string(),
        };
        mapping.set(library.variable(), value);
    }

    let prefix_path = match options.text("prefix_path") {
        Some(path) => resolve_path(path)?,
        None => resolve_path(env.dependencies()?.join(platform.dir_name))?,
    };
    mapping.set("CMAKE_PREFIX_PATH", cmake_path(&prefix_path));

    if let Some(key) = platform.toolchain {
        mapping.set("CMAKE_TOOLCHAIN_FILE", cmake_path(env.require(key)?));
    }

    for spec in &schema.passthrough {
        let value = match spec.format {
            PassFormat::Verbatim => options.text(&spec.option).map(str::to_string),
            PassFormat::Prefixed(prefix) => options
                .text(&spec.option)
                .map(|v| format!("{}{}", prefix, v)),
            PassFormat::SpaceJoined => options
                .list(&spec.option)
                .filter(|items| !items.is_empty())
                .map(|items| items.join(" ")),
        };

        if let Some(value) = value {
            mapping.set(&spec.variable, value);
        }
    }

    Ok(mapping)
}

/// Layer platform-forced values on top of a base mapping.
pub fn apply_platform_overrides(
    platform: Platform,
    options: &OptionsRecord,
    env: &Environment,
    mapping: &mut ConfigurationMapping,
) -> Result<(), ResolveError> {
    match platform {
        Platform::Android => {
            let api = options.text("api").unwrap_or(DEFAULT_ANDROID_API);
            mapping.set("ANDROID_NATIVE_API_LEVEL", format!("android-{}", api));
            mapping.set("ANDROID_NDK", cmake_path(env.require(EnvKey::AndroidNdk)?));
        }
        Platform::Emscripten => {
            mapping.set(
                "EMSCRIPTEN_ROOT_PATH",
                cmake_path(env.require(EnvKey::EmscriptenRoot)?),
            );
        }
        Platform::Windows | Platform::MacOs | Platform::Ios => {}
    }
    Ok(())
}

/// Resolve and layer platform overrides in one go.
pub fn resolve_platform(
    platform: Platform,
    options: &OptionsRecord,
    schema: &CommandSchema,
    env: &Environment,
) -> Result<ConfigurationMapping, ResolveError> {
    let mut mapping = resolve(options, schema, platform.descriptor(), env)?;
    apply_platform_overrides(platform, options, env, &mut mapping)?;
    Ok(mapping)
}

/// Select the value of a named enum-valued feature.
pub fn select_feature(
    options: &OptionsRecord,
    schema: &CommandSchema,
    name: &str,
) -> Result<Selection, ResolveError> {
    if let Some(library) = schema.system_library(name) {
        return select_system_library(options, library);
    }
    match schema.component(name) {
        Some(component) if component.choices.is_some() => {
            select_component(options, schema, component)
        }
        _ => Ok(Selection::NotApplicable),
    }
}

fn component_enabled(
    options: &OptionsRecord,
    schema: &CommandSchema,
    component: &ComponentSpec,
) -> Result<bool, ResolveError> {
    let flipped = options.flag(&component.toggle_key());
    let enabled = component.default != flipped;

    match &component.requires {
        Some(feature) if enabled => {
            let selection = select_feature(options, schema, feature)?;
            if !selection.is_enabled() {
                tracing::debug!(
                    "{} disabled: requires {} ({:?})",
                    component.name,
                    feature,
                    selection
                );
            }
            Ok(selection.is_enabled())
        }
        _ => Ok(enabled),
    }
}

fn select_component(
    options: &OptionsRecord,
    schema: &CommandSchema,
    component: &ComponentSpec,
) -> Result<Selection, ResolveError> {
    let Some(choices) = &component.choices else {
        return Ok(Selection::NotApplicable);
    };

    if !component_enabled(options, schema, component)? {
        return Ok(Selection::Disabled);
    }

    let value = pick_choice(options, &component.name, &choices.values)?;
    Ok(Selection::Enabled(value))
}

fn select_system_library(
    options: &OptionsRecord,
    library: &SystemLibrarySpec,
) -> Result<Selection, ResolveError> {
    if !library.supported {
        return Ok(Selection::NotApplicable);
    }

    let flag = library.flag();
    if options.flag(&format!("no_{}", flag)) {
        return Ok(Selection::Disabled);
    }

    let value = pick_choice(options, &flag, &library.versions)?;
    Ok(Selection::Enabled(value))
}

fn pick_choice(
    options: &OptionsRecord,
    option: &str,
    allowed: &[String],
) -> Result<String, ResolveError> {
    match options.text(option) {
        Some(value) if allowed.iter().any(|a| a == value) => Ok(value.to_string()),
        Some(value) => Err(ResolveError::InvalidChoice {
            option: option.to_string(),
            value: value.to_string(),
            allowed: allowed.to_vec(),
        }),
        None => allowed
            .first()
            .cloned()
            .ok_or_else(|| ResolveError::InvalidChoice {
                option: option.to_string(),
                value: String::new(),
                allowed: Vec::new(),
            }),
    }
}

fn render_selection(selection: &Selection, capitalized: bool) -> String {
    match selection {
        Selection::Enabled(value) if capitalized => capitalize(value),
        Selection::Enabled(value) => value.clone(),
        Selection::Disabled | Selection::NotApplicable => DISABLED_CHOICE.to_string(),
    }
}

/// Upper-case the first character and lower-case the rest (`qt5` -> `Qt5`).
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn resolve_path(path: impl AsRef<Path>) -> Result<PathBuf, ResolveError> {
    let path = path.as_ref();
    absolute_path(path).map_err(|source| ResolveError::Path {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{registry_for, COMMON_LIBRARIES};
    use crate::core::schema::{LibrarySpec, SchemaRegistry};

    fn env() -> Environment {
        Environment::new()
            .with(EnvKey::Dependencies, "/deps")
            .with(EnvKey::Prebuilt, "/prebuilt")
            .with(EnvKey::IosToolchain, "/sdk/ios.cmake")
            .with(EnvKey::AndroidToolchain, "/sdk/android.cmake")
            .with(EnvKey::AndroidNdk, "/sdk/ndk")
            .with(EnvKey::EmscriptenToolchain, "/sdk/emscripten.cmake")
            .with(EnvKey::EmscriptenRoot, "/sdk/emscripten")
    }

    fn run(platform: Platform, options: &OptionsRecord) -> ConfigurationMapping {
        let registry = registry_for(&[platform]).unwrap();
        let schema = registry.get(platform.command()).unwrap();
        resolve_platform(platform, options, schema, &env()).unwrap()
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let options = OptionsRecord::new()
            .with_flag("no_sound")
            .with_text("png", "/opt/png")
            .with_text("cpp", "14");

        for platform in Platform::ALL {
            let first = run(platform, &options);
            let second = run(platform, &options);
            assert_eq!(first.to_string(), second.to_string());
        }
    }

    #[test]
    fn test_every_library_appears_once() {
        for platform in Platform::ALL {
            let mapping = run(platform, &OptionsRecord::new());
            let library_keys: Vec<_> = mapping
                .keys()
                .filter(|k| k.starts_with("DC_") && k.ends_with("_LIBRARY"))
                .collect();

            let expected = COMMON_LIBRARIES.len() + usize::from(platform.is_desktop());
            assert_eq!(library_keys.len(), expected, "{}", platform);
            for library in COMMON_LIBRARIES {
                let key = format!("DC_{}_LIBRARY", library.to_uppercase());
                assert!(mapping.contains_key(&key), "{} missing on {}", key, platform);
            }
        }
    }

    #[test]
    fn test_windows_disable_flags() {
        let options = OptionsRecord::new()
            .with_flag("no_composer")
            .with_flag("no_sound");
        let mapping = run(Platform::Windows, &options);

        assert_eq!(mapping.get("DC_COMPOSER_ENABLED"), Some("OFF"));
        assert_eq!(mapping.get("DC_SOUND_ENABLED"), Some("OFF"));
        for key in [
            "DC_USE_PCH",
            "DC_WITH_RELIGHT",
            "DC_BUILD_TESTS",
            "DC_BUILD_EXAMPLES",
            "DC_OPENGL_ENABLED",
        ] {
            assert_eq!(mapping.get(key), Some("ON"), "{}", key);
        }
        assert_eq!(mapping.get("DC_QT_SUPPORT"), Some("Auto"));
        assert_eq!(mapping.get("DC_RENDERER_BACKEND"), Some("opengl"));
    }

    #[test]
    fn test_composer_requires_ui_toolkit() {
        let mapping = run(Platform::Windows, &OptionsRecord::new().with_flag("no_qt"));
        assert_eq!(mapping.get("DC_COMPOSER_ENABLED"), Some("OFF"));
        assert_eq!(mapping.get("DC_QT_SUPPORT"), Some("Disabled"));

        let mapping = run(Platform::Windows, &OptionsRecord::new().with_text("qt", "qt5"));
        assert_eq!(mapping.get("DC_COMPOSER_ENABLED"), Some("ON"));
        assert_eq!(mapping.get("DC_QT_SUPPORT"), Some("Qt5"));

        // No UI toolkit on mobile at all
        let mapping = run(Platform::Android, &OptionsRecord::new());
        assert_eq!(mapping.get("DC_COMPOSER_ENABLED"), Some("OFF"));
        assert_eq!(mapping.get("DC_QT_SUPPORT"), Some("Disabled"));
    }

    #[test]
    fn test_ui_toolkit_three_states() {
        let registry = registry_for(&[Platform::MacOs, Platform::Ios]).unwrap();
        let macos = registry.get("macos").unwrap();
        let ios = registry.get("ios").unwrap();

        assert_eq!(
            select_feature(&OptionsRecord::new(), ios, "Qt").unwrap(),
            Selection::NotApplicable
        );
        assert_eq!(
            select_feature(&OptionsRecord::new().with_flag("no_qt"), macos, "Qt").unwrap(),
            Selection::Disabled
        );
        assert_eq!(
            select_feature(&OptionsRecord::new().with_text("qt", "qt4"), macos, "Qt").unwrap(),
            Selection::Enabled("qt4".to_string())
        );
    }

    #[test]
    fn test_renderer_disabled() {
        let mapping = run(Platform::Windows, &OptionsRecord::new().with_flag("no_renderer"));
        assert_eq!(mapping.get("DC_OPENGL_ENABLED"), Some("OFF"));
        assert_eq!(mapping.get("DC_RENDERER_BACKEND"), Some("Disabled"));

        let mapping = run(
            Platform::Windows,
            &OptionsRecord::new().with_text("renderer", "direct3d12"),
        );
        assert_eq!(mapping.get("DC_RENDERER_BACKEND"), Some("direct3d12"));
    }

    #[test]
    fn test_invalid_choice() {
        let registry = registry_for(&[Platform::Android]).unwrap();
        let schema = registry.get("android").unwrap();
        let options = OptionsRecord::new().with_text("renderer", "direct3d9");

        let err = resolve_platform(Platform::Android, &options, schema, &env()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::InvalidChoice { ref option, ref value, .. }
                if option == "renderer" && value == "direct3d9"
        ));
    }

    #[test]
    fn test_explicit_library_path_only_changes_that_library() {
        let defaults = run(Platform::Android, &OptionsRecord::new());
        let custom = run(
            Platform::Android,
            &OptionsRecord::new().with_text("png", "/opt/libpng"),
        );

        assert_eq!(defaults.get("DC_PNG_LIBRARY"), Some("/deps/Android/PNG"));
        assert_eq!(custom.get("DC_PNG_LIBRARY"), Some("/opt/libpng"));

        let differing: Vec<_> = defaults
            .iter()
            .filter(|(k, v)| custom.get(k) != Some(*v))
            .map(|(k, _)| k)
            .collect();
        assert_eq!(differing, vec!["DC_PNG_LIBRARY"]);
        assert_eq!(defaults.len(), custom.len());
    }

    #[test]
    fn test_non_bundled_library_defaults_to_system() {
        let mapping = run(Platform::MacOs, &OptionsRecord::new());
        assert_eq!(mapping.get("DC_FBX_LIBRARY"), Some("System"));

        let mapping = run(Platform::MacOs, &OptionsRecord::new().with_text("fbx", "/opt/fbx"));
        assert_eq!(mapping.get("DC_FBX_LIBRARY"), Some("/opt/fbx"));
    }

    #[test]
    fn test_library_not_enabled_by_default_is_skipped() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_library("custom", LibrarySpec::bundled("Extra").default(false))
            .unwrap();
        let schema = registry.into_schema("custom");

        let descriptor = Platform::Windows.descriptor();
        let mapping = resolve(&OptionsRecord::new(), &schema, descriptor, &env()).unwrap();
        assert!(!mapping.contains_key("DC_EXTRA_LIBRARY"));

        let options = OptionsRecord::new().with_text("extra", "/opt/extra");
        let mapping = resolve(&options, &schema, descriptor, &env()).unwrap();
        assert_eq!(mapping.get("DC_EXTRA_LIBRARY"), Some("/opt/extra"));
    }

    #[test]
    fn test_prefix_path_and_toolchain() {
        let mapping = run(Platform::Ios, &OptionsRecord::new());
        assert_eq!(mapping.get("CMAKE_PREFIX_PATH"), Some("/deps/iOS"));
        assert_eq!(mapping.get("CMAKE_TOOLCHAIN_FILE"), Some("/sdk/ios.cmake"));

        let mapping = run(
            Platform::Windows,
            &OptionsRecord::new().with_text("prefix_path", "/custom/prefix"),
        );
        assert_eq!(mapping.get("CMAKE_PREFIX_PATH"), Some("/custom/prefix"));
        assert!(!mapping.contains_key("CMAKE_TOOLCHAIN_FILE"));
    }

    #[test]
    fn test_ios_optional_fields() {
        let mapping = run(Platform::Ios, &OptionsRecord::new());
        assert!(!mapping.contains_key("MACOSX_BUNDLE_GUI_IDENTIFIER"));
        assert!(!mapping.contains_key("IOS_CODESIGN_IDENTITY"));
        assert!(!mapping.contains_key("CMAKE_CXX_STANDARD"));

        let options = OptionsRecord::new()
            .with_text("identifier", "com.example.game")
            .with_list("codesign", ["iPhone", "Developer:", "Jane"]);
        let mapping = run(Platform::Ios, &options);
        assert_eq!(
            mapping.get("MACOSX_BUNDLE_GUI_IDENTIFIER"),
            Some("com.example.game")
        );
        assert_eq!(
            mapping.get("IOS_CODESIGN_IDENTITY"),
            Some("iPhone Developer: Jane")
        );
    }

    #[test]
    fn test_android_forced_values() {
        let mapping = run(Platform::Android, &OptionsRecord::new());
        assert_eq!(mapping.get("ANDROID_NATIVE_API_LEVEL"), Some("android-24"));
        assert_eq!(mapping.get("ANDROID_NDK"), Some("/sdk/ndk"));
        assert_eq!(
            mapping.get("CMAKE_TOOLCHAIN_FILE"),
            Some("/sdk/android.cmake")
        );

        let mapping = run(Platform::Android, &OptionsRecord::new().with_text("api", "21"));
        assert_eq!(mapping.get("ANDROID_NATIVE_API_LEVEL"), Some("android-21"));
    }

    #[test]
    fn test_emscripten_root() {
        let mapping = run(Platform::Emscripten, &OptionsRecord::new());
        assert_eq!(mapping.get("EMSCRIPTEN_ROOT_PATH"), Some("/sdk/emscripten"));
    }

    #[test]
    fn test_missing_environment_names_the_key() {
        let registry = registry_for(&[Platform::Android]).unwrap();
        let schema = registry.get("android").unwrap();
        let env = Environment::new().with(EnvKey::Dependencies, "/deps");

        let err = resolve_platform(Platform::Android, &OptionsRecord::new(), schema, &env)
            .unwrap_err();
        assert!(err.to_string().contains("android.toolchain"));
    }

    #[test]
    fn test_ordering_follows_passes() {
        let mapping = run(Platform::Android, &OptionsRecord::new().with_text("cpp", "11"));
        let keys: Vec<_> = mapping.keys().collect();

        let position = |key: &str| keys.iter().position(|k| *k == key).unwrap();
        assert_eq!(keys[0], "DC_USE_PCH");
        assert!(position("DC_OPENGL_ENABLED") < position("DC_RENDERER_BACKEND"));
        assert!(position("DC_QT_SUPPORT") < position("DC_TIFF_LIBRARY"));
        assert!(position("DC_CURL_LIBRARY") < position("CMAKE_PREFIX_PATH"));
        assert!(position("CMAKE_PREFIX_PATH") < position("CMAKE_TOOLCHAIN_FILE"));
        assert!(position("CMAKE_TOOLCHAIN_FILE") < position("CMAKE_CXX_STANDARD"));
        assert_eq!(keys.last(), Some(&"ANDROID_NDK"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("qt5"), "Qt5");
        assert_eq!(capitalize("AUTO"), "Auto");
        assert_eq!(capitalize(""), "");
    }
}
