//! Target platforms and their option schemas.
//!
//! Each platform is a variant tag with a static [`PlatformDescriptor`]. The
//! descriptor carries everything that differs between targets: generator
//! kinds, rendering backends, the platform family and the toolchain file it
//! needs. Platform-specific options are registered on top of the shared
//! base schema by [`Platform::register_schema`].

use std::fmt;
use std::str::FromStr;

use crate::core::environment::EnvKey;
use crate::core::schema::{
    ComponentSpec, LibrarySpec, PassFormat, PassThroughSpec, SchemaError, SchemaRegistry,
};

/// Third-party libraries configured on every platform.
pub const COMMON_LIBRARIES: [&str; 11] = [
    "TIFF", "jsoncpp", "Zlib", "Box2D", "GTest", "PNG", "Lua", "Ogg", "Vorbis", "OpenAL", "cURL",
];

/// Android API level used when `--api` isn't given.
pub const DEFAULT_ANDROID_API: &str = "24";

/// Name of the UI toolkit system library.
pub const UI_TOOLKIT: &str = "Qt";

/// Platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Windows, macOS: UI toolkit and FBX import available
    Desktop,
    /// iOS, Android
    Mobile,
    /// Emscripten
    Web,
}

/// Static description of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    /// Subcommand name
    pub command: &'static str,
    /// Directory name under the dependency and prebuilt roots
    pub dir_name: &'static str,
    /// One-line help for the subcommand
    pub about: &'static str,
    /// Generator kinds; the first one is the default
    pub generators: &'static [&'static str],
    /// Rendering backends; the first one is the default
    pub renderers: &'static [&'static str],
    pub family: Family,
    /// Toolchain file the platform can't be configured without
    pub toolchain: Option<EnvKey>,
}

/// A target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Ios,
    Android,
    Emscripten,
}

static WINDOWS: PlatformDescriptor = PlatformDescriptor {
    command: "windows",
    dir_name: "Windows",
    about: "Generate a Visual Studio solution for Windows",
    generators: &["Visual Studio 12", "Visual Studio 14 2015"],
    renderers: &["opengl", "direct3d9", "direct3d12"],
    family: Family::Desktop,
    toolchain: None,
};

static MACOS: PlatformDescriptor = PlatformDescriptor {
    command: "macos",
    dir_name: "macOS",
    about: "Generate an Xcode project for macOS",
    generators: &["Xcode"],
    renderers: &["opengl"],
    family: Family::Desktop,
    toolchain: None,
};

static IOS: PlatformDescriptor = PlatformDescriptor {
    command: "ios",
    dir_name: "iOS",
    about: "Generate an Xcode project for iOS",
    generators: &["Xcode"],
    renderers: &["opengl"],
    family: Family::Mobile,
    toolchain: Some(EnvKey::IosToolchain),
};

static ANDROID: PlatformDescriptor = PlatformDescriptor {
    command: "android",
    dir_name: "Android",
    about: "Generate makefiles for Android",
    generators: &["Unix Makefiles", "Ninja"],
    renderers: &["opengl"],
    family: Family::Mobile,
    toolchain: Some(EnvKey::AndroidToolchain),
};

static EMSCRIPTEN: PlatformDescriptor = PlatformDescriptor {
    command: "emscripten",
    dir_name: "Emscripten",
    about: "Generate makefiles for the web with Emscripten",
    generators: &["Unix Makefiles", "Ninja"],
    renderers: &["opengl"],
    family: Family::Web,
    toolchain: Some(EnvKey::EmscriptenToolchain),
};

impl Platform {
    /// All platforms, in CLI order.
    pub const ALL: [Platform; 5] = [
        Platform::Android,
        Platform::Emscripten,
        Platform::Windows,
        Platform::MacOs,
        Platform::Ios,
    ];

    /// Static description of this platform.
    pub fn descriptor(self) -> &'static PlatformDescriptor {
        match self {
            Platform::Windows => &WINDOWS,
            Platform::MacOs => &MACOS,
            Platform::Ios => &IOS,
            Platform::Android => &ANDROID,
            Platform::Emscripten => &EMSCRIPTEN,
        }
    }

    /// Subcommand name.
    pub fn command(self) -> &'static str {
        self.descriptor().command
    }

    /// Directory name under the dependency and prebuilt roots.
    pub fn dir_name(self) -> &'static str {
        self.descriptor().dir_name
    }

    /// Default generator kind.
    pub fn default_generator(self) -> &'static str {
        self.descriptor().generators[0]
    }

    /// Whether the platform belongs to the desktop family.
    pub fn is_desktop(self) -> bool {
        self.descriptor().family == Family::Desktop
    }

    /// Whether this host can configure the platform.
    pub fn is_available(self) -> bool {
        PLATFORM_AVAILABILITY
            .iter()
            .any(|(platform, available)| *platform == self && available())
    }

    /// Register the full option schema for this platform.
    pub fn register_schema(self, registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
        let command = self.command();
        register_base(registry, command, self.descriptor().renderers)?;

        if self.is_desktop() {
            registry.register_system_library(
                command,
                UI_TOOLKIT,
                "DC_QT_SUPPORT",
                &["auto", "qt4", "qt5"],
            )?;
            registry.register_library(command, LibrarySpec::system("FBX"))?;
        } else {
            registry.register_unsupported_system_library(command, UI_TOOLKIT, "DC_QT_SUPPORT")?;
        }

        match self {
            Platform::Ios => {
                registry.register_passthrough(
                    command,
                    PassThroughSpec::new("identifier", "MACOSX_BUNDLE_GUI_IDENTIFIER")
                        .describe("a bundle identifier to be used"),
                )?;
                registry.register_passthrough(
                    command,
                    PassThroughSpec::new("codesign", "IOS_CODESIGN_IDENTITY")
                        .format(PassFormat::SpaceJoined)
                        .describe("code sign identity name"),
                )?;
            }
            Platform::Android => {
                registry.register_passthrough(
                    command,
                    PassThroughSpec::new("api", "ANDROID_NATIVE_API_LEVEL")
                        .format(PassFormat::Prefixed("android-"))
                        .describe("native API level to target (default: 24)"),
                )?;
            }
            Platform::Windows | Platform::MacOs | Platform::Emscripten => {}
        }

        Ok(())
    }
}

/// Options every platform shares.
fn register_base(
    registry: &mut SchemaRegistry,
    command: &str,
    renderers: &[&str],
) -> Result<(), SchemaError> {
    let components = [
        ComponentSpec::new("pch", "DC_USE_PCH")
            .describe("generate a build system that doesn't use precompiled headers"),
        ComponentSpec::new("composer", "DC_COMPOSER_ENABLED")
            .requires(UI_TOOLKIT)
            .describe("do not build the Composer tool"),
        ComponentSpec::new("relight", "DC_WITH_RELIGHT")
            .describe("do not build the Relight lightmapping library"),
        ComponentSpec::new("tests", "DC_BUILD_TESTS").describe("do not build unit tests"),
        ComponentSpec::new("examples", "DC_BUILD_EXAMPLES").describe("do not build examples"),
        ComponentSpec::new("sound", "DC_SOUND_ENABLED").describe("build with no sound support"),
        ComponentSpec::new("renderer", "DC_OPENGL_ENABLED")
            .with_choices("DC_RENDERER_BACKEND", renderers.iter().copied())
            .describe("build with no rendering support"),
    ];

    for component in components {
        registry.register(command, component)?;
    }

    registry.register_passthrough(
        command,
        PassThroughSpec::new("cpp", "CMAKE_CXX_STANDARD").describe("C++ standard to compile with"),
    )?;

    for library in COMMON_LIBRARIES {
        registry.register_library(command, LibrarySpec::bundled(library))?;
    }

    Ok(())
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.command() == s.to_lowercase())
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

/// Host check deciding whether a platform's command is offered.
pub type Availability = fn() -> bool;

fn always() -> bool {
    true
}

fn windows_host() -> bool {
    cfg!(windows)
}

fn macos_host() -> bool {
    cfg!(target_os = "macos")
}

/// Every platform with its host availability check.
pub const PLATFORM_AVAILABILITY: [(Platform, Availability); 5] = [
    (Platform::Android, always),
    (Platform::Emscripten, always),
    (Platform::Windows, windows_host),
    (Platform::MacOs, macos_host),
    (Platform::Ios, macos_host),
];

/// Platforms whose commands are offered on this host.
pub fn available_platforms() -> Vec<Platform> {
    PLATFORM_AVAILABILITY
        .iter()
        .filter(|(_, available)| available())
        .map(|(platform, _)| *platform)
        .collect()
}

/// Build the schema registry for a set of platforms.
pub fn registry_for(platforms: &[Platform]) -> Result<SchemaRegistry, SchemaError> {
    let mut registry = SchemaRegistry::new();
    for platform in platforms {
        platform.register_schema(&mut registry)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_registers_cleanly() {
        let registry = registry_for(&Platform::ALL).unwrap();
        assert_eq!(registry.iter().count(), Platform::ALL.len());
    }

    #[test]
    fn test_desktop_adds_ui_toolkit_and_fbx() {
        let registry = registry_for(&[Platform::Windows, Platform::Android]).unwrap();

        let windows = registry.get("windows").unwrap();
        assert!(windows.system_library(UI_TOOLKIT).unwrap().supported);
        assert!(!windows.library("FBX").unwrap().bundled);
        assert_eq!(windows.libraries.len(), COMMON_LIBRARIES.len() + 1);

        let android = registry.get("android").unwrap();
        assert!(!android.system_library(UI_TOOLKIT).unwrap().supported);
        assert!(android.library("FBX").is_none());
        assert_eq!(android.libraries.len(), COMMON_LIBRARIES.len());
    }

    #[test]
    fn test_platform_specific_passthrough() {
        let registry = registry_for(&Platform::ALL).unwrap();
        let options = |command: &str| -> Vec<String> {
            registry
                .get(command)
                .unwrap()
                .passthrough
                .iter()
                .map(|p| p.option.clone())
                .collect()
        };

        assert_eq!(options("ios"), vec!["cpp", "identifier", "codesign"]);
        assert_eq!(options("android"), vec!["cpp", "api"]);
        assert_eq!(options("macos"), vec!["cpp"]);
    }

    #[test]
    fn test_renderer_choices_follow_platform() {
        let registry = registry_for(&[Platform::Windows, Platform::Ios]).unwrap();
        let backends = |command: &str| {
            registry
                .get(command)
                .unwrap()
                .component("renderer")
                .and_then(|c| c.choices.clone())
                .unwrap()
                .values
        };

        assert_eq!(backends("windows"), vec!["opengl", "direct3d9", "direct3d12"]);
        assert_eq!(backends("ios"), vec!["opengl"]);
    }

    #[test]
    fn test_availability_always_offers_portable_targets() {
        let available = available_platforms();
        assert!(available.contains(&Platform::Android));
        assert!(available.contains(&Platform::Emscripten));
        assert_eq!(available.contains(&Platform::Windows), cfg!(windows));
        assert_eq!(
            available.contains(&Platform::Ios),
            cfg!(target_os = "macos")
        );
    }

    #[test]
    fn test_parse_platform() {
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("macOS".parse::<Platform>().unwrap(), Platform::MacOs);
        assert!("playstation".parse::<Platform>().is_err());
    }
}
