use crate::Version;
use crate::diagnostics::Severity;

/// Identity of this engine, reported to the driver alongside the application's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineInfo {
    pub name: &'static str,
    pub version: Version,
}

pub const ENGINE_INFO: EngineInfo = EngineInfo {
    name: "Ember",
    version: Version::new(
        parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
        parse_component(env!("CARGO_PKG_VERSION_MINOR")),
        parse_component(env!("CARGO_PKG_VERSION_PATCH")),
    ),
};

const fn parse_component(digits: &str) -> u32 {
    let bytes = digits.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// Debug extensions and layers to turn on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Enable the Khronos validation layer.
    pub enable_validation: bool,
    /// Enable the debug utils extension and install a messenger.
    pub enable_diagnostics_channel: bool,
    /// Also deliver verbose messages through the messenger.
    pub verbose: bool,
}

impl DiagnosticsConfig {
    /// Most detailed severity the messenger will deliver.
    ///
    /// Hosts should allow this level in their subscriber; nothing here changes
    /// global log state.
    pub fn log_level(&self) -> Severity {
        if self.enable_diagnostics_channel && self.verbose {
            Severity::Verbose
        } else {
            Severity::Info
        }
    }
}

/// Everything the caller asks of the context.
///
/// The builder never mutates this value; mandated names are appended to a
/// separate effective list during negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub(crate) app_name: String,
    pub(crate) app_version: Version,
    pub(crate) api_version: Version,
    pub(crate) minimum_instance_version: Option<Version>,
    pub(crate) extensions: Vec<String>,
    pub(crate) layers: Vec<String>,
    pub(crate) diagnostics: DiagnosticsConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            app_version: Version::new(0, 0, 0),
            api_version: Version::V1_2_0,
            minimum_instance_version: None,
            extensions: vec![],
            layers: vec![],
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn app_version(mut self, version: Version) -> Self {
        self.app_version = version;
        self
    }

    pub fn api_version(mut self, version: Version) -> Self {
        self.api_version = version;
        self
    }

    /// Refuse to build on a loader older than `version`.
    ///
    /// Unset by default: the requested API version alone is not a floor, the
    /// instance reports what it actually supports.
    pub fn minimum_instance_version(mut self, version: Version) -> Self {
        self.minimum_instance_version = Some(version);
        self
    }

    /// Requesting the same name twice keeps a single entry.
    pub fn enable_extension(mut self, extension: impl Into<String>) -> Self {
        crate::names::append_if_absent(&mut self.extensions, [extension.into()]);
        self
    }

    pub fn enable_layer(mut self, layer: impl Into<String>) -> Self {
        crate::names::append_if_absent(&mut self.layers, [layer.into()]);
        self
    }

    pub fn diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn enable_validation(mut self, enable: bool) -> Self {
        self.diagnostics.enable_validation = enable;
        self
    }

    pub fn enable_diagnostics_channel(mut self, enable: bool) -> Self {
        self.diagnostics.enable_diagnostics_channel = enable;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.diagnostics.verbose = verbose;
        self
    }

    pub fn get_app_name(&self) -> &str {
        &self.app_name
    }

    pub fn get_app_version(&self) -> Version {
        self.app_version
    }

    pub fn get_api_version(&self) -> Version {
        self.api_version
    }

    pub fn get_minimum_instance_version(&self) -> Option<Version> {
        self.minimum_instance_version
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn get_diagnostics(&self) -> DiagnosticsConfig {
        self.diagnostics
    }
}
