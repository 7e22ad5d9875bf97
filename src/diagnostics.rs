use crate::config::DiagnosticsConfig;
use ash::vk;
use std::borrow::Cow;
use std::ffi;

/// Message severities of the diagnostics channel, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Verbose,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Picks the most severe bit present in `flags`.
    pub fn from_vk(flags: vk::DebugUtilsMessageSeverityFlagsEXT) -> Option<Self> {
        if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            Some(Self::Error)
        } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            Some(Self::Warning)
        } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            Some(Self::Info)
        } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE) {
            Some(Self::Verbose)
        } else {
            None
        }
    }

    pub fn to_vk(self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        match self {
            Self::Verbose => vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            Self::Info => vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            Self::Warning => vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
            Self::Error => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        }
    }
}

/// Severities and message types a messenger subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessengerFilter {
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl MessengerFilter {
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        let mut severity = vk::DebugUtilsMessageSeverityFlagsEXT::INFO
            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
        if config.verbose {
            severity |= vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
        }

        Self {
            severity,
            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        }
    }
}

/// Messenger callback installed on every diagnostics channel.
pub(crate) unsafe extern "system" fn diagnostics_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    unsafe {
        let callback_data = *p_callback_data;
        let message_id_number = callback_data.message_id_number;

        let message_id_name = if callback_data.p_message_id_name.is_null() {
            Cow::from("")
        } else {
            ffi::CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
        };

        let message = if callback_data.p_message.is_null() {
            Cow::from("")
        } else {
            ffi::CStr::from_ptr(callback_data.p_message).to_string_lossy()
        };

        route(
            Severity::from_vk(message_severity).unwrap_or(Severity::Verbose),
            message_type,
            &message_id_name,
            message_id_number,
            &message,
        );
    }

    vk::FALSE
}

pub(crate) fn route(
    severity: Severity,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    message_id_name: &str,
    message_id_number: i32,
    message: &str,
) {
    #[cfg(feature = "enable_tracing")]
    crate::tracing::emit(
        severity,
        message_type,
        message_id_name,
        message_id_number,
        message,
    );

    #[cfg(not(feature = "enable_tracing"))]
    eprintln!(
        "{severity:?}:\n{message_type:?} [{message_id_name} ({message_id_number})] : {message}\n",
    );
}
