use crate::diagnostics::Severity;
use ash::vk;

pub(crate) fn emit(
    severity: Severity,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    message_id_name: &str,
    message_id_number: i32,
    message: &str,
) {
    match severity {
        Severity::Verbose => {
            tracing::debug!(?message_type, "[{message_id_name} ({message_id_number})]: {message}");
        }
        Severity::Info => {
            tracing::info!(?message_type, "[{message_id_name} ({message_id_number})]: {message}");
        }
        Severity::Warning => {
            tracing::warn!(?message_type, "[{message_id_name} ({message_id_number})]: {message}");
        }
        Severity::Error => {
            tracing::error!(?message_type, "[{message_id_name} ({message_id_number})]: {message}");
        }
    }
}
