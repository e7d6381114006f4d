// ==============================================================================
// audit.rs - Audit Trail for Extraction Runs
// ==============================================================================
// Description: Structured audit events for every extraction step, emitted via tracing
// Author: Matt Barham
// Created: 2026-10-13
// Modified: 2026-10-16
// Version: 1.1.0
// ==============================================================================
// Events are written to the tracing subscriber under the "audit" target only;
// nothing is persisted by this crate.
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // File operations
    FileValidated,
    FileRejected,
    TableLoaded,
    ExportWritten,

    // Extraction events
    ColumnResolved,
    ColumnRejected,
    TargetsParsed,
    FilterCompleted,
    JobFailed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub user_id: Option<String>,
    pub resource: Option<String>,
    pub details: serde_json::Value,
    pub severity: LogSeverity,
}

impl AuditEvent {
    pub fn new(
        run_id: Uuid,
        event_type: AuditEventType,
        user_id: Option<String>,
        resource: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        let severity = match event_type {
            AuditEventType::FileRejected | AuditEventType::ColumnRejected => LogSeverity::Warning,
            AuditEventType::JobFailed => LogSeverity::Error,
            _ => LogSeverity::Info,
        };

        Self {
            id: Uuid::new_v4(),
            run_id,
            timestamp: Utc::now(),
            event_type,
            user_id,
            resource,
            details,
            severity,
        }
    }

    /// Write the event to the tracing subscriber as a single JSON payload
    pub fn emit(&self) {
        let payload = serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"serialization_error\":\"{}\"}}", e));

        match self.severity {
            LogSeverity::Info => info!(target: "audit", event = ?self.event_type, "{}", payload),
            LogSeverity::Warning => warn!(target: "audit", event = ?self.event_type, "{}", payload),
            LogSeverity::Error => error!(target: "audit", event = ?self.event_type, "{}", payload),
        }
    }
}

/// Convenience function to emit an audit event
pub fn log_event(
    run_id: Uuid,
    event_type: AuditEventType,
    user_id: &str,
    resource: Option<String>,
    details: serde_json::Value,
) {
    AuditEvent::new(
        run_id,
        event_type,
        Some(user_id.to_string()),
        resource,
        details,
    )
    .emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_creation() {
        let run_id = Uuid::new_v4();
        let event = AuditEvent::new(
            run_id,
            AuditEventType::TableLoaded,
            Some("IG1234".to_string()),
            Some("export.tsv".to_string()),
            serde_json::json!({
                "rows": 600000,
                "columns": 12
            }),
        );

        assert_eq!(event.run_id, run_id);
        assert_eq!(event.user_id, Some("IG1234".to_string()));
        assert_eq!(event.resource, Some("export.tsv".to_string()));
        assert_eq!(event.severity, LogSeverity::Info);
    }

    #[test]
    fn test_rejection_severity() {
        let event = AuditEvent::new(
            Uuid::new_v4(),
            AuditEventType::ColumnRejected,
            None,
            None,
            serde_json::json!({}),
        );
        assert_eq!(event.severity, LogSeverity::Warning);

        let failed = AuditEvent::new(
            Uuid::new_v4(),
            AuditEventType::JobFailed,
            None,
            None,
            serde_json::json!({}),
        );
        assert_eq!(failed.severity, LogSeverity::Error);
    }

    #[test]
    fn test_event_serializes_snake_case() {
        let event = AuditEvent::new(
            Uuid::new_v4(),
            AuditEventType::FilterCompleted,
            None,
            None,
            serde_json::json!({ "matched": 3 }),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "filter_completed");
        assert_eq!(json["severity"], "info");
        assert_eq!(json["details"]["matched"], 3);
    }
}
