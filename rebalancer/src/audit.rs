//! JSONL audit trail logging.
//!
//! Each CLI run appends events to an audit.jsonl file, one JSON object per
//! line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rebalance_broker::ExecutionReport;
use rebalance_core::{OrderPlan, ProviderId};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

fn plan_to_json(plan: &OrderPlan) -> serde_json::Value {
    let side = |label: &str, orders: &[rebalance_core::OrderElement]| {
        orders
            .iter()
            .map(|o| {
                serde_json::json!({
                    "ticker": o.ticker.as_str(),
                    "side": label,
                    "value": o.value.map(|v| v.value().to_string()),
                    "qty": o.qty.map(|q| q.to_string()),
                    "price": o.price.map(|p| p.value().to_string()),
                })
            })
            .collect::<Vec<_>>()
    };
    let mut orders = side("buy", &plan.to_buy);
    orders.extend(side("sell", &plan.to_sell));
    serde_json::json!({ "orders": orders })
}

/// Convenience: log a run start event.
pub fn log_run_started(audit: &mut AuditLog, index_file: &str) -> Result<()> {
    audit.log("run_started", serde_json::json!({ "index_file": index_file }))
}

/// Convenience: log the composite plan computed for one provider.
pub fn log_provider_plan(audit: &mut AuditLog, provider: ProviderId, plan: &OrderPlan) -> Result<()> {
    let mut data = plan_to_json(plan);
    data["provider"] = serde_json::json!(provider.to_string());
    audit.log("provider_plan_computed", data)
}

/// Convenience: log the result of executing one provider's plan.
pub fn log_execution_report(audit: &mut AuditLog, provider: ProviderId, report: &ExecutionReport) -> Result<()> {
    audit.log(
        "provider_executed",
        serde_json::json!({
            "provider": provider.to_string(),
            "executed": report.executed.iter().map(|(t, ty)| serde_json::json!({"ticker": t.as_str(), "type": format!("{ty:?}")})).collect::<Vec<_>>(),
            "skipped": report.skipped.iter().map(|(t, reason)| serde_json::json!({"ticker": t.as_str(), "reason": reason})).collect::<Vec<_>>(),
        }),
    )
}

/// Convenience: log run completion.
pub fn log_run_completed(audit: &mut AuditLog, providers_executed: usize) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({ "providers_executed": providers_executed }),
    )
}
