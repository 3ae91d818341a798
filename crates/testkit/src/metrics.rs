//! Run metrics for headless runs and worldtests.
//!
//! Reports are exported as pretty JSON next to the event log so CI can diff
//! automation behavior between runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Run/test identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Overall result
    pub result: TestResult,

    /// Automation counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation: Option<AutomationMetrics>,

    /// Execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Run completed and all validations passed
    Pass,
    /// Run failed
    Fail,
    /// Run was skipped
    Skip,
}

/// What the automation did over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationMetrics {
    /// Ticks simulated
    pub ticks: u64,
    /// Ore radar sweeps started
    pub sweeps_started: usize,
    /// Blocks extracted by sweep steps
    pub blocks_extracted: usize,
    /// Dropped items spawned
    pub items_dropped: usize,
    /// Companions spawned fresh
    pub companions_spawned: usize,
    /// Companions hidden on unequip
    pub companions_hidden: usize,
    /// Companions attached by reviving an existing rider
    pub companions_reused: usize,
    /// Host commands dispatched
    pub commands: usize,
}

/// Test execution metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration (seconds)
    pub duration_seconds: f64,

    /// Number of host events recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_recorded: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder stamped with the current time
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                automation: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    /// Set result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set automation counters
    pub fn automation(mut self, metrics: AutomationMetrics) -> Self {
        self.report.automation = Some(metrics);
        self
    }

    /// Set execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a sink at `path`, creating parent directories if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    /// Write the report
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
