//! Unified output formatting for workload runs.

use tracing::{error, info};

/// Collects pass/fail checks of one workload run and prints a summary.
pub struct RunReport {
    tool_name: String,
    passed: usize,
    failed: usize,
}

impl RunReport {
    pub fn new(tool_name: &str, seed: u64) -> Self {
        info!("Running {} with seed {}...", tool_name, seed);
        info!("{}", "=".repeat(80));

        Self {
            tool_name: tool_name.to_string(),
            passed: 0,
            failed: 0,
        }
    }

    pub fn report_success(&mut self, check: &str, stats: Option<&str>) {
        self.passed += 1;
        if let Some(stats) = stats {
            info!("PASSED: {} ({})", check, stats);
        } else {
            info!("PASSED: {}", check);
        }
    }

    pub fn report_failure(&mut self, check: &str, error: Option<&str>) {
        self.failed += 1;
        if let Some(error) = error {
            error!("FAILED: {} - {}", check, error);
        } else {
            error!("FAILED: {}", check);
        }
    }

    /// Record `check` as passed or failed depending on `result`.
    pub fn record<E: std::fmt::Display>(&mut self, check: &str, result: Result<String, E>) {
        match result {
            Ok(stats) => self.report_success(check, Some(&stats)),
            Err(e) => self.report_failure(check, Some(&e.to_string())),
        }
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Print the summary. Returns `true` if every check passed.
    pub fn finish(self) -> bool {
        info!("");
        info!("{}", "=".repeat(80));
        info!("SUMMARY:");
        info!("  Checks: {}", self.passed + self.failed);
        info!("  Passed: {}", self.passed);
        info!("  Failed: {}", self.failed);

        if self.failed > 0 {
            error!(
                "Some checks failed in {}. Check the errors above for details.",
                self.tool_name
            );
            false
        } else {
            info!("All checks passed in {}!", self.tool_name);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successes_and_failures() {
        let mut report = RunReport::new("test", 7);
        report.report_success("a", None);
        report.record::<String>("b", Ok("n=1".into()));
        report.record("c", Err("boom"));
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.finish());
    }
}
