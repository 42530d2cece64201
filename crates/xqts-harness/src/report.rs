//! Failure diagnostics and Markdown reports

use crate::evaluator::Mismatch;
use crate::outcome::ExecutionOutcome;
use crate::runner::{SuiteResult, TestStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use xqts_diagnostics::{Diagnostic, ErrorCode};

/// Why a test failed: the query, what it produced, and which assertion did not hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDiagnostic {
    pub query: String,
    /// Outcome kind with the sequence contents or the error code
    pub outcome: String,
    /// The assertion that decided the verdict
    pub assertion: String,
    pub detail: String,
    /// Error code of a failed query
    pub code: Option<ErrorCode>,
}

impl FailureDiagnostic {
    pub fn new(query: &str, outcome: &ExecutionOutcome, mismatch: &Mismatch) -> Self {
        Self {
            query: query.to_string(),
            outcome: outcome.summary(),
            assertion: mismatch.assertion.to_string(),
            detail: mismatch.reason.clone(),
            code: outcome.as_error_code().cloned(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(format!("{} does not hold", self.assertion))
            .with_note("query", self.query.trim())
            .with_note("outcome", &self.outcome)
            .with_note("reason", &self.detail);
        if let Some(code) = &self.code {
            diagnostic = diagnostic.with_code(code.clone());
        }
        diagnostic
    }
}

impl fmt::Display for FailureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

/// Generate a Markdown compliance report
pub fn generate_report(results: &[SuiteResult]) -> String {
    let mut report = String::new();

    report.push_str("# XQuery Conformance Report\n\n");

    let total_tests: usize = results.iter().map(|r| r.total).sum();
    let total_passed: usize = results.iter().map(|r| r.passed).sum();
    let total_failed: usize = results.iter().map(|r| r.failed).sum();
    let total_errored: usize = results.iter().map(|r| r.errored).sum();
    let total_skipped: usize = results.iter().map(|r| r.skipped).sum();

    report.push_str("## Summary\n\n");
    report.push_str("| Metric | Count |\n");
    report.push_str("|--------|-------|\n");
    report.push_str(&format!("| Total Tests | {} |\n", total_tests));
    report.push_str(&format!(
        "| Passed | {} ({:.1}%) |\n",
        total_passed,
        if total_tests > 0 {
            total_passed as f64 / total_tests as f64 * 100.0
        } else {
            0.0
        }
    ));
    report.push_str(&format!("| Failed | {} |\n", total_failed));
    report.push_str(&format!("| Errored | {} |\n", total_errored));
    report.push_str(&format!("| Skipped | {} |\n", total_skipped));
    report.push('\n');

    report.push_str("## Results by Suite\n\n");

    for suite in results {
        report.push_str(&format!("### {}\n\n", suite.suite_name));
        report.push_str(&format!("- Passed: {}/{}\n", suite.passed, suite.total));
        report.push_str(&format!("- Failed: {}\n", suite.failed));
        report.push_str(&format!("- Errored: {}\n", suite.errored));
        report.push_str(&format!("- Skipped: {}\n\n", suite.skipped));

        let failed: Vec<_> = suite
            .results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
            .collect();
        if !failed.is_empty() {
            report.push_str("#### Failed Tests\n\n");
            for result in failed {
                report.push_str(&format!("- **{}**\n", result.name));
                if let Some(failure) = &result.failure {
                    report.push_str(&format!("  - Query: `{}`\n", one_line(&failure.query)));
                    report.push_str(&format!("  - Assertion: `{}`\n", failure.assertion));
                    report.push_str(&format!("  - Outcome: `{}`\n", failure.outcome));
                    report.push_str(&format!("  - Reason: {}\n", failure.detail));
                }
            }
            report.push('\n');
        }

        let errored: Vec<_> = suite
            .results
            .iter()
            .filter(|r| r.status == TestStatus::Errored)
            .collect();
        if !errored.is_empty() {
            report.push_str("#### Errored Tests\n\n");
            for result in errored {
                report.push_str(&format!(
                    "- **{}**: {}\n",
                    result.name,
                    result.message.as_deref().unwrap_or("setup failed")
                ));
            }
            report.push('\n');
        }
    }

    report
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
