use colored::Colorize;
use engine_check_core::{AggregateReport, PackageDetail, Severity};

fn paint(text: &str, severity: Severity, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match severity {
        Severity::Success => text.green().to_string(),
        Severity::Warn => text.yellow().to_string(),
        Severity::Error => text.red().to_string(),
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✔",
        Severity::Warn => "⚠",
        Severity::Error => "✘",
    }
}

/// One line describing a single engine, name padded to `width`
pub fn format_detail(detail: &PackageDetail, width: usize, color: bool) -> String {
    let summary = if !detail.validator_found {
        "no validator found".to_string()
    } else {
        let expected = detail.expected_version.as_deref().unwrap_or("?");
        match (&detail.found_version, &detail.command_error) {
            (_, Some(error)) => format!("expected {expected}, command failed: {error}"),
            (Some(found), None) => format!("expected {expected}, found {found}"),
            (None, None) => format!("expected {expected}"),
        }
    };

    format!(
        "{} {:<width$}  {}",
        paint(marker(detail.severity), detail.severity, color),
        detail.name,
        summary
    )
}

/// Full human-readable report: one line per engine sorted by name, then the verdict
pub fn render_report(report: &AggregateReport, color: bool) -> String {
    let details: Vec<_> = report
        .sorted_outcomes()
        .iter()
        .map(|outcome| outcome.detail())
        .collect();
    let width = details
        .iter()
        .map(|detail| detail.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for detail in &details {
        out.push_str(&format_detail(detail, width, color));
        out.push('\n');
    }
    if !details.is_empty() {
        out.push('\n');
    }
    out.push_str(&paint(&report.message.text, report.message.severity, color));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_check_core::Outcome;

    fn sample_report() -> AggregateReport {
        AggregateReport::from_outcomes(vec![
            Outcome::Success {
                name: "node".to_string(),
                expected_version: ">=18".to_string(),
                found_version: ">=18".to_string(),
            },
            Outcome::ValidatorNotFound {
                name: "npmFake".to_string(),
            },
            Outcome::ExecutionError {
                name: "go".to_string(),
                expected_version: ">=1.21".to_string(),
                error: "`go version` exited with code 127".to_string(),
            },
        ])
    }

    #[test]
    fn test_render_report_without_color() {
        let rendered = render_report(&sample_report(), false);
        assert_eq!(
            rendered,
            "✘ go       expected >=1.21, command failed: `go version` exited with code 127\n\
             ✔ node     expected >=18, found >=18\n\
             ⚠ npmFake  no validator found\n\
             \n\
             Environment is invalid!\n"
        );
    }

    #[test]
    fn test_render_empty_report() {
        let report = AggregateReport::from_outcomes(Vec::new());
        assert_eq!(render_report(&report, false), "Environment looks good!\n");
    }

    #[test]
    fn test_format_mismatch() {
        let detail = Outcome::VersionMismatch {
            name: "yarn".to_string(),
            expected_version: "^1.22.0".to_string(),
            found_version: "1.21.1".to_string(),
        }
        .detail();
        assert_eq!(
            format_detail(&detail, 4, false),
            "✘ yarn  expected ^1.22.0, found 1.21.1"
        );
    }
}
