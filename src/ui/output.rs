use crate::compare::{ChangeType, Severity, StructuralChange};
use crate::matrix::{ComplexityClass, UserDecision};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Drop headers, sections and colors for the rest of the process.
///
/// Must run before the first line is printed.
pub fn set_quiet() {
    let _ = QUIET.set(true);
}

/// `--quiet`, or `SCHEMABRIDGE_QUIET` set to `1`/`true`
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| quiet_from_env(std::env::var("SCHEMABRIDGE_QUIET").ok().as_deref()))
}

fn quiet_from_env(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn severity_badge(severity: Severity) -> String {
    format!("[{}]", severity).style(theme().severity(severity)).to_string()
}

pub fn complexity_badge(complexity: ComplexityClass) -> String {
    complexity
        .as_str()
        .style(theme().complexity(complexity))
        .to_string()
}

/// A 0.0..=1.0 score as a percentage
pub fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn object_changed(change: &StructuralChange) {
    let target = match &change.member {
        Some(member) => format!("{}.{}", change.object, member),
        None => change.object.clone(),
    };
    let icon = match change.change_type {
        ChangeType::ObjectAdded | ChangeType::FieldAdded => Icons::NEW.style(theme().success.clone()),
        ChangeType::ObjectRemoved | ChangeType::FieldRemoved => Icons::DEL.style(theme().error.clone()),
        _ => Icons::MOD.style(theme().warn.clone()),
    };
    println!(
        "{} {} {} {}",
        icon,
        severity_badge(change.severity),
        target,
        muted(&change.description)
    );
}

pub fn decision(decision: &UserDecision) {
    let answer = match &decision.answer {
        Some(answer) => answer.style(theme().success.clone()).to_string(),
        None => format!("{} (recommended)", decision.recommended),
    };
    println!(
        "{} {} {}",
        Icons::QUESTION.style(theme().info.clone()),
        decision.key.style(theme().header.clone()),
        muted(&decision.question)
    );
    println!("    {} {}  {} {}", dim("options:"), decision.options.join(", "), dim("->"), answer);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.855), "85.5%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn test_quiet_env_values() {
        assert!(quiet_from_env(Some("1")));
        assert!(quiet_from_env(Some("TRUE")));
        assert!(!quiet_from_env(Some("0")));
        assert!(!quiet_from_env(Some("yes")));
        assert!(!quiet_from_env(None));
    }

    #[test]
    fn test_badges_keep_text() {
        assert!(severity_badge(Severity::Major).contains("[major]"));
        assert!(complexity_badge(ComplexityClass::Complex).contains("complex"));
    }
}
