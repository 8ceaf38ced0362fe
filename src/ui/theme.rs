use owo_colors::Style;
use std::sync::OnceLock;

use crate::compare::Severity;
use crate::matrix::ComplexityClass;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    pub minor: Style,
    pub major: Style,
    pub critical: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if super::is_quiet() || !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            minor: Style::new().green(),
            major: Style::new().yellow(),
            critical: Style::new().red().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            minor: Style::new(),
            major: Style::new(),
            critical: Style::new(),
        }
    }

    pub fn severity(&self, severity: Severity) -> Style {
        match severity {
            Severity::Minor => self.minor.clone(),
            Severity::Major => self.major.clone(),
            Severity::Critical => self.critical.clone(),
        }
    }

    pub fn complexity(&self, complexity: ComplexityClass) -> Style {
        match complexity {
            ComplexityClass::Trivial | ComplexityClass::Simple => self.success.clone(),
            ComplexityClass::Moderate => self.warn.clone(),
            ComplexityClass::Complex | ComplexityClass::Impossible => self.error.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_renders_unstyled() {
        let plain = Theme::plain();
        let rendered = "critical".style(plain.severity(Severity::Critical)).to_string();
        assert_eq!(rendered, "critical");
    }

    #[test]
    fn test_colored_theme_styles_severity() {
        let colored = Theme::colored();
        let rendered = "critical".style(colored.severity(Severity::Critical)).to_string();
        assert_ne!(rendered, "critical");
        assert!(rendered.contains("critical"));
    }
}
