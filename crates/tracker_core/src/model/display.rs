use crate::model::{Category, Priority, TaskStatus};

/// Label, icon and chart color attached to an enumerated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMeta {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl DisplayMeta {
    /// Truecolor ANSI foreground sequence for `color`, which is `#rrggbb`.
    pub fn ansi_color(&self) -> Option<String> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
        };
        let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
        Some(format!("\x1b[38;2;{r};{g};{b}m"))
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Applies [`DisplayMeta`] colors to terminal text, or passes text through
/// untouched when color is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// `text` in the value's own color.
    pub fn paint(self, meta: &DisplayMeta, text: &str) -> String {
        match meta.ansi_color() {
            Some(color) if self.enabled => format!("{color}{text}{RESET}"),
            _ => text.to_string(),
        }
    }

    /// Icon followed by the colored label, e.g. `🔴 High`.
    pub fn badge(self, meta: &DisplayMeta) -> String {
        format!("{} {}", meta.icon, self.paint(meta, meta.label))
    }

    pub fn bold(self, text: &str) -> String {
        self.wrap(BOLD, text)
    }

    pub fn dim(self, text: &str) -> String {
        self.wrap(DIM, text)
    }

    fn wrap(self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl TaskStatus {
    pub fn meta(self) -> DisplayMeta {
        match self {
            Self::Completed => DisplayMeta {
                label: self.label(),
                icon: "✅",
                color: "#28a745",
            },
            Self::Pending => DisplayMeta {
                label: self.label(),
                icon: "⏳",
                color: "#ffc107",
            },
            Self::InProgress => DisplayMeta {
                label: self.label(),
                icon: "🔄",
                color: "#17a2b8",
            },
        }
    }
}

impl Priority {
    pub fn meta(self) -> DisplayMeta {
        match self {
            Self::High => DisplayMeta {
                label: self.label(),
                icon: "🔴",
                color: "#dc3545",
            },
            Self::Medium => DisplayMeta {
                label: self.label(),
                icon: "🟡",
                color: "#ffc107",
            },
            Self::Low => DisplayMeta {
                label: self.label(),
                icon: "🟢",
                color: "#28a745",
            },
        }
    }
}

impl Category {
    pub fn meta(self) -> DisplayMeta {
        let (icon, color) = match self {
            Self::Work => ("💼", "#007bff"),
            Self::Personal => ("🏠", "#6f42c1"),
            Self::Health => ("💪", "#28a745"),
            Self::Study => ("📚", "#fd7e14"),
            Self::Other => ("📌", "#6c757d"),
        };
        DisplayMeta {
            label: self.label(),
            icon,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Painter;
    use crate::model::{Category, Priority, TaskStatus};

    #[test]
    fn every_value_has_metadata() {
        for status in TaskStatus::ALL {
            let meta = status.meta();
            assert_eq!(meta.label, status.label());
            assert!(meta.ansi_color().is_some());
        }
        for priority in Priority::ALL {
            assert!(priority.meta().ansi_color().is_some());
        }
        for category in Category::ALL {
            assert!(!category.meta().icon.is_empty());
            assert!(category.meta().ansi_color().is_some());
        }
    }

    #[test]
    fn ansi_color_decodes_hex() {
        let meta = TaskStatus::Completed.meta();
        assert_eq!(meta.ansi_color().as_deref(), Some("\x1b[38;2;40;167;69m"));
    }

    #[test]
    fn painter_colors_only_when_enabled() {
        let work = Category::Work.meta();

        assert_eq!(Painter::plain().badge(&work), "💼 Work");
        assert_eq!(Painter::plain().bold("Dashboard"), "Dashboard");
        assert_eq!(
            Painter::new(true).badge(&work),
            "💼 \x1b[38;2;0;123;255mWork\x1b[0m"
        );
        assert_eq!(Painter::new(true).dim("note"), "\x1b[2mnote\x1b[0m");
    }

    #[test]
    fn painter_ignores_malformed_color() {
        let meta = super::DisplayMeta {
            label: "odd",
            icon: "",
            color: "teal",
        };
        assert_eq!(Painter::new(true).paint(&meta, "odd"), "odd");
    }
}
