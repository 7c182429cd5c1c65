//! Transient notifications shown over the footer. Fire-and-forget: raising a
//! new toast replaces whatever was showing, and the active toast expires after
//! a fixed number of UI ticks.

/// How many ticks a toast stays visible (ticks arrive every 300ms).
pub const TOAST_TICKS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

impl Toast {
    pub fn normal(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Normal,
        }
    }

    pub fn destructive(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Destructive,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructive_toast_with_description() {
        let toast = Toast::destructive("Error getting response").with_description("Please try again");
        assert_eq!(toast.severity, Severity::Destructive);
        assert_eq!(toast.title, "Error getting response");
        assert_eq!(toast.description.as_deref(), Some("Please try again"));
    }

    #[test]
    fn test_normal_toast_has_no_description() {
        let toast = Toast::normal("Saved");
        assert_eq!(toast.severity, Severity::Normal);
        assert!(toast.description.is_none());
    }
}
