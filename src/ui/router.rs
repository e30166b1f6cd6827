//! Which section of the main view is showing, and whether a finished load still belongs there.

use serde::{Deserialize, Serialize};

/// The mutually exclusive top-level views of the main application.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Dashboard,
    Transactions,
    Budgets,
    Reports,
}

serde_plain::derive_display_from_serialize!(Section);
serde_plain::derive_fromstr_from_deserialize!(Section);

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Dashboard,
        Section::Transactions,
        Section::Budgets,
        Section::Reports,
    ];

    /// Sections with list content refetch every time they are activated. Reports only render
    /// when a report query is submitted.
    pub fn reloads_on_activate(self) -> bool {
        !matches!(self, Section::Reports)
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Transactions => "Transactions",
            Section::Budgets => "Budgets",
            Section::Reports => "Reports",
        }
    }
}

/// Identifies one activation of a section. A load started for an activation may only write its
/// result while that activation is still the router's current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Activation {
    section: Section,
    generation: u64,
}

impl Activation {
    pub fn section(&self) -> Section {
        self.section
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the active section and a generation counter that moves on every activation.
#[derive(Debug, Default, Clone)]
pub struct Router {
    active: Section,
    generation: u64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Section {
        self.active
    }

    /// Makes `section` the active one. Activating the already active section is allowed and
    /// still starts a new generation, so an earlier in-flight load for it goes stale.
    pub fn activate(&mut self, section: Section) -> Activation {
        self.active = section;
        self.generation += 1;
        self.current()
    }

    /// The activation that is current right now.
    pub fn current(&self) -> Activation {
        Activation {
            section: self.active,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, activation: Activation) -> bool {
        activation == self.current()
    }

    /// Returns to the default section and invalidates every outstanding activation.
    pub fn reset(&mut self) {
        self.active = Section::default();
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_names() {
        assert_eq!(Section::Budgets.to_string(), "budgets");
        assert_eq!("reports".parse::<Section>().unwrap(), Section::Reports);
        assert!("settings".parse::<Section>().is_err());
    }

    #[test]
    fn test_activation_goes_stale() {
        let mut router = Router::new();
        let first = router.activate(Section::Transactions);
        assert!(router.is_current(first));
        let second = router.activate(Section::Budgets);
        assert!(!router.is_current(first));
        assert!(router.is_current(second));
        assert_eq!(router.active(), Section::Budgets);
    }

    #[test]
    fn test_reactivating_same_section_is_idempotent_for_visibility() {
        let mut router = Router::new();
        let first = router.activate(Section::Budgets);
        let again = router.activate(Section::Budgets);
        assert_eq!(router.active(), Section::Budgets);
        assert_eq!(first.section(), again.section());
        assert!(again.generation() > first.generation());
        assert!(!router.is_current(first));
    }

    #[test]
    fn test_reset_invalidates() {
        let mut router = Router::new();
        let activation = router.activate(Section::Reports);
        router.reset();
        assert_eq!(router.active(), Section::Dashboard);
        assert!(!router.is_current(activation));
    }

    #[test]
    fn test_only_reports_skip_reload() {
        let skipped: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|s| !s.reloads_on_activate())
            .collect();
        assert_eq!(skipped, vec![Section::Reports]);
    }
}
