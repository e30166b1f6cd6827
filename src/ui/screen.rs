//! The declarative view model: everything that is currently shown, changed only by `apply`.

use crate::ui::render::{
    BudgetRow, CategoryOption, DashboardView, ReportSummary, StatCard, TransactionRow,
};
use crate::ui::Section;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The two top-level views.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Auth,
    Main,
}

/// The rendered content of one section.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    #[default]
    Empty,
    Dashboard(DashboardView),
    Transactions {
        rows: Vec<TransactionRow>,
        categories: Vec<CategoryOption>,
    },
    Budgets {
        rows: Vec<BudgetRow>,
        categories: Vec<CategoryOption>,
    },
    Report(ReportSummary),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionView {
    pub visible: bool,
    pub content: Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// One change to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Show the authentication view and forget all section content.
    ShowAuth,
    /// Show the main view for the named user.
    ShowMain { user: String },
    /// Make this section the only visible one.
    Activate(Section),
    /// Replace the whole content of a section.
    Replace(Section, Content),
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    view: View,
    user: Option<String>,
    sections: BTreeMap<Section, SectionView>,
    notices: Vec<Notice>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// The authentication view with every section hidden and empty.
    pub fn new() -> Self {
        Self {
            view: View::Auth,
            user: None,
            sections: Section::ALL
                .into_iter()
                .map(|s| (s, SectionView::default()))
                .collect(),
            notices: Vec::new(),
        }
    }

    /// The single place where the screen changes.
    pub fn apply(&mut self, patch: Patch) {
        match patch {
            Patch::ShowAuth => {
                self.view = View::Auth;
                self.user = None;
                for section in self.sections.values_mut() {
                    *section = SectionView::default();
                }
            }
            Patch::ShowMain { user } => {
                self.view = View::Main;
                self.user = Some(user);
            }
            Patch::Activate(active) => {
                for (section, view) in self.sections.iter_mut() {
                    view.visible = *section == active;
                }
            }
            Patch::Replace(section, content) => {
                self.sections.entry(section).or_default().content = content;
            }
            Patch::Notify(notice) => self.notices.push(notice),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The visible sections. In the main view there is exactly one once a section was activated.
    pub fn visible_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|(_, view)| view.visible)
            .map(|(section, _)| *section)
            .collect()
    }

    pub fn content(&self, section: Section) -> &Content {
        static EMPTY: Content = Content::Empty;
        self.sections
            .get(&section)
            .map(|view| &view.content)
            .unwrap_or(&EMPTY)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

fn write_cards(f: &mut Formatter<'_>, cards: &[StatCard]) -> std::fmt::Result {
    for card in cards {
        writeln!(f, "  {:<16} {:>14}", card.label, card.value)?;
    }
    Ok(())
}

fn write_transactions(f: &mut Formatter<'_>, rows: &[TransactionRow]) -> std::fmt::Result {
    if rows.is_empty() {
        return writeln!(f, "  No transactions yet.");
    }
    for row in rows {
        writeln!(
            f,
            "  {:<14} {:<20} {:>12}  {}",
            row.date,
            row.category,
            row.amount,
            row.description.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

impl Display for Content {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Empty => Ok(()),
            Content::Dashboard(view) => {
                write_cards(f, &view.cards)?;
                writeln!(f)?;
                writeln!(f, "  Recent transactions")?;
                write_transactions(f, &view.recent)
            }
            Content::Transactions { rows, .. } => write_transactions(f, rows),
            Content::Budgets { rows, .. } => {
                if rows.is_empty() {
                    return writeln!(f, "  No budgets set yet.");
                }
                for row in rows {
                    writeln!(f, "  {}  [{}]", row.category, row.id)?;
                    writeln!(f, "    {}", row.period)?;
                    writeln!(f, "    {}, {}", row.spent, row.remaining)?;
                    writeln!(
                        f,
                        "    {} {} ({})",
                        row.progress.bar(20),
                        row.used,
                        row.progress.class
                    )?;
                }
                Ok(())
            }
            Content::Report(summary) => {
                writeln!(f, "  {}", summary.title)?;
                write_cards(f, &summary.cards)?;
                if !summary.categories.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "  Expenses by category")?;
                    for line in &summary.categories {
                        writeln!(f, "  {:<20} {:>14}", line.category, line.amount)?;
                    }
                }
                if !summary.months.is_empty() {
                    writeln!(f)?;
                    for m in &summary.months {
                        writeln!(
                            f,
                            "  {:<10} in {:>12} out {:>12} net {:>13} ({} transactions)",
                            m.month, m.income, m.expenses, m.balance, m.transactions
                        )?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for Screen {
    /// Prints the visible part of the screen.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.view {
            View::Auth => writeln!(f, "Not logged in. Use 'login' or 'register'."),
            View::Main => {
                if let Some(user) = self.user.as_deref() {
                    writeln!(f, "Logged in as {user}")?;
                }
                for section in self.visible_sections() {
                    writeln!(f, "== {} ==", section.title())?;
                    write!(f, "{}", self.content(section))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_screen() -> Screen {
        let mut screen = Screen::new();
        screen.apply(Patch::ShowMain {
            user: "Demo User".into(),
        });
        screen
    }

    #[test]
    fn test_activate_leaves_one_visible() {
        let mut screen = main_screen();
        for first in Section::ALL {
            for second in Section::ALL {
                screen.apply(Patch::Activate(first));
                screen.apply(Patch::Activate(second));
                assert_eq!(screen.visible_sections(), vec![second]);
            }
        }
    }

    #[test]
    fn test_replace_swaps_whole_content() {
        let mut screen = main_screen();
        screen.apply(Patch::Replace(
            Section::Budgets,
            Content::Budgets {
                rows: Vec::new(),
                categories: Vec::new(),
            },
        ));
        screen.apply(Patch::Replace(Section::Budgets, Content::Empty));
        assert_eq!(screen.content(Section::Budgets), &Content::Empty);
    }

    #[test]
    fn test_show_auth_forgets_everything() {
        let mut screen = main_screen();
        screen.apply(Patch::Activate(Section::Transactions));
        screen.apply(Patch::Replace(
            Section::Transactions,
            Content::Transactions {
                rows: Vec::new(),
                categories: Vec::new(),
            },
        ));
        screen.apply(Patch::ShowAuth);
        assert_eq!(screen.view(), View::Auth);
        assert!(screen.user().is_none());
        assert!(screen.visible_sections().is_empty());
        assert_eq!(screen.content(Section::Transactions), &Content::Empty);
        assert!(screen.to_string().starts_with("Not logged in"));
    }

    #[test]
    fn test_notices_accumulate_until_taken() {
        let mut screen = Screen::new();
        screen.apply(Patch::Notify(Notice::error("Invalid email or password")));
        screen.apply(Patch::Notify(Notice::info("ok")));
        assert_eq!(screen.notices().len(), 2);
        let taken = screen.take_notices();
        assert!(taken[0].is_error());
        assert!(screen.notices().is_empty());
    }

    #[test]
    fn test_display_shows_only_visible_section() {
        let mut screen = main_screen();
        screen.apply(Patch::Activate(Section::Budgets));
        let text = screen.to_string();
        assert!(text.contains("== Budgets =="));
        assert!(!text.contains("== Dashboard =="));
        assert!(text.contains("Logged in as Demo User"));
    }
}
