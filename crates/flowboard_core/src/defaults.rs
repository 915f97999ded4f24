//! Built-in column sequence and seed cards.
//!
//! The seed set is what a fresh board shows, and what storage falls back to
//! when persisted state is missing or unreadable.

use crate::model::card::{Card, Effort, SlaRisk};
use crate::model::column::Column;
use chrono::{DateTime, SecondsFormat};

/// Storage key the card list is persisted under.
pub const STORAGE_KEY: &str = "flow-kanban-cards";

const DAY_MS: i64 = 1000 * 60 * 60 * 24;

/// Backlog → To Do → In Progress → Review → Done.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("col-1", "Backlog").with_color("border-neutral-500"),
        Column::new("col-2", "To Do")
            .with_wip_limit(5)
            .with_color("border-gray-500"),
        Column::new("col-3", "In Progress")
            .with_wip_limit(3)
            .with_color("border-blue-500"),
        Column::new("col-4", "Review")
            .with_wip_limit(2)
            .with_color("border-purple-500"),
        Column::new("col-5", "Done").with_color("border-green-500"),
    ]
}

/// Seed cards with ages relative to `now_ms`.
pub fn default_cards(now_ms: i64) -> Vec<Card> {
    let days_ago = |days: f64| now_ms - (DAY_MS as f64 * days) as i64;
    let iso = |epoch_ms: i64| {
        DateTime::from_timestamp_millis(epoch_ms)
            .map(|value| value.to_rfc3339_opts(SecondsFormat::Millis, true))
    };

    vec![
        seed("card-1", "Design the new login flow", "col-1", days_ago(5.0))
            .tags(&["UI", "Design"])
            .effort(Effort::M)
            .done(),
        seed("card-2", "Develop user authentication API", "col-2", days_ago(2.0))
            .risk(SlaRisk::Medium)
            .tags(&["API", "Backend"])
            .effort(Effort::L)
            .done(),
        seed("card-3", "Fix critical bug in payment gateway", "col-3", days_ago(1.0))
            .blocked()
            .risk(SlaRisk::High)
            .due(iso(days_ago(2.0)))
            .tags(&["Bug", "Payments"])
            .effort(Effort::M)
            .done(),
        seed("card-4", "Implement password reset functionality", "col-3", now_ms)
            .risk(SlaRisk::Medium)
            .tags(&["Feature"])
            .effort(Effort::S)
            .done(),
        seed("card-5", "Write documentation for the new API", "col-2", days_ago(3.0))
            .tags(&["Docs"])
            .done(),
        seed("card-6", "Review marketing copy for landing page", "col-4", days_ago(0.5))
            .tags(&["Content"])
            .effort(Effort::S)
            .done(),
        seed("card-7", "Deploy staging environment", "col-4", days_ago(1.0))
            .risk(SlaRisk::High)
            .due(iso(now_ms + DAY_MS))
            .tags(&["DevOps"])
            .done(),
        seed("card-8", "Onboard new team member", "col-1", days_ago(10.0))
            .tags(&["HR"])
            .done(),
        seed("card-9", "Refactor state management", "col-3", days_ago(2.0))
            .risk(SlaRisk::Medium)
            .tags(&["TechDebt"])
            .effort(Effort::L)
            .done(),
        seed("card-10", "Setup CI/CD pipeline", "col-2", days_ago(4.0))
            .tags(&["DevOps"])
            .effort(Effort::M)
            .done(),
        seed("card-11", "Test user profile page on mobile", "col-2", days_ago(1.0))
            .tags(&["QA", "Mobile"])
            .done(),
    ]
}

struct Seed(Card);

fn seed(id: &str, title: &str, column_id: &str, age: i64) -> Seed {
    Seed(Card::with_id(id, title, column_id, age))
}

impl Seed {
    fn tags(mut self, tags: &[&str]) -> Self {
        self.0.tags = tags.iter().map(|tag| (*tag).to_string()).collect();
        self
    }

    fn effort(mut self, effort: Effort) -> Self {
        self.0.effort = Some(effort);
        self
    }

    fn risk(mut self, risk: SlaRisk) -> Self {
        self.0.sla_risk = risk;
        self
    }

    fn due(mut self, due_date: Option<String>) -> Self {
        self.0.due_date = due_date;
        self
    }

    fn blocked(mut self) -> Self {
        self.0.blocked = true;
        self
    }

    fn done(self) -> Card {
        self.0
    }
}
