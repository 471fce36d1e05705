//! Read models derived from a ticket snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ServiceCategory;

use super::{Ticket, TicketStatus};

/// Number of waiting tickets, overall and per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingCounts {
    pub total: usize,
    /// Every catalog category is present, zero if nothing is waiting.
    pub by_category: BTreeMap<ServiceCategory, usize>,
}

impl WaitingCounts {
    pub fn for_category(&self, category: ServiceCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// What the public display shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBoard {
    /// Most recently called first.
    pub now_serving: Vec<Ticket>,
    /// Next in line first.
    pub up_next: Vec<Ticket>,
    pub waiting_total: usize,
}

/// What a staff member sees for their counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSummary {
    pub counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving: Option<Ticket>,
    pub completed: usize,
    pub skipped: usize,
}

pub fn waiting_counts(tickets: &[Ticket]) -> WaitingCounts {
    let mut by_category: BTreeMap<ServiceCategory, usize> =
        ServiceCategory::ALL.iter().map(|c| (*c, 0)).collect();
    let mut total = 0;

    for ticket in tickets.iter().filter(|t| t.status == TicketStatus::Waiting) {
        *by_category.entry(ticket.category).or_insert(0) += 1;
        total += 1;
    }

    WaitingCounts { total, by_category }
}

pub fn board(tickets: &[Ticket], serving_limit: usize, waiting_limit: usize) -> QueueBoard {
    let mut now_serving: Vec<Ticket> = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Serving)
        .cloned()
        .collect();
    now_serving.sort_by_key(|t| std::cmp::Reverse(t.served_at.unwrap_or(0)));
    now_serving.truncate(serving_limit);

    let mut waiting: Vec<Ticket> = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Waiting)
        .cloned()
        .collect();
    let waiting_total = waiting.len();
    // Stable sort keeps insertion order for equal timestamps.
    waiting.sort_by_key(|t| t.created_at);
    waiting.truncate(waiting_limit);

    QueueBoard {
        now_serving,
        up_next: waiting,
        waiting_total,
    }
}

pub fn counter_summary(tickets: &[Ticket], counter: u32) -> CounterSummary {
    let at_counter = || tickets.iter().filter(move |t| t.counter == Some(counter));

    CounterSummary {
        counter,
        serving: at_counter()
            .find(|t| t.status == TicketStatus::Serving)
            .cloned(),
        completed: at_counter()
            .filter(|t| t.status == TicketStatus::Completed)
            .count(),
        skipped: at_counter()
            .filter(|t| t.status == TicketStatus::Skipped)
            .count(),
    }
}
