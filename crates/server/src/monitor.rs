//! Change detection for the headless display client.
//!
//! The monitor polls its local queue and announces what a wall display
//! would: a ticket newly called to a counter, a recall, or the display
//! losing and regaining the store.

use std::collections::HashMap;
use std::fmt;

use queueline_core::{Ticket, TicketStatus};

/// Something worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    NowServing { number: String, counter: u32 },
    Recalled { number: String, counter: u32 },
    WentOffline,
    BackOnline,
}

impl fmt::Display for BoardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardEvent::NowServing { number, counter } => {
                write!(f, "Now serving {} at counter {}", number, counter)
            }
            BoardEvent::Recalled { number, counter } => {
                write!(f, "Recalling {} to counter {}", number, counter)
            }
            BoardEvent::WentOffline => write!(f, "Offline, showing last known queue"),
            BoardEvent::BackOnline => write!(f, "Back online"),
        }
    }
}

/// Remembers which tickets were being served and reports what changed.
///
/// Works on the full ticket list rather than the truncated board, so a
/// ticket pushed off the display by newer calls is not announced again
/// when it scrolls back. The first observation is a silent baseline.
#[derive(Debug, Default)]
pub struct BoardWatcher {
    /// Serving ticket id -> last recall time. `None` until the baseline.
    serving: Option<HashMap<String, Option<i64>>>,
    online: Option<bool>,
}

impl BoardWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, tickets: &[Ticket], online: bool) -> Vec<BoardEvent> {
        let mut events = Vec::new();

        match (self.online, online) {
            (Some(true) | None, false) => events.push(BoardEvent::WentOffline),
            (Some(false), true) => events.push(BoardEvent::BackOnline),
            _ => {}
        }
        self.online = Some(online);

        let mut calls: Vec<(&Ticket, u32)> = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Serving)
            .filter_map(|t| t.counter.map(|counter| (t, counter)))
            .collect();
        // Oldest call first so announcements read in order.
        calls.sort_by_key(|(t, _)| t.served_at);

        let previous = self.serving.take();
        let mut serving = HashMap::with_capacity(calls.len());
        for (ticket, counter) in calls {
            if let Some(previous) = &previous {
                match previous.get(&ticket.id) {
                    None => events.push(BoardEvent::NowServing {
                        number: ticket.number.clone(),
                        counter,
                    }),
                    Some(recalled_at) if *recalled_at != ticket.recalled_at => {
                        events.push(BoardEvent::Recalled {
                            number: ticket.number.clone(),
                            counter,
                        })
                    }
                    Some(_) => {}
                }
            }
            serving.insert(ticket.id.clone(), ticket.recalled_at);
        }
        self.serving = Some(serving);

        events
    }
}
