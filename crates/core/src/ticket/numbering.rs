//! Ticket number generation.
//!
//! A ticket number is the category prefix followed by a sequence padded to
//! three digits. The sequence is the count of tickets already issued in the
//! category plus one. Tickets are only removed by a full reset, so the
//! sequence is strictly increasing for the lifetime of a store.
//!
//! Callers must hold the store's lock across computing the number and
//! inserting the ticket; otherwise two concurrent creations in the same
//! category can observe the same count.

use crate::catalog::ServiceCategory;

use super::Ticket;

/// Format `sequence` as a ticket number for `category`.
pub fn format_ticket_number(category: ServiceCategory, sequence: usize) -> String {
    format!("{}{:03}", category.prefix(), sequence)
}

/// Next ticket number for `category`, given every ticket currently issued.
pub fn next_ticket_number(category: ServiceCategory, tickets: &[Ticket]) -> String {
    let issued = tickets.iter().filter(|t| t.category == category).count();
    format_ticket_number(category, issued + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::Transition;

    fn ticket(category: ServiceCategory, number: &str) -> Ticket {
        Ticket::waiting(number, number, category, None, 0)
    }

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_ticket_number(ServiceCategory::Priority, 1), "A001");
        assert_eq!(format_ticket_number(ServiceCategory::Payment, 42), "G042");
        assert_eq!(format_ticket_number(ServiceCategory::Underwriting, 999), "K999");
    }

    #[test]
    fn test_format_widens_past_999() {
        assert_eq!(format_ticket_number(ServiceCategory::Priority, 1000), "A1000");
    }

    #[test]
    fn test_first_ticket_in_empty_store() {
        assert_eq!(next_ticket_number(ServiceCategory::SalaryLoan, &[]), "F001");
    }

    #[test]
    fn test_sequence_is_per_category() {
        let tickets = vec![
            ticket(ServiceCategory::Priority, "A001"),
            ticket(ServiceCategory::RefundDividend, "B001"),
            ticket(ServiceCategory::Priority, "A002"),
        ];
        assert_eq!(next_ticket_number(ServiceCategory::Priority, &tickets), "A003");
        assert_eq!(next_ticket_number(ServiceCategory::RefundDividend, &tickets), "B002");
        assert_eq!(next_ticket_number(ServiceCategory::Payment, &tickets), "G001");
    }

    #[test]
    fn test_finished_tickets_still_count() {
        let mut done = ticket(ServiceCategory::Priority, "A001");
        done.apply(Transition::Serve { counter: 1 }, 1).unwrap();
        done.apply(Transition::Complete, 2).unwrap();

        assert_eq!(next_ticket_number(ServiceCategory::Priority, &[done]), "A002");
    }
}
