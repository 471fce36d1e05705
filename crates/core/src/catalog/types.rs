//! Service category definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A service type a ticket can be issued for.
///
/// The set is fixed at build time; every category owns a distinct one-letter
/// prefix used in ticket numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    /// Senior citizens, persons with disability, pregnant members.
    Priority,
    RefundDividend,
    TerminationCsv,
    MaturityBonus,
    EquityPolicyLoan,
    SalaryLoan,
    Payment,
    RealEstate,
    AccountsMonitoring,
    BillingCollection,
    Underwriting,
    DisabilityDeath,
}

/// Display metadata for a service category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    pub category: ServiceCategory,
    pub label: &'static str,
    pub prefix: char,
    pub description: &'static str,
}

const SERVICES: [ServiceDefinition; 12] = [
    ServiceDefinition {
        category: ServiceCategory::Priority,
        label: "Senior / PWD / Pregnant",
        prefix: 'A',
        description: "Priority lane for eligible members",
    },
    ServiceDefinition {
        category: ServiceCategory::RefundDividend,
        label: "Refund & Dividend",
        prefix: 'B',
        description: "Claim refunds and dividend payouts",
    },
    ServiceDefinition {
        category: ServiceCategory::TerminationCsv,
        label: "Termination Benefit / CSV",
        prefix: 'C',
        description: "Account termination or Cash Surrender Value",
    },
    ServiceDefinition {
        category: ServiceCategory::MaturityBonus,
        label: "Maturity / Bonus",
        prefix: 'D',
        description: "Policy maturity and bonus claims",
    },
    ServiceDefinition {
        category: ServiceCategory::EquityPolicyLoan,
        label: "Equity / Policy Loan",
        prefix: 'E',
        description: "Apply for equity or policy loans",
    },
    ServiceDefinition {
        category: ServiceCategory::SalaryLoan,
        label: "Salary Loan / MEDAL",
        prefix: 'F',
        description: "Salary loan applications and MEDAL",
    },
    ServiceDefinition {
        category: ServiceCategory::Payment,
        label: "Payment",
        prefix: 'G',
        description: "Premium payments and loan repayments",
    },
    ServiceDefinition {
        category: ServiceCategory::RealEstate,
        label: "Real Estate",
        prefix: 'H',
        description: "Housing and real estate inquiries",
    },
    ServiceDefinition {
        category: ServiceCategory::AccountsMonitoring,
        label: "Accounts Monitoring",
        prefix: 'I',
        description: "Check account status and history",
    },
    ServiceDefinition {
        category: ServiceCategory::BillingCollection,
        label: "Billing and Collection",
        prefix: 'J',
        description: "Billing inquiries and collection matters",
    },
    ServiceDefinition {
        category: ServiceCategory::Underwriting,
        label: "Underwriting Policy",
        prefix: 'K',
        description: "New policy underwriting and adjustments",
    },
    ServiceDefinition {
        category: ServiceCategory::DisabilityDeath,
        label: "Disability, Death Benefit",
        prefix: 'L',
        description: "Claims for disability or death benefits",
    },
];

impl ServiceCategory {
    /// Every category, in catalog order.
    pub const ALL: [ServiceCategory; 12] = [
        ServiceCategory::Priority,
        ServiceCategory::RefundDividend,
        ServiceCategory::TerminationCsv,
        ServiceCategory::MaturityBonus,
        ServiceCategory::EquityPolicyLoan,
        ServiceCategory::SalaryLoan,
        ServiceCategory::Payment,
        ServiceCategory::RealEstate,
        ServiceCategory::AccountsMonitoring,
        ServiceCategory::BillingCollection,
        ServiceCategory::Underwriting,
        ServiceCategory::DisabilityDeath,
    ];

    /// Returns the catalog entry for this category.
    pub fn definition(&self) -> &'static ServiceDefinition {
        // SERVICES is declared in the same order as the enum variants.
        &SERVICES[*self as usize]
    }

    /// Returns the ticket number prefix.
    pub fn prefix(&self) -> char {
        self.definition().prefix
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    /// Returns the wire name (e.g. `"SALARY_LOAN"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Priority => "PRIORITY",
            ServiceCategory::RefundDividend => "REFUND_DIVIDEND",
            ServiceCategory::TerminationCsv => "TERMINATION_CSV",
            ServiceCategory::MaturityBonus => "MATURITY_BONUS",
            ServiceCategory::EquityPolicyLoan => "EQUITY_POLICY_LOAN",
            ServiceCategory::SalaryLoan => "SALARY_LOAN",
            ServiceCategory::Payment => "PAYMENT",
            ServiceCategory::RealEstate => "REAL_ESTATE",
            ServiceCategory::AccountsMonitoring => "ACCOUNTS_MONITORING",
            ServiceCategory::BillingCollection => "BILLING_COLLECTION",
            ServiceCategory::Underwriting => "UNDERWRITING",
            ServiceCategory::DisabilityDeath => "DISABILITY_DEATH",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full service catalog in display order.
pub fn services() -> &'static [ServiceDefinition] {
    &SERVICES
}

/// Looks up a category by its ticket prefix (case-insensitive).
pub fn find_by_prefix(prefix: char) -> Option<ServiceCategory> {
    let prefix = prefix.to_ascii_uppercase();
    SERVICES
        .iter()
        .find(|s| s.prefix == prefix)
        .map(|s| s.category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_definitions_line_up_with_variants() {
        for category in ServiceCategory::ALL {
            assert_eq!(category.definition().category, category);
        }
    }

    #[test]
    fn test_prefixes_are_unique() {
        let prefixes: HashSet<char> = services().iter().map(|s| s.prefix).collect();
        assert_eq!(prefixes.len(), services().len());
    }

    #[test]
    fn test_prefix_and_label() {
        assert_eq!(ServiceCategory::Priority.prefix(), 'A');
        assert_eq!(ServiceCategory::SalaryLoan.prefix(), 'F');
        assert_eq!(ServiceCategory::Payment.label(), "Payment");
    }

    #[test]
    fn test_find_by_prefix() {
        assert_eq!(find_by_prefix('G'), Some(ServiceCategory::Payment));
        assert_eq!(find_by_prefix('b'), Some(ServiceCategory::RefundDividend));
        assert_eq!(find_by_prefix('Z'), None);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ServiceCategory::EquityPolicyLoan).unwrap();
        assert_eq!(json, "\"EQUITY_POLICY_LOAN\"");

        let parsed: ServiceCategory = serde_json::from_str("\"DISABILITY_DEATH\"").unwrap();
        assert_eq!(parsed, ServiceCategory::DisabilityDeath);
    }

    #[test]
    fn test_display_matches_serde() {
        for category in ServiceCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }
}
