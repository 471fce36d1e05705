//! Service catalog: the fixed set of categories a ticket can be issued for.

mod types;

pub use types::{find_by_prefix, services, ServiceCategory, ServiceDefinition};
