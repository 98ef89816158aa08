//! Domain services. Each module owns one record type and talks to the store
//! directly; none of them holds a transaction across entities.

pub mod appointments;
pub mod certificates;
pub mod contracts;
pub mod domestic_labor;
pub mod profiles;
pub mod regulations;
pub mod resumes;
pub mod tickets;
