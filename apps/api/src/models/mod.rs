pub mod appointment;
pub mod audit;
pub mod certificate;
pub mod chat;
pub mod contract;
pub mod domestic_labor;
pub mod profile;
pub mod proactive;
pub mod regulation;
pub mod resume;
pub mod ticket;
