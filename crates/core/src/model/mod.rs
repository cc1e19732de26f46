//! Domain records for the institution directory.

pub mod contact;
pub mod institution;
pub mod wire;

pub use contact::{normalize_website, split_contacts};
pub use institution::{InstitutionRecord, ProgramRef};
pub use wire::{lenient_string, string_or_number};
