//! sea-orm entities for the check-in service.

pub mod activities;
pub mod event_registrations;
pub mod events;
pub mod sub_events;
pub mod teams;
pub mod users;
pub mod verification_tokens;
