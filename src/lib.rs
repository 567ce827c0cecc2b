//! Employee lifecycle workflow engine for HR administration.
//!
//! The crate models the path from job applicant to former employee as a set of
//! cooperating state machines: application intake, interview scheduling and
//! feedback, offer negotiation, onboarding, termination, multi-department
//! clearance, and access revocation. Everything outside the lifecycle
//! (profile CRUD, org structure, document storage, notification transport) is
//! consumed through the contracts in [`directory`] and [`notifications`].

pub mod config;
pub mod demo;
pub mod directory;
pub mod error;
pub mod notifications;
pub mod telemetry;
pub mod workflows;
