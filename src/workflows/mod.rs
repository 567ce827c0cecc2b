//! Lifecycle workflow state machines.
//!
//! Each submodule owns one slice of the employee lifecycle: `recruiting`
//! covers applicant intake through offer, `onboarding` covers the new-hire
//! checklist, and `separation` covers termination, clearance, and access
//! revocation.

pub mod error;
pub mod onboarding;
pub mod recruiting;
pub mod separation;
