//! Applicant intake through offer: the pre-hire half of the lifecycle.

pub mod domain;
pub mod interviews;
pub mod memory;
pub mod offers;
pub mod pipeline;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, FeedbackRecord, Interview, InterviewId,
    InterviewStatus, Offer, OfferDecision, OfferId, OfferResponse, PublishStatus,
    RankedApplication, Referral, Requisition, RequisitionId, Stage, StatusChange,
};
pub use interviews::{InterviewScheduler, REFERRAL_BONUS};
pub use memory::MemoryRecruitingRepository;
pub use offers::OfferNegotiation;
pub use pipeline::ApplicationPipeline;
pub use repository::RecruitingRepository;
pub use router::{recruiting_router, RecruitingState};
