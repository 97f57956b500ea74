//! Organization wizard: welcome, organization details, members, completion.
//!
//! The administrator names the organization (the slug follows the name
//! until one is typed), optionally uploads a logo, and invites members by
//! email. Leaving the details step creates the organization through the
//! identity service; the completion step shows a summary.

pub mod flow;
pub mod model;
pub mod wizard;

pub use flow::OrganizationFlow;
pub use model::{
    CreatedOrganization, Industry, Member, MemberDraft, MemberRole, OrganizationData,
    OrganizationDetails, OrganizationDetailsPatch, OrganizationPatch, OrganizationStep,
    OrganizationSummary,
};
pub use wizard::OrganizationWizard;
