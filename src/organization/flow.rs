//! Organization wizard rules: how patches merge and how each step validates.

use crate::error::StepError;
use crate::wizard::validation::{
    derive_slug, is_valid_email, is_valid_slug, require_non_blank, suggest_slug,
};
use crate::wizard::{FieldErrors, TaskState, WizardFlow};

use super::model::{
    Member, OrganizationData, OrganizationDetails, OrganizationPatch, OrganizationStep, fields,
};

/// Marker type tying the organization wizard's types to the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationFlow;

impl WizardFlow for OrganizationFlow {
    type Step = OrganizationStep;
    type Data = OrganizationData;
    type Patch = OrganizationPatch;

    fn apply(data: &mut OrganizationData, patch: OrganizationPatch) -> Vec<&'static str> {
        match patch {
            OrganizationPatch::UserName(name) => {
                data.user_name = name;
                Vec::new()
            }
            OrganizationPatch::Details(patch) => {
                let details = &mut data.details;
                let mut touched = Vec::new();
                if let Some(name) = patch.name {
                    if !details.slug_is_custom {
                        details.slug = suggest_slug(&name);
                        touched.push(fields::SLUG);
                    }
                    details.name = name;
                    touched.push(fields::NAME);
                }
                if let Some(slug) = patch.slug {
                    details.slug = derive_slug(&slug);
                    details.slug_is_custom = !details.slug.is_empty();
                    touched.push(fields::SLUG);
                }
                if let Some(description) = patch.description {
                    details.description = description;
                    touched.push(fields::DESCRIPTION);
                }
                if let Some(industry) = patch.industry {
                    details.industry = Some(industry);
                    touched.push(fields::INDUSTRY);
                }
                if let Some(size) = patch.size {
                    details.size = Some(size);
                    touched.push(fields::SIZE);
                }
                if let Some(website) = patch.website {
                    details.website = Some(website);
                    touched.push(fields::WEBSITE);
                }
                touched
            }
            OrganizationPatch::LogoUpload(upload) => {
                if let TaskState::Succeeded(ref image) = upload {
                    data.details.image = image.clone();
                }
                let touched = if upload.is_pending() || upload.is_succeeded() {
                    vec![fields::IMAGE]
                } else {
                    Vec::new()
                };
                data.logo_upload = upload;
                touched
            }
            OrganizationPatch::Draft { email, role } => {
                let mut touched = Vec::new();
                if let Some(email) = email {
                    data.draft.email = email;
                    touched.push(fields::MEMBER_EMAIL);
                }
                if let Some(role) = role {
                    data.draft.role = role;
                }
                touched
            }
            OrganizationPatch::MemberInvite(invite) => {
                let mut touched = Vec::new();
                if let TaskState::Succeeded(ref member) = invite {
                    if !data.has_member(&member.email) {
                        data.members.push(member.clone());
                    }
                    if data.draft.email == member.email {
                        data.draft.email.clear();
                    }
                    touched.push(fields::MEMBER_EMAIL);
                }
                data.member_invite = invite;
                touched
            }
            OrganizationPatch::RemoveMember(email) => {
                data.members.retain(|m| m.email != email);
                Vec::new()
            }
            OrganizationPatch::Created(created) => {
                data.organization = Some(created);
                vec![fields::FORM]
            }
        }
    }

    fn validate(step: OrganizationStep, data: &OrganizationData) -> FieldErrors {
        match step {
            OrganizationStep::OrganizationDetails => validate_organization_details(&data.details),
            OrganizationStep::Welcome
            | OrganizationStep::Members
            | OrganizationStep::Completion => FieldErrors::new(),
        }
    }
}

pub fn validate_organization_name(name: &str) -> Result<(), StepError> {
    require_non_blank(fields::NAME, name, "Organization name is required")
}

/// Passes iff `slug` is non-empty and matches `^[a-z0-9-]+$`.
pub fn validate_slug(slug: &str) -> Result<(), StepError> {
    require_non_blank(fields::SLUG, slug, "Slug is required")?;
    if !is_valid_slug(slug) {
        return Err(StepError::validation(
            fields::SLUG,
            "Slug can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

pub fn validate_organization_details(details: &OrganizationDetails) -> FieldErrors {
    [
        validate_organization_name(&details.name),
        validate_slug(&details.slug),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Check a proposed member email against the pattern and the existing list.
///
/// The duplicate check is an exact, case-sensitive match.
pub fn validate_member_email(email: &str, members: &[Member]) -> Result<(), StepError> {
    require_non_blank(fields::MEMBER_EMAIL, email, "Email is required")?;
    if !is_valid_email(email) {
        return Err(StepError::validation(
            fields::MEMBER_EMAIL,
            "Please enter a valid email address",
        ));
    }
    if members.iter().any(|m| m.email == email) {
        return Err(StepError::duplicate(
            fields::MEMBER_EMAIL,
            "This email has already been added",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organization::model::{MemberRole, OrganizationDetailsPatch};

    fn name_patch(name: &str) -> OrganizationPatch {
        OrganizationPatch::Details(OrganizationDetailsPatch {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    fn slug_patch(slug: &str) -> OrganizationPatch {
        OrganizationPatch::Details(OrganizationDetailsPatch {
            slug: Some(slug.into()),
            ..Default::default()
        })
    }

    #[test]
    fn slug_validation_messages() {
        assert!(validate_slug("acme-inc").is_ok());
        assert_eq!(validate_slug("").unwrap_err().to_string(), "Slug is required");
        assert_eq!(validate_slug("   ").unwrap_err().to_string(), "Slug is required");
        assert_eq!(
            validate_slug("Acme").unwrap_err().to_string(),
            "Slug can only contain lowercase letters, numbers, and hyphens"
        );
    }

    #[test]
    fn details_validation_reports_each_failing_field() {
        let errors = validate_organization_details(&OrganizationDetails::default());
        assert_eq!(errors.get("name"), Some("Organization name is required"));
        assert_eq!(errors.get("slug"), Some("Slug is required"));

        let details = OrganizationDetails {
            name: "Acme".into(),
            slug: "bad slug".into(),
            ..Default::default()
        };
        let errors = validate_organization_details(&details);
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["slug"]);
    }

    #[test]
    fn name_derives_slug_until_user_types_one() {
        let mut data = OrganizationData::default();
        OrganizationFlow::apply(&mut data, name_patch("Acme Inc."));
        assert_eq!(data.details.slug, "acme-inc");

        OrganizationFlow::apply(&mut data, name_patch("Acme Corp"));
        assert_eq!(data.details.slug, "acme-corp");

        OrganizationFlow::apply(&mut data, slug_patch("Custom Slug"));
        assert_eq!(data.details.slug, "custom-slug");

        OrganizationFlow::apply(&mut data, name_patch("Globex"));
        assert_eq!(data.details.slug, "custom-slug", "explicit slug wins");
        assert_eq!(data.details.name, "Globex");

        OrganizationFlow::apply(&mut data, slug_patch(""));
        OrganizationFlow::apply(&mut data, name_patch("Initech"));
        assert_eq!(data.details.slug, "initech", "clearing the slug resumes derivation");
    }

    #[test]
    fn details_patch_keeps_unmentioned_fields() {
        let mut data = OrganizationData::default();
        OrganizationFlow::apply(&mut data, name_patch("Acme"));
        let touched = OrganizationFlow::apply(
            &mut data,
            OrganizationPatch::Details(OrganizationDetailsPatch {
                industry: Some("retail".into()),
                ..Default::default()
            }),
        );
        assert_eq!(touched, ["industry"]);
        assert_eq!(data.details.name, "Acme");
        assert_eq!(data.details.industry.as_deref(), Some("retail"));
    }

    #[test]
    fn member_email_rules() {
        let members = vec![Member::new("alice@x.com", MemberRole::Admin)];
        assert_eq!(
            validate_member_email("  ", &members).unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            validate_member_email("bob", &members).unwrap_err().to_string(),
            "Please enter a valid email address"
        );
        let dup = validate_member_email("alice@x.com", &members).unwrap_err();
        assert_eq!(dup.code(), "DUPLICATE_ENTRY");
        assert_eq!(dup.to_string(), "This email has already been added");
        assert!(validate_member_email("Alice@x.com", &members).is_ok(), "case-sensitive");
        assert!(validate_member_email("bob@x.com", &members).is_ok());
    }

    #[test]
    fn successful_invite_appends_and_clears_draft() {
        let mut data = OrganizationData::default();
        OrganizationFlow::apply(
            &mut data,
            OrganizationPatch::Draft {
                email: Some("alice@x.com".into()),
                role: Some(MemberRole::Admin),
            },
        );
        let member = Member::new("alice@x.com", MemberRole::Admin);
        let invited = OrganizationPatch::MemberInvite(TaskState::Succeeded(member.clone()));
        OrganizationFlow::apply(&mut data, invited);
        let invited = OrganizationPatch::MemberInvite(TaskState::Succeeded(member));
        OrganizationFlow::apply(&mut data, invited);

        assert_eq!(data.members.len(), 1, "duplicate resolution is not appended twice");
        assert!(data.draft.email.is_empty());
        assert_eq!(data.draft.role, MemberRole::Admin);
    }

    #[test]
    fn failed_invite_keeps_draft() {
        let mut data = OrganizationData::default();
        OrganizationFlow::apply(
            &mut data,
            OrganizationPatch::Draft {
                email: Some("alice@x.com".into()),
                role: None,
            },
        );
        OrganizationFlow::apply(
            &mut data,
            OrganizationPatch::MemberInvite(TaskState::Failed("rejected".into())),
        );
        assert!(data.members.is_empty());
        assert_eq!(data.draft.email, "alice@x.com");
        assert_eq!(data.member_invite.failure(), Some("rejected"));
    }

    #[test]
    fn remove_member() {
        let mut data = OrganizationData::default();
        data.members.push(Member::new("alice@x.com", MemberRole::Admin));
        data.members.push(Member::new("bob@x.com", MemberRole::Employee));
        OrganizationFlow::apply(&mut data, OrganizationPatch::RemoveMember("alice@x.com".into()));
        assert_eq!(data.members.len(), 1);
        assert_eq!(data.members[0].email, "bob@x.com");
    }

    #[test]
    fn logo_upload_writes_image() {
        let mut data = OrganizationData::default();
        let touched =
            OrganizationFlow::apply(&mut data, OrganizationPatch::LogoUpload(TaskState::Pending));
        assert_eq!(touched, ["image"]);
        assert!(data.logo_upload.is_pending());

        let uploaded = TaskState::Succeeded("data:image/png;base64,AA==".to_string());
        OrganizationFlow::apply(&mut data, OrganizationPatch::LogoUpload(uploaded));
        assert_eq!(data.details.image, "data:image/png;base64,AA==");
    }

    #[test]
    fn only_details_step_is_gated() {
        let data = OrganizationData::default();
        assert!(OrganizationFlow::validate(OrganizationStep::Welcome, &data).is_empty());
        assert!(OrganizationFlow::validate(OrganizationStep::Members, &data).is_empty());
        assert_eq!(
            OrganizationFlow::validate(OrganizationStep::OrganizationDetails, &data).len(),
            2
        );
    }
}
