//! Employee wizard rules: how patches merge and how each step validates.

use crate::error::StepError;
use crate::wizard::validation::require_non_blank;
use crate::wizard::{FieldErrors, TaskState, WizardFlow};

use super::model::{EmployeeData, EmployeeDetails, EmployeePatch, EmployeeStep, fields};

/// Marker type tying the employee wizard's types to the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeFlow;

impl WizardFlow for EmployeeFlow {
    type Step = EmployeeStep;
    type Data = EmployeeData;
    type Patch = EmployeePatch;

    fn apply(data: &mut EmployeeData, patch: EmployeePatch) -> Vec<&'static str> {
        match patch {
            EmployeePatch::InvitationCode(code) => {
                data.invitation_code = code;
                vec![fields::INVITATION_CODE]
            }
            EmployeePatch::Invitation(invitation) => {
                let touched = match invitation {
                    TaskState::Succeeded(ref verified) => {
                        data.details.email = verified.email.clone();
                        vec![fields::INVITATION_CODE]
                    }
                    TaskState::Pending => vec![fields::INVITATION_CODE],
                    TaskState::Idle | TaskState::Failed(_) => Vec::new(),
                };
                data.invitation = invitation;
                touched
            }
            EmployeePatch::Accepted(invite_id) => {
                data.accepted_invite_id = Some(invite_id);
                vec![fields::FORM]
            }
            EmployeePatch::Details(patch) => {
                let details = &mut data.details;
                let mut touched = Vec::new();
                let mut set = |target: &mut String, value: Option<String>, field: &'static str| {
                    if let Some(value) = value {
                        *target = value;
                        touched.push(field);
                    }
                };
                set(&mut details.first_name, patch.first_name, fields::FIRST_NAME);
                set(&mut details.last_name, patch.last_name, fields::LAST_NAME);
                set(&mut details.phone, patch.phone, fields::PHONE);
                set(&mut details.job_title, patch.job_title, fields::JOB_TITLE);
                set(&mut details.department, patch.department, fields::DEPARTMENT);
                set(&mut details.start_date, patch.start_date, fields::START_DATE);
                set(&mut details.bio, patch.bio, fields::BIO);
                touched
            }
            EmployeePatch::PhotoUpload(upload) => {
                if let TaskState::Succeeded(ref image) = upload {
                    data.details.profile_image = Some(image.clone());
                }
                let touched = if upload.is_pending() || upload.is_succeeded() {
                    vec![fields::PROFILE_IMAGE]
                } else {
                    Vec::new()
                };
                data.photo_upload = upload;
                touched
            }
            EmployeePatch::AddSkill(skill) => {
                if add_skill(&mut data.details.skills, &skill) {
                    vec![fields::SKILLS]
                } else {
                    Vec::new()
                }
            }
            EmployeePatch::RemoveSkill(skill) => {
                data.details.skills.retain(|s| *s != skill);
                Vec::new()
            }
            EmployeePatch::SocialLink { platform, url } => {
                let url = url.trim();
                if url.is_empty() {
                    data.details.social_links.remove(&platform);
                } else {
                    data.details.social_links.insert(platform, url.to_string());
                }
                vec![fields::SOCIAL_LINKS]
            }
            EmployeePatch::Complete(done) => {
                data.is_complete = done;
                Vec::new()
            }
        }
    }

    fn validate(step: EmployeeStep, data: &EmployeeData) -> FieldErrors {
        match step {
            EmployeeStep::InvitationCheck => validate_invitation_verified(data),
            EmployeeStep::PersonalDetails => validate_personal_details(&data.details),
            EmployeeStep::ProfileSetup | EmployeeStep::Completion => FieldErrors::new(),
        }
    }
}

/// Code entered on the invitation step must not be blank.
pub fn validate_invitation_code(code: &str) -> Result<(), StepError> {
    require_non_blank(fields::INVITATION_CODE, code, "Please enter your invitation code")
}

fn validate_invitation_verified(data: &EmployeeData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if data.verified_invitation().is_none() {
        let message = data
            .invitation
            .failure()
            .unwrap_or("Please verify your invitation to continue");
        errors.insert(fields::INVITATION_CODE, message);
    }
    errors
}

pub fn validate_personal_details(details: &EmployeeDetails) -> FieldErrors {
    [
        require_non_blank(fields::FIRST_NAME, &details.first_name, "First name is required"),
        require_non_blank(fields::LAST_NAME, &details.last_name, "Last name is required"),
        require_non_blank(fields::JOB_TITLE, &details.job_title, "Job title is required"),
        require_non_blank(fields::DEPARTMENT, &details.department, "Department is required"),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Append `skill` (trimmed) unless it is blank or already present.
///
/// Returns whether the set changed.
pub fn add_skill(skills: &mut Vec<String>, skill: &str) -> bool {
    let skill = skill.trim();
    if skill.is_empty() || skills.iter().any(|s| s == skill) {
        return false;
    }
    skills.push(skill.to_string());
    true
}
