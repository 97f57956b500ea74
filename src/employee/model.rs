//! Employee wizard data models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::wizard::{TaskState, WizardStep};

/// Steps of the employee wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStep {
    /// Enter an invitation code; once verified, review and accept it.
    InvitationCheck,
    PersonalDetails,
    ProfileSetup,
    Completion,
}

impl WizardStep for EmployeeStep {
    const ALL: &'static [Self] = &[
        Self::InvitationCheck,
        Self::PersonalDetails,
        Self::ProfileSetup,
        Self::Completion,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::InvitationCheck => "Invitation",
            Self::PersonalDetails => "Personal Details",
            Self::ProfileSetup => "Profile",
            Self::Completion => "Complete",
        }
    }
}

impl std::fmt::Display for EmployeeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvitationCheck => "invitation_check",
            Self::PersonalDetails => "personal_details",
            Self::ProfileSetup => "profile_setup",
            Self::Completion => "completion",
        };
        write!(f, "{s}")
    }
}

/// A verified invitation. Read-only once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub invite_id: String,
    pub email: String,
    pub organization_name: String,
    pub role: String,
}

/// Platforms a profile can link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Linkedin,
    Twitter,
    Github,
}

impl std::fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linkedin => write!(f, "linkedin"),
            Self::Twitter => write!(f, "twitter"),
            Self::Github => write!(f, "github"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    pub first_name: String,
    pub last_name: String,
    /// Taken from the invitation; there is no patch that edits it.
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub department: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub bio: String,
    /// Insertion-ordered, no duplicates.
    pub skills: Vec<String>,
    pub social_links: BTreeMap<SocialPlatform, String>,
}

impl EmployeeDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Partial update for the editable [`EmployeeDetails`] fields.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDetailsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub bio: Option<String>,
}

/// Everything the employee wizard collects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeData {
    pub invitation_code: String,
    pub invitation: TaskState<Invitation>,
    /// Id of the invitation the identity service accepted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_invite_id: Option<String>,
    pub details: EmployeeDetails,
    pub photo_upload: TaskState<String>,
    pub is_complete: bool,
}

impl EmployeeData {
    pub fn verified_invitation(&self) -> Option<&Invitation> {
        self.invitation.value()
    }

    /// Whether the currently verified invitation has been accepted.
    pub fn is_accepted(&self) -> bool {
        match (self.verified_invitation(), self.accepted_invite_id.as_deref()) {
            (Some(invitation), Some(accepted)) => invitation.invite_id == accepted,
            _ => false,
        }
    }
}

/// Partial updates accepted by the employee wizard's store.
#[derive(Debug, Clone)]
pub enum EmployeePatch {
    InvitationCode(String),
    Invitation(TaskState<Invitation>),
    Accepted(String),
    Details(EmployeeDetailsPatch),
    PhotoUpload(TaskState<String>),
    AddSkill(String),
    RemoveSkill(String),
    SocialLink { platform: SocialPlatform, url: String },
    Complete(bool),
}

/// Field keys used in the employee wizard's error map.
pub mod fields {
    pub const INVITATION_CODE: &str = "invitation_code";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const PHONE: &str = "phone";
    pub const JOB_TITLE: &str = "job_title";
    pub const DEPARTMENT: &str = "department";
    pub const START_DATE: &str = "start_date";
    pub const BIO: &str = "bio";
    pub const PROFILE_IMAGE: &str = "profile_image";
    pub const SKILLS: &str = "skills";
    pub const SOCIAL_LINKS: &str = "social_links";
    /// Errors not tied to a single input.
    pub const FORM: &str = "form";
}

/// Readable department name for the option values offered on the form.
pub fn department_name(department: &str) -> &str {
    match department {
        "engineering" => "Engineering",
        "product" => "Product",
        "design" => "Design",
        "marketing" => "Marketing",
        "sales" => "Sales",
        "customer_support" => "Customer Support",
        "hr" => "Human Resources",
        "finance" => "Finance",
        "operations" => "Operations",
        "other" => "Other",
        other => other,
    }
}

/// Data shown on the completion step.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSummary {
    pub full_name: String,
    pub email: String,
    pub organization_name: String,
    pub role: String,
    pub job_title: String,
    pub department: String,
    pub skills: Vec<String>,
    pub is_complete: bool,
}

impl EmployeeSummary {
    pub fn from_data(data: &EmployeeData) -> Self {
        let invitation = data.verified_invitation();
        Self {
            full_name: data.details.full_name(),
            email: data.details.email.clone(),
            organization_name: invitation
                .map(|i| i.organization_name.clone())
                .unwrap_or_default(),
            role: invitation.map(|i| i.role.clone()).unwrap_or_default(),
            job_title: data.details.job_title.clone(),
            department: department_name(&data.details.department).to_string(),
            skills: data.details.skills.clone(),
            is_complete: data.is_complete,
        }
    }

    /// Plain-text rendering for terminals and logs.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Welcome Aboard!".to_string(),
            format!(
                "Your profile has been set up successfully. You're now ready to join {}.",
                self.organization_name
            ),
            format!("- **Name:** {}", self.full_name),
            format!("- **Email:** {}", self.email),
            format!("- **Role:** {}", self.role),
            format!("- **Job title:** {}", self.job_title),
            format!("- **Department:** {}", self.department),
        ];
        if !self.skills.is_empty() {
            lines.push(format!("- **Skills:** {}", self.skills.join(", ")));
        }
        lines.join("\n")
    }
}
