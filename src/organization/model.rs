//! Organization wizard data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wizard::{TaskState, WizardStep};

/// Steps of the organization wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStep {
    Welcome,
    OrganizationDetails,
    Members,
    Completion,
}

impl WizardStep for OrganizationStep {
    const ALL: &'static [Self] = &[
        Self::Welcome,
        Self::OrganizationDetails,
        Self::Members,
        Self::Completion,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::OrganizationDetails => "Organization",
            Self::Members => "Members",
            Self::Completion => "Complete",
        }
    }
}

impl std::fmt::Display for OrganizationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::OrganizationDetails => "organization_details",
            Self::Members => "members",
            Self::Completion => "completion",
        };
        write!(f, "{s}")
    }
}

/// Role a member is invited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    #[default]
    Employee,
}

impl MemberRole {
    /// Human-readable role name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Employee => "Employee",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Employee => write!(f, "employee"),
        }
    }
}

/// An invited member. Unique by email within the wizard's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
    pub role: MemberRole,
    pub invited_at: DateTime<Utc>,
}

impl Member {
    pub fn new(email: impl Into<String>, role: MemberRole) -> Self {
        Self {
            email: email.into(),
            role,
            invited_at: Utc::now(),
        }
    }
}

/// Organization details collected on the details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Displayable encoded logo; empty until an upload succeeds.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Set once the user typed a slug; stops slug derivation from the name.
    #[serde(default)]
    pub slug_is_custom: bool,
}

/// Partial update for [`OrganizationDetails`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct OrganizationDetailsPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub website: Option<String>,
}

/// The not-yet-submitted invite on the members step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub email: String,
    pub role: MemberRole,
}

/// Organization created through the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrganization {
    pub id: String,
    pub slug: String,
}

/// Everything the organization wizard collects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationData {
    /// Greeted on the welcome step.
    pub user_name: String,
    pub details: OrganizationDetails,
    pub members: Vec<Member>,
    pub draft: MemberDraft,
    pub logo_upload: TaskState<String>,
    pub member_invite: TaskState<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<CreatedOrganization>,
}

impl OrganizationData {
    pub fn has_member(&self, email: &str) -> bool {
        self.members.iter().any(|m| m.email == email)
    }
}

/// Partial updates accepted by the organization wizard's store.
#[derive(Debug, Clone)]
pub enum OrganizationPatch {
    UserName(String),
    Details(OrganizationDetailsPatch),
    LogoUpload(TaskState<String>),
    Draft {
        email: Option<String>,
        role: Option<MemberRole>,
    },
    MemberInvite(TaskState<Member>),
    RemoveMember(String),
    Created(CreatedOrganization),
}

/// Field keys used in the organization wizard's error map.
pub mod fields {
    pub const NAME: &str = "name";
    pub const SLUG: &str = "slug";
    pub const DESCRIPTION: &str = "description";
    pub const INDUSTRY: &str = "industry";
    pub const SIZE: &str = "size";
    pub const WEBSITE: &str = "website";
    pub const IMAGE: &str = "image";
    pub const MEMBER_EMAIL: &str = "member_email";
    /// Errors not tied to a single input.
    pub const FORM: &str = "form";
}

/// Industries offered on the details step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Technology,
    Healthcare,
    Education,
    Finance,
    Retail,
    Manufacturing,
    Other,
}

impl Industry {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "technology" => Some(Self::Technology),
            "healthcare" => Some(Self::Healthcare),
            "education" => Some(Self::Education),
            "finance" => Some(Self::Finance),
            "retail" => Some(Self::Retail),
            "manufacturing" => Some(Self::Manufacturing),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Finance => "Finance",
            Self::Retail => "Retail",
            Self::Manufacturing => "Manufacturing",
            Self::Other => "Other",
        }
    }
}

pub const NOT_SPECIFIED: &str = "Not specified";

/// Readable industry name, `"Not specified"` for empty or unknown values.
pub fn industry_name(industry: Option<&str>) -> &'static str {
    industry
        .and_then(Industry::parse)
        .map(|i| i.name())
        .unwrap_or(NOT_SPECIFIED)
}

/// Data shown on the completion step.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub industry: &'static str,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub members: Vec<Member>,
}

impl OrganizationSummary {
    pub fn from_data(data: &OrganizationData) -> Self {
        let details = &data.details;
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            name: details.name.clone(),
            slug: details.slug.clone(),
            description: non_empty(&details.description),
            logo: non_empty(&details.image),
            industry: industry_name(details.industry.as_deref()),
            size: details
                .size
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            website: details.website.as_deref().and_then(non_empty),
            members: data.members.clone(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Plain-text rendering for terminals and logs.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("# {}", self.name),
            format!("- **Slug:** {}", self.slug),
        ];
        if let Some(ref description) = self.description {
            lines.push(format!("- **Description:** {description}"));
        }
        lines.push(format!("- **Industry:** {}", self.industry));
        lines.push(format!("- **Organization Size:** {}", self.size));
        if let Some(ref website) = self.website {
            lines.push(format!("- **Website:** {website}"));
        }
        if self.members.is_empty() {
            lines.push("- **Team Members:** No members added".to_string());
        } else {
            lines.push(format!("- **Team Members:** {}", self.members.len()));
            for member in &self.members {
                lines.push(format!("  - {} ({})", member.email, member.role.label()));
            }
        }
        lines.join("\n")
    }
}
