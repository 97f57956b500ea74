//! Employee wizard: invitation check, personal details, profile, completion.

pub mod flow;
pub mod model;
pub mod wizard;

pub use flow::EmployeeFlow;
pub use model::{
    EmployeeData, EmployeeDetails, EmployeeDetailsPatch, EmployeePatch, EmployeeStep,
    EmployeeSummary, Invitation, SocialPlatform,
};
pub use wizard::EmployeeWizard;
