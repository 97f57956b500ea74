use std::sync::Arc;

use onboarding_wizard::config::OnboardingConfig;
use onboarding_wizard::employee::{EmployeeDetailsPatch, EmployeeWizard, SocialPlatform};
use onboarding_wizard::organization::{MemberRole, OrganizationDetailsPatch, OrganizationWizard};
use onboarding_wizard::services::{
    DataUrlEncoder, IdentityService, ImageFile, InMemoryIdentityService,
};
use onboarding_wizard::wizard::{StepView, WizardStep};

/// Smallest valid PNG header, enough for the encoder.
const LOGO_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn print_view<S: WizardStep>(view: &StepView<S>) {
    eprintln!(
        "   [{}/{}] {} ({}%)",
        view.index, view.total_steps, view.label, view.progress_percent
    );
    for (field, message) in view.errors.iter() {
        eprintln!("      ! {field}: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OnboardingConfig::try_from_env()?;

    eprintln!("Onboarding wizard demo v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Upload latency: {:?}", config.upload_latency);
    eprintln!("   Service latency: {:?}\n", config.service_latency);

    let service = Arc::new(InMemoryIdentityService::new().with_latency(config.service_latency));
    let identity: Arc<dyn IdentityService> = service.clone();
    let encoder = Arc::new(DataUrlEncoder);

    // ── Organization wizard ──────────────────────────────────────────────
    eprintln!("Organization wizard");
    let mut org = OrganizationWizard::new(identity.clone(), encoder.clone(), config.clone());
    eprintln!("   {}", org.greeting().await);
    org.next().await;
    print_view(&org.view().await);

    org.set_name("Acme Inc.").await;
    org.update_details(OrganizationDetailsPatch {
        description: Some("We make everything".into()),
        industry: Some("manufacturing".into()),
        size: Some("11-50".into()),
        ..Default::default()
    })
    .await;
    org.upload_logo(ImageFile::new("logo.png", "image/png", LOGO_BYTES.to_vec()))
        .await;
    org.join_pending().await;
    eprintln!("   Slug: {}", org.state().await.data.details.slug);

    org.next().await;
    print_view(&org.view().await);

    org.add_member("alice@x.com", MemberRole::Admin).await?;
    org.join_pending().await;
    if let Err(e) = org.add_member("alice@x.com", MemberRole::Employee).await {
        eprintln!("   Second invite rejected: {e}");
    }
    print_view(&org.view().await);

    org.next().await;
    print_view(&org.view().await);
    eprintln!("\n{}\n", org.summary().await.render());
    eprintln!("   Continue to {}\n", org.exit_target());

    // ── Employee wizard ──────────────────────────────────────────────────
    eprintln!("Employee wizard");
    let mut employee = EmployeeWizard::new(identity, encoder, config);

    employee.verify_invitation("INVALID").await?;
    employee.join_pending().await;
    print_view(&employee.view().await);

    let invite_id = service
        .sent_invites()
        .await
        .into_iter()
        .next()
        .map(|invite| invite.invite_id)
        .ok_or("no invitation was sent")?;
    employee.verify_invitation(&invite_id).await?;
    employee.join_pending().await;
    employee.next().await;
    print_view(&employee.view().await);

    employee
        .update_details(EmployeeDetailsPatch {
            first_name: Some("Alice".into()),
            last_name: Some("Liddell".into()),
            job_title: Some("Operations Lead".into()),
            department: Some("operations".into()),
            ..Default::default()
        })
        .await;
    employee.next().await;
    print_view(&employee.view().await);

    employee.add_skill("Logistics").await;
    employee.add_skill("Planning").await;
    employee
        .update_social_link(SocialPlatform::Linkedin, "https://linkedin.com/in/alice")
        .await;
    employee.next().await;
    print_view(&employee.view().await);
    eprintln!("\n{}\n", employee.summary().await.render());
    eprintln!("   Continue to {}", employee.exit_target());

    Ok(())
}
