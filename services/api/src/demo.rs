use crate::infra::{parse_status_mode, InMemorySessionRepository};
use chrono::Local;
use clap::Args;
use efv_eligibility::config::{AppConfig, LatencyProfile, StatusMode};
use efv_eligibility::error::AppError;
use efv_eligibility::workflows::applicant::{
    ApplicationType, ConsentForm, DisabilityInfoForm, EligibilityWizardService, ResultsView,
    Route, VerificationPhase,
};
use efv_eligibility::workflows::caseworker::{
    ApplicationsQueue, CaseWorkerDashboard, DashboardTab, FactorDetail,
};
use std::sync::Arc;
use std::time::Duration;

const PROGRESS_REFRESH: Duration = Duration::from_millis(50);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Simulate network delays instead of answering instantly.
    #[arg(long)]
    pub(crate) realistic_latency: bool,
    /// CRA status progression: `random` or `monotonic`.
    #[arg(long, value_parser = parse_status_mode)]
    pub(crate) status_mode: Option<StatusMode>,
    /// Seed for the random status progression.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Expand a verification factor by id (repeatable).
    #[arg(long)]
    pub(crate) expand: Vec<String>,
    /// Show the audit log instead of the verification factors.
    #[arg(long)]
    pub(crate) audit: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        realistic_latency,
        status_mode,
        seed,
    } = args;

    let mut mocks = AppConfig::load()?.mocks;
    mocks.latency = if realistic_latency {
        LatencyProfile::Realistic
    } else {
        LatencyProfile::Instant
    };
    if let Some(mode) = status_mode {
        mocks.status_mode = mode;
    }
    if seed.is_some() {
        mocks.status_seed = seed;
    }

    let service = EligibilityWizardService::from_config(
        Arc::new(InMemorySessionRepository::default()),
        &mocks,
    );

    println!(
        "EFV eligibility demo ({})",
        Local::now().format("%B %d, %Y %H:%M")
    );
    println!(
        "Mock latency: {:?} | status progression: {:?}",
        mocks.latency, mocks.status_mode
    );

    let session = service.open_session()?;
    let id = session.session_id;
    println!("\nSession {id} opened on {}", Route::Landing);

    service.start_application(&id)?;
    let login = service.login(&id).await?;
    println!(
        "Signed in with BC Services Card as {} {} -> {}",
        login.profile.first_name, login.profile.last_name, login.next
    );

    let personal = service.personal_info_form(&id)?;
    let full_name = format!("{} {}", personal.first_name, personal.last_name);
    let next = service.submit_personal_info(&id, &personal)?;
    println!("Personal information accepted -> {next}");

    let next = service.submit_disability_info(&id, &demo_disability_form())?;
    println!("Disability information accepted -> {next}");

    let consent = ConsentForm {
        agreed: true,
        full_name,
        ip_address: None,
    };
    let next = service.give_consent(&id, &consent).await?;
    println!("CRA consent recorded -> {next}");

    let tracking = service.start_verification(&id).await?;
    println!(
        "\nApplication {} submitted (check {}, pack {})",
        tracking.application_id.0, tracking.check_id.0, tracking.pack_id
    );

    let mut last_polls = None;
    let view = loop {
        let view = service.verification_progress(&id)?;
        if last_polls != Some(view.progress.polls) {
            println!(
                "  [{:>3}%] {} (poll {})",
                view.progress.progress, view.progress.message, view.progress.polls
            );
            last_polls = Some(view.progress.polls);
        }
        if !view.progress.phase.is_active() {
            break view;
        }
        tokio::time::sleep(PROGRESS_REFRESH).await;
    };

    if view.progress.phase != VerificationPhase::Complete {
        println!(
            "\nVerification did not complete: {}",
            view.progress.error.as_deref().unwrap_or("unknown error")
        );
        if let Some(route) = view.retry_route {
            println!("Retry from {route}");
        }
        return Ok(());
    }

    match service.results(&id)? {
        ResultsView::Verified(results) => {
            println!("\nVerification results (tax year {})", results.tax_year);
            println!("- Total income: {}", results.total_income);
            println!("- Employment income: {}", results.employment_income);
            println!("- Income eligible: {}", results.income_eligibility);
            println!("- Threshold met: {}", results.threshold_met);
            for factor in &results.additional_factors {
                println!("  * {factor}");
            }
        }
        ResultsView::NoVerificationData { title, message, .. } => {
            println!("\n{title}: {message}");
            return Ok(());
        }
    }

    let review = service.review(&id)?;
    println!("\nReview");
    println!("- Applicant: {} ({})", review.personal.name, review.personal.email);
    println!("- Address: {}", review.personal.address);
    println!(
        "- Verified income: {} ({})",
        review.income.total_income_display, review.income.eligibility_status
    );
    println!("- CRA data access: {}", review.consent.cra_data_access);

    service.submit_review(&id)?;
    let confirmation = service.confirmation(&id)?;
    println!("\nApplication submitted");
    println!("- Application ID: {}", confirmation.application_id);
    println!("- Verification check: {}", confirmation.check_id);
    println!(
        "- Submitted {} at {}",
        confirmation.submission_date, confirmation.submission_time
    );
    println!("- Confirmation sent to {}", confirmation.email);

    service.close_session(&id)?;
    Ok(())
}

fn demo_disability_form() -> DisabilityInfoForm {
    DisabilityInfoForm {
        application_type: Some(ApplicationType::Disability),
        disability_description: "Living with chronic anxiety and depression that affects daily functioning and ability to maintain consistent employment.".to_string(),
        diagnosis_date: "2019-06-01".to_string(),
        limitations: "Difficulty maintaining a regular work schedule".to_string(),
        has_physical_disability: false,
        has_mental_health_condition: true,
        requires_assistance: Some(true),
        has_physician: Some(true),
        physician_name: "Dr. Sarah Chen".to_string(),
        physician_phone: "250-555-0199".to_string(),
    }
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let mut dashboard = CaseWorkerDashboard::new();
    for id in &args.expand {
        if !dashboard.toggle_expanded(id) {
            eprintln!("warning: unknown verification factor '{id}'");
        }
    }
    if args.audit {
        dashboard.select_tab(DashboardTab::Audit);
    }

    let view = dashboard.view();
    let applicant = &view.applicant;
    println!("Case worker dashboard: {}", applicant.full_name);
    println!(
        "DOB {} | {} | {} | {}",
        applicant.date_of_birth,
        applicant.location,
        applicant.program_context,
        applicant.identity_confidence
    );
    let summary = view.summary;
    println!(
        "{}% complete | {} verified | {} failed | {} pending | {} manual review",
        summary.completion_progress,
        summary.verified,
        summary.failed,
        summary.pending,
        summary.manual_review
    );

    match view.active_tab {
        DashboardTab::Verification => {
            println!("\nVerification factors");
            for card in &view.factors {
                println!(
                    "- {} [{}] {} ({:?} authority)",
                    card.factor.title,
                    card.status_label,
                    card.factor.data_source,
                    card.factor.authority_level
                );
                println!("    {}", card.expand_label);
                if let Some(detail) = &card.detail {
                    render_factor_detail(detail);
                }
            }
        }
        DashboardTab::Audit => {
            println!("\nAudit log");
            for entry in &view.audit_log {
                println!(
                    "- {} | {} | {}",
                    entry.timestamp, entry.action, entry.factor
                );
                println!("    {}", entry.details);
            }
        }
    }

    let queue = ApplicationsQueue::new();
    let stats = queue.stats();
    println!(
        "\nApplications queue: {} total | {} in review | {} requires action | {} pending",
        stats.total, stats.in_review, stats.requires_action, stats.pending
    );
    for application in queue.applications() {
        println!(
            "- {} {} ({}) {:?} {}% [{}/{} factors]",
            application.id,
            application.applicant_name,
            application.program,
            application.status,
            application.completion_progress,
            application.verified_factors,
            application.total_factors
        );
    }

    Ok(())
}

fn render_factor_detail(detail: &FactorDetail) {
    match detail {
        FactorDetail::Residency {
            summary,
            sources,
            note,
        } => {
            println!("    {summary}");
            for source in sources {
                let marker = if source.matches { "match" } else { "mismatch" };
                println!(
                    "      {} | {} | updated {} | {marker}",
                    source.source, source.address, source.last_updated
                );
            }
            println!("    Note: {note}");
        }
        FactorDetail::Identity {
            checks,
            limitations,
        } => {
            for check in checks {
                println!(
                    "      {} [{}] ({})",
                    check.title,
                    check.status.label(),
                    check.source
                );
            }
            println!("    Limitations: {}", limitations.join("; "));
        }
        FactorDetail::Placeholder { message } => println!("    {message}"),
    }
}
