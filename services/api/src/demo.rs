use crate::infra::{demo_state, DemoPortal, TracingMailSender};
use chrono::Utc;
use clap::Args;
use portal_core::config::PortalSettings;
use portal_core::consents::ConsentStatus;
use portal_core::error::{AppError, PortalError};
use portal_core::processes::{ProcessStep, ProcessStepStatus, ProcessStepType};
use portal_core::registration::domain::{
    AgreementConsentData, CompanyRole, DeclineOspData, PartnerSubmitData,
};
use portal_core::registration::{NetworkService, StandardChecklist};
use portal_core::store::{InMemoryPortalStore, PortalState};
use portal_core::subscriptions::{OfferSubscriptionService, SubscriptionConfigurationService};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reason passed along when the onboarding service provider declines the partner.
    #[arg(long)]
    pub(crate) decline_message: Option<String>,
    /// Skip the offer subscription portion of the demo.
    #[arg(long)]
    pub(crate) skip_subscription: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let demo = demo_state();
    let store = Arc::new(InMemoryPortalStore::new(demo.state.clone()));

    println!("Business partner portal demo");
    run_registration(&demo, &store, args.decline_message)?;

    if !args.skip_subscription {
        run_subscription(&demo, &store)?;
    }
    Ok(())
}

fn run_registration(
    demo: &DemoPortal,
    store: &Arc<InMemoryPortalStore>,
    decline_message: Option<String>,
) -> Result<(), AppError> {
    let network = NetworkService::new(store.clone(), Arc::new(StandardChecklist));

    println!("\nPartner registration");
    network.submit(
        &demo.submitting_partner,
        PartnerSubmitData {
            company_roles: vec![CompanyRole::ActiveParticipant],
            agreements: demo
                .participant_agreements
                .iter()
                .map(|agreement_id| AgreementConsentData {
                    agreement_id: *agreement_id,
                    consent_status: ConsentStatus::Active,
                })
                .collect(),
        },
    )?;

    let state = snapshot(store)?;
    let company = &state.companies[&demo.submitting_partner.company_id];
    println!("  {} submitted its application", company.name);
    for (application_id, entries) in &state.checklists {
        println!("  Checklist for application {application_id}:");
        for entry in entries {
            println!("    {:?}: {:?}", entry.entry_type, entry.status);
        }
    }
    if let Some(process_id) = company.registration_process_id {
        render_steps("  Registration process", &state.steps_of(process_id));
    }

    network.decline_osp(
        &demo.declined_partner,
        demo.declined_application,
        DeclineOspData {
            message: decline_message,
        },
    )?;

    let state = snapshot(store)?;
    let company = &state.companies[&demo.declined_partner.company_id];
    println!(
        "  {} was declined, company status is now {:?}",
        company.name, company.status
    );
    if let Some(process_id) = company.registration_process_id {
        render_steps("  Registration process", &state.steps_of(process_id));
    }
    Ok(())
}

fn run_subscription(demo: &DemoPortal, store: &Arc<InMemoryPortalStore>) -> Result<(), AppError> {
    let marketplace = OfferSubscriptionService::new(store.clone(), Arc::new(TracingMailSender));
    let configuration =
        SubscriptionConfigurationService::new(store.clone(), PortalSettings::default());

    println!("\nOffer subscription");
    let created = marketplace.subscribe(&demo.customer, demo.offer_id)?;
    println!(
        "  Subscription {} created with process {}",
        created.subscription_id, created.process_id
    );

    // the provider endpoint was unreachable; an operator queues a retrigger
    let process_id = created.process_id;
    store
        .seed(move |state| {
            let now = Utc::now();
            for step in state.process_steps.iter_mut().filter(|step| {
                step.process_id == process_id && step.step_type == ProcessStepType::TriggerProvider
            }) {
                step.status = ProcessStepStatus::Failed;
                step.message = Some("provider endpoint unreachable".to_string());
                step.date_last_changed = Some(now);
            }
            state.process_steps.push(ProcessStep::new(
                ProcessStepType::RetriggerProvider,
                ProcessStepStatus::Todo,
                process_id,
                now,
            ));
        })
        .map_err(PortalError::from)?;

    configuration.retrigger_provider(created.subscription_id)?;
    println!("  Provider trigger retriggered");
    for step in configuration.process_steps_for_subscription(created.subscription_id)? {
        let message = step.message.as_deref().unwrap_or("-");
        println!("    {} {} ({message})", step.step_type, step.status);
    }

    marketplace.activate(&demo.provider, created.subscription_id)?;
    let state = snapshot(store)?;
    println!(
        "  Subscription status: {}",
        state.subscriptions[&created.subscription_id].status
    );
    Ok(())
}

fn snapshot(store: &InMemoryPortalStore) -> Result<PortalState, AppError> {
    store
        .snapshot()
        .map_err(|err| AppError::from(PortalError::from(err)))
}

fn render_steps(title: &str, steps: &[ProcessStep]) {
    println!("{title}:");
    for step in steps {
        println!("    {} {}", step.step_type, step.status);
    }
}
