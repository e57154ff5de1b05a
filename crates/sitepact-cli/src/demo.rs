//! # Scripted Walkthroughs
//!
//! Drives an in-memory engine through the two canonical lifecycles — a
//! natural settlement and a disputed one — printing each step and,
//! optionally, the resulting event stream as JSON.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};

use sitepact_arbitration::DisputeRegistry;
use sitepact_core::{Amount, PartyId, TradeCategory};
use sitepact_custody::{CustodyVault, InMemoryVault};
use sitepact_ledger::{DisputeFavor, MilestoneSpec, ServiceLedger};

/// Arguments for the `demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Which lifecycle to walk through.
    #[arg(value_enum)]
    pub scenario: Scenario,

    /// Print the full event stream as JSON when the walkthrough ends.
    #[arg(long)]
    pub json: bool,
}

/// The available walkthroughs.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Scenario {
    /// Create, accept, complete and approve every milestone.
    Settlement,
    /// Partially settle, freeze on a dispute, and mediate.
    Dispute,
}

fn demo_party(tail: char) -> anyhow::Result<PartyId> {
    PartyId::new(format!("0x{}", tail.to_string().repeat(40)))
        .with_context(|| format!("building demo identity {tail}"))
}

/// Run the selected walkthrough.
pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    tracing::debug!(scenario = ?args.scenario, "starting walkthrough");
    let vault = Arc::new(InMemoryVault::new());
    let ledger = Arc::new(ServiceLedger::new(
        Arc::clone(&vault) as Arc<dyn CustodyVault>
    ));
    let registry = DisputeRegistry::new(Arc::clone(&ledger));

    let client = demo_party('a')?;
    let contractor = demo_party('b')?;
    let mediator = demo_party('c')?;

    let id = ledger.create_service(
        client.clone(),
        contractor.clone(),
        TradeCategory::Electrical,
        "full electrical installation".to_string(),
        None,
        vec![
            MilestoneSpec::new("first fix", Amount::new(1_000)),
            MilestoneSpec::new("second fix", Amount::new(1_000)),
            MilestoneSpec::new("certification", Amount::new(1_000)),
        ],
        Amount::new(3_000),
    )?;
    println!("created {id}: 3000 locked across 3 milestones");

    ledger.confirm_acceptance(id, &contractor)?;
    println!("contractor accepted; settlement open");

    match args.scenario {
        Scenario::Settlement => {
            for index in 0..3 {
                ledger.complete_milestone(id, index, &contractor)?;
                ledger.approve_milestone(id, index, &client)?;
                let service = ledger.get_service(id)?;
                println!(
                    "milestone {index} approved; released {} of {}",
                    service.released_amount, service.total_amount
                );
            }
            let service = ledger.get_service(id)?;
            println!("service finished as {}", service.status);
        }
        Scenario::Dispute => {
            ledger.complete_milestone(id, 0, &contractor)?;
            ledger.approve_milestone(id, 0, &client)?;
            println!("milestone 0 approved; released 1000 of 3000");

            let dispute_id = registry.raise_dispute(id, &client)?;
            println!("{dispute_id} raised by client; residual 2000 frozen");

            registry.submit_evidence(dispute_id, &client, "second fix never started")?;
            registry.submit_evidence(
                dispute_id,
                &contractor,
                "client blocked site access in week two",
            )?;
            println!("both parties submitted evidence");

            registry.resolve_dispute(
                dispute_id,
                &mediator,
                DisputeFavor::Client,
                "site records support the client's account",
            )?;
            let service = ledger.get_service(id)?;
            println!(
                "mediator ruled for the client; residual refunded; service finished as {}",
                service.status
            );
        }
    }

    if args.json {
        let events = ledger.events().snapshot();
        println!("{}", serde_json::to_string_pretty(&events)?);
    }
    Ok(())
}
