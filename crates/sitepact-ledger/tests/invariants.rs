//! Property tests for the ledger's money invariants: whatever milestone
//! split a service is created with and whatever order approvals happen in,
//! the milestone amounts always sum to the total and the released amount
//! never exceeds it.

use std::sync::Arc;

use proptest::prelude::*;

use sitepact_core::{Amount, PartyId, TradeCategory};
use sitepact_custody::{CustodyVault, InMemoryVault};
use sitepact_ledger::{MilestoneSpec, ServiceLedger, ServiceStatus};

fn party(tail: char) -> PartyId {
    PartyId::new(format!("0x{}", tail.to_string().repeat(40))).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sum_invariant_holds_through_any_approval_order(
        amounts in proptest::collection::vec(1u64..100_000u64, 1..8),
        seed in 0u64..u64::MAX,
    ) {
        let vault = Arc::new(InMemoryVault::new());
        let ledger = ServiceLedger::new(Arc::clone(&vault) as Arc<dyn CustodyVault>);

        let specs: Vec<MilestoneSpec> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| MilestoneSpec::new(format!("stage {i}"), Amount::new(*a)))
            .collect();
        let total = Amount::checked_sum(specs.iter().map(|s| s.amount)).unwrap();

        let id = ledger
            .create_service(
                party('a'),
                party('b'),
                TradeCategory::Construction,
                "property-driven build".to_string(),
                None,
                specs,
                total,
            )
            .unwrap();
        ledger.confirm_acceptance(id, &party('b')).unwrap();

        // Deterministic shuffle of the approval order.
        let mut order: Vec<usize> = (0..amounts.len()).collect();
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            order.swap(i, j);
        }

        let mut released = Amount::ZERO;
        for index in order {
            ledger.complete_milestone(id, index, &party('b')).unwrap();
            ledger.approve_milestone(id, index, &party('a')).unwrap();
            released = released.checked_add(Amount::new(amounts[index])).unwrap();

            let service = ledger.get_service(id).unwrap();
            let milestone_sum =
                Amount::checked_sum(service.milestones.iter().map(|m| m.amount)).unwrap();
            prop_assert_eq!(milestone_sum, service.total_amount);
            prop_assert_eq!(service.released_amount, released);
            prop_assert!(service.released_amount <= service.total_amount);
            // Approved implies completed, always.
            for m in &service.milestones {
                prop_assert!(!m.approved || m.completed);
            }
        }

        let service = ledger.get_service(id).unwrap();
        prop_assert_eq!(service.status, ServiceStatus::Completed);
        prop_assert_eq!(service.released_amount, service.total_amount);
        prop_assert_eq!(vault.balance(id), Some(Amount::ZERO));
    }
}
