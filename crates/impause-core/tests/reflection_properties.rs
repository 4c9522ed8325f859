//! Property tests for the reflection timer state machine.
//!
//! Commands are generated as arbitrary sequences; whatever the order, the
//! countdown and ledger invariants must hold.

use impause_core::reflection::{
    fallback_prompts, DecisionLedger, DurationSelection, ReflectionTimer, TimerState,
};
use impause_core::PurchaseDraft;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

#[derive(Debug, Clone)]
enum Op {
    Start(u32),
    Pause,
    Resume,
    Tick(u8),
    RequestBypass,
    CancelBypass,
    ConfirmBypass,
    Decline,
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..5).prop_map(Op::Start),
        Just(Op::Pause),
        Just(Op::Resume),
        (1u8..90).prop_map(Op::Tick),
        Just(Op::RequestBypass),
        Just(Op::CancelBypass),
        Just(Op::ConfirmBypass),
        Just(Op::Decline),
        Just(Op::Reset),
    ]
}

fn draft(price: f64) -> PurchaseDraft {
    PurchaseDraft {
        name: "Camera".into(),
        price,
        category: "Electronics".into(),
        reason: "Travel photos".into(),
        need_score: 5,
        ..Default::default()
    }
}

fn armed_timer(price: f64) -> ReflectionTimer {
    let mut timer = ReflectionTimer::new(DurationSelection::default());
    let ticket = timer.submit_purchase(draft(price)).unwrap();
    timer.resolve_prompts(ticket.id, Ok(fallback_prompts()));
    timer
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn remaining_never_increases_while_running(ops in proptest::collection::vec(op(), 1..40)) {
        let mut rng = Pcg64::seed_from_u64(7);
        let mut timer = armed_timer(50.0);
        let mut ledger = DecisionLedger::new();

        for op in ops {
            let before = timer.remaining_secs();
            let was_running = timer.state() == TimerState::Running;
            match op {
                Op::Tick(n) => {
                    for _ in 0..n {
                        let prev = timer.remaining_secs();
                        let running = timer.state() == TimerState::Running;
                        timer.tick_with(&mut rng);
                        if running {
                            prop_assert_eq!(timer.remaining_secs(), prev - 1);
                        } else {
                            prop_assert_eq!(timer.remaining_secs(), prev);
                        }
                    }
                }
                Op::Pause => {
                    let _ = timer.pause();
                    prop_assert_eq!(timer.remaining_secs(), before);
                }
                Op::Resume => {
                    let _ = timer.resume();
                    prop_assert_eq!(timer.remaining_secs(), before);
                }
                Op::RequestBypass => {
                    let _ = timer.request_bypass();
                    prop_assert_eq!(timer.remaining_secs(), before);
                }
                Op::CancelBypass => {
                    let _ = timer.cancel_bypass();
                    prop_assert_eq!(timer.remaining_secs(), before);
                }
                Op::Start(m) => { let _ = timer.start(m); }
                Op::ConfirmBypass => { let _ = timer.confirm_bypass(&mut ledger); }
                Op::Decline => { let _ = timer.decline(&mut ledger); }
                Op::Reset => { let _ = timer.reset(); }
            }
            prop_assert!(timer.remaining_secs() <= timer.duration_secs());
            if was_running && timer.state() == TimerState::Running {
                prop_assert!(timer.remaining_secs() <= before);
            }
        }
    }

    #[test]
    fn ledger_grows_by_one_per_recorded_decision(ops in proptest::collection::vec(op(), 1..40)) {
        let mut rng = Pcg64::seed_from_u64(11);
        let mut timer = armed_timer(20.0);
        let mut ledger = DecisionLedger::new();
        let mut decisions = 0usize;

        for op in ops {
            let outcome = match op {
                Op::ConfirmBypass => timer.confirm_bypass(&mut ledger).ok(),
                Op::Decline => timer.decline(&mut ledger).ok(),
                Op::Start(m) => timer.start(m).ok(),
                Op::Pause => timer.pause().ok(),
                Op::Resume => timer.resume().ok(),
                Op::RequestBypass => timer.request_bypass().ok(),
                Op::CancelBypass => timer.cancel_bypass().ok(),
                Op::Reset => timer.reset().ok(),
                Op::Tick(n) => {
                    for _ in 0..n {
                        timer.tick_with(&mut rng);
                    }
                    None
                }
            };
            if outcome.is_some() && matches!(op, Op::ConfirmBypass | Op::Decline) {
                decisions += 1;
                prop_assert_eq!(timer.state(), TimerState::Idle);
                prop_assert!(timer.purchase().is_none());
            }
            prop_assert_eq!(ledger.len(), decisions);

            // Keep a purchase in play so decisions stay reachable.
            if timer.state() == TimerState::Idle {
                let ticket = timer.submit_purchase(draft(20.0)).unwrap();
                timer.resolve_prompts(ticket.id, Ok(fallback_prompts()));
            }
        }
    }

    #[test]
    fn pause_resume_preserves_remaining(minutes in 1u32..10, ticks in 0u32..300, cycles in 1usize..5) {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut timer = armed_timer(10.0);
        timer.start(minutes).unwrap();
        let ticks = ticks.min(minutes * 60 - 1);
        for _ in 0..ticks {
            timer.tick_with(&mut rng);
        }
        let remaining = timer.remaining_secs();

        for _ in 0..cycles {
            timer.pause().unwrap();
            for _ in 0..5 {
                timer.tick_with(&mut rng);
            }
            timer.resume().unwrap();
            prop_assert_eq!(timer.remaining_secs(), remaining);
        }
    }

    #[test]
    fn bypass_round_trip_restores_state(minutes in 1u32..5, ticks in 0u32..100, paused in any::<bool>()) {
        let mut rng = Pcg64::seed_from_u64(5);
        let mut timer = armed_timer(10.0);
        timer.start(minutes).unwrap();
        for _ in 0..ticks.min(minutes * 60 - 1) {
            timer.tick_with(&mut rng);
        }
        if paused {
            timer.pause().unwrap();
        }
        let state = timer.state();
        let remaining = timer.remaining_secs();

        timer.request_bypass().unwrap();
        for _ in 0..10 {
            timer.tick_with(&mut rng);
        }
        timer.cancel_bypass().unwrap();
        prop_assert_eq!(timer.state(), state);
        prop_assert_eq!(timer.remaining_secs(), remaining);
    }

    #[test]
    fn current_prompt_always_from_list(ticks in 0u32..400) {
        let mut rng = Pcg64::seed_from_u64(13);
        let mut timer = armed_timer(10.0);
        timer.start(10).unwrap();
        let prompts = fallback_prompts();
        for _ in 0..ticks {
            timer.tick_with(&mut rng);
            let current = timer.current_prompt().map(str::to_string);
            prop_assert!(current.map_or(false, |p| prompts.contains(&p)));
        }
    }
}
