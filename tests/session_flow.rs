use rand::rngs::StdRng;
use rand::SeedableRng;

use intonata::catalog::{Catalog, Tuning};
use intonata::ledger::{ParticipantId, Side};
use intonata::plan::{TrialPlan, TrialPlanEntry};
use intonata::session::{ExperimentSession, Phase, SessionError, SidePlan, TrialAssignment};

fn session_with_seed(seed: u64) -> ExperimentSession<StdRng> {
    ExperimentSession::new(
        Catalog::standard(440.0),
        3,
        ParticipantId::from_raw("P_0_test0"),
        StdRng::seed_from_u64(seed),
    )
}

#[test]
fn full_run_answering_side_a() {
    let mut session = session_with_seed(7);
    session.start();
    assert_eq!(session.total_trials(), 18);
    assert_eq!(session.phase(), Phase::AwaitingJudgment(0));

    while session.phase() != Phase::Completed {
        session.record_judgment(Some(Side::A)).expect("judgment accepted");
    }

    let records = session.ledger().all();
    assert_eq!(records.len(), 18);

    // Ascending trial numbers, gapless, no duplicates.
    let numbers: Vec<usize> = records.iter().map(|r| r.trial_number).collect();
    assert_eq!(numbers, (1..=18).collect::<Vec<_>>());

    for record in records {
        // Exactly one side JI, the other TET.
        assert_ne!(record.side_a_tuning, record.side_b_tuning);
        // Always chose side A, so the semantic outcome is side A's tuning.
        assert_eq!(record.user_choice_side, Side::A);
        assert_eq!(record.chosen_tuning, record.side_a_tuning);
        assert_eq!(record.participant_id, "P_0_test0");
    }

    // Counterbalancing is per-trial random, so 18 identical positional
    // choices must not collapse onto a single tuning.
    let chosen: Vec<Tuning> = records.iter().map(|r| r.chosen_tuning).collect();
    assert!(chosen.iter().any(|&t| t == Tuning::Ji));
    assert!(chosen.iter().any(|&t| t == Tuning::Tet));
}

#[test]
fn seeded_runs_are_exactly_reproducible() {
    let run = |seed: u64| {
        let mut session = session_with_seed(seed);
        session.start();
        let mut chosen = Vec::new();
        while session.phase() != Phase::Completed {
            let record = session.record_judgment(Some(Side::A)).unwrap();
            chosen.push((record.condition_id.clone(), record.chosen_tuning));
        }
        chosen
    };

    assert_eq!(run(123), run(123));
    assert_ne!(run(123), run(124));
}

#[test]
fn judgment_mapping_is_pure() {
    let assignment = TrialAssignment {
        trial_index: 4,
        condition_id: "P5_triangle".into(),
        side_a: SidePlan {
            stimulus_key: "P5_triangle_JI".into(),
            tuning: Tuning::Ji,
        },
        side_b: SidePlan {
            stimulus_key: "P5_triangle_TET".into(),
            tuning: Tuning::Tet,
        },
    };
    assert_eq!(assignment.tuning_for(Side::A), Tuning::Ji);
    assert_eq!(assignment.tuning_for(Side::B), Tuning::Tet);
    assert_eq!(assignment.key_for(Side::B), "P5_triangle_TET");
}

#[test]
fn empty_selection_is_rejected_without_transition() {
    let mut session = session_with_seed(3);
    session.start();
    let phase_before = session.phase();

    let err = session.record_judgment(None).unwrap_err();
    assert_eq!(err, SessionError::NoSelection);
    assert_eq!(session.phase(), phase_before);
    assert!(session.ledger().is_empty());
}

#[test]
fn judgment_after_completion_is_rejected() {
    let mut session = session_with_seed(3);
    session.start();
    while session.phase() != Phase::Completed {
        session.record_judgment(Some(Side::B)).unwrap();
    }
    let err = session.record_judgment(Some(Side::A)).unwrap_err();
    assert_eq!(err, SessionError::NotAwaitingJudgment);
    assert_eq!(session.ledger().len(), 18);
}

#[test]
fn judgment_before_start_is_rejected() {
    let mut session = session_with_seed(3);
    let err = session.record_judgment(Some(Side::A)).unwrap_err();
    assert_eq!(err, SessionError::NotAwaitingJudgment);
}

#[test]
fn unknown_conditions_in_plan_are_skipped_not_fatal() {
    let mut session = session_with_seed(11);
    let plan = TrialPlan::from_entries(vec![
        TrialPlanEntry {
            condition_id: "M3_sine".into(),
        },
        TrialPlanEntry {
            condition_id: "M9_square".into(), // not in the catalog
        },
        TrialPlanEntry {
            condition_id: "P5_sine".into(),
        },
    ]);
    session.start_with_plan(plan);

    assert_eq!(session.phase(), Phase::AwaitingJudgment(0));
    session.record_judgment(Some(Side::A)).unwrap();

    // The bogus entry at index 1 is skipped; the session lands on index 2.
    assert_eq!(session.phase(), Phase::AwaitingJudgment(2));
    session.record_judgment(Some(Side::B)).unwrap();
    assert_eq!(session.phase(), Phase::Completed);

    let records = session.ledger().all();
    assert_eq!(records.len(), 2);
    let numbers: Vec<usize> = records.iter().map(|r| r.trial_number).collect();
    assert_eq!(numbers, vec![1, 3]);
    assert_eq!(records[0].condition_id, "M3_sine");
    assert_eq!(records[1].condition_id, "P5_sine");
}

#[test]
fn restart_clears_the_ledger() {
    let mut session = session_with_seed(21);
    session.start();
    session.record_judgment(Some(Side::A)).unwrap();
    assert_eq!(session.ledger().len(), 1);

    session.start();
    assert!(session.ledger().is_empty());
    assert_eq!(session.phase(), Phase::AwaitingJudgment(0));
}

#[test]
fn assignments_resolve_real_stimuli() {
    let mut session = session_with_seed(2);
    session.start();
    while let Phase::AwaitingJudgment(_) = session.phase() {
        let assignment = session.current().expect("assignment present").clone();
        for side in [Side::A, Side::B] {
            let key = assignment.key_for(side);
            let variant = session
                .catalog()
                .variant_by_key(key)
                .expect("variant resolvable");
            assert!(variant.f1_hz > variant.f0_hz);
        }
        session.record_judgment(Some(Side::A)).unwrap();
    }
}
