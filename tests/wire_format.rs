use intonata::catalog::Tuning;
use intonata::ledger::{ResultRecord, Side};
use intonata::questionnaire::QuestionnaireData;
use intonata::submit::SubmissionPayload;

fn record(n: usize) -> ResultRecord {
    ResultRecord {
        participant_id: "P_1700000000000_x4k2q".into(),
        trial_number: n,
        condition_id: "M3_sine".into(),
        side_a_tuning: Tuning::Tet,
        side_b_tuning: Tuning::Ji,
        user_choice_side: Side::B,
        chosen_tuning: Tuning::Ji,
        timestamp: "2026-08-30T12:00:00.000Z".into(),
    }
}

#[test]
fn result_record_uses_exact_wire_keys() {
    let value = serde_json::to_value(record(1)).unwrap();
    let obj = value.as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
    for key in [
        "participantId",
        "trialNumber",
        "conditionId",
        "sideA_tuning",
        "sideB_tuning",
        "userChoiceSide",
        "chosenTuning",
        "timestamp",
    ] {
        assert!(keys.contains(&key), "missing key {key} in {keys:?}");
    }
    assert_eq!(obj["sideA_tuning"], "TET");
    assert_eq!(obj["sideB_tuning"], "JI");
    assert_eq!(obj["userChoiceSide"], "B");
    assert_eq!(obj["chosenTuning"], "JI");
    assert_eq!(obj["trialNumber"], 1);
}

#[test]
fn result_record_round_trips() {
    let original = record(7);
    let json = serde_json::to_string(&original).unwrap();
    let back: ResultRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
fn payload_keys_and_optional_questionnaire() {
    let records = vec![record(1), record(2)];

    let bare = SubmissionPayload {
        participant_id: "P_1700000000000_x4k2q",
        experiment_data: &records,
        questionnaire: None,
    };
    let value = serde_json::to_value(&bare).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 2);
    assert!(obj.contains_key("participantId"));
    assert_eq!(obj["experimentData"].as_array().unwrap().len(), 2);
    assert!(!obj.contains_key("questionnaire"));

    let q = QuestionnaireData {
        age_group: "18-24".into(),
        musical_training_years: 0,
        plays_instrument: false,
        hearing_issues: "none".into(),
    };
    let with_q = SubmissionPayload {
        participant_id: "P_1700000000000_x4k2q",
        experiment_data: &records,
        questionnaire: Some(&q),
    };
    let value = serde_json::to_value(&with_q).unwrap();
    assert!(value.as_object().unwrap().contains_key("questionnaire"));
    assert_eq!(value["questionnaire"]["ageGroup"], "18-24");
}
