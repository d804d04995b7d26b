//! Pre-experiment questionnaire, collected once before trial 0 and attached
//! to the submission payload.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireData {
    #[serde(rename = "ageGroup")]
    pub age_group: String,
    #[serde(rename = "musicalTrainingYears")]
    pub musical_training_years: u32,
    #[serde(rename = "playsInstrument")]
    pub plays_instrument: bool,
    #[serde(rename = "hearingIssues")]
    pub hearing_issues: String,
}

/// Prompt over any reader/writer pair so the flow is testable without a tty.
/// Unparseable numeric answers default to 0 rather than re-asking.
pub fn collect<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<QuestionnaireData> {
    let age_group = prompt(input, output, "Age group (e.g. 18-24, 25-34): ")?;
    let training = prompt(input, output, "Years of formal musical training (0 if none): ")?;
    let musical_training_years = training.trim().parse().unwrap_or(0);
    let plays = prompt(input, output, "Do you currently play an instrument? [y/N]: ")?;
    let plays_instrument = matches!(plays.trim(), "y" | "Y" | "yes" | "Yes");
    let hearing_issues = prompt(input, output, "Any known hearing issues? ('none' if not): ")?;

    Ok(QuestionnaireData {
        age_group: age_group.trim().to_string(),
        musical_training_years,
        plays_instrument,
        hearing_issues: hearing_issues.trim().to_string(),
    })
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<String> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn collects_answers_in_order() {
        let mut input = Cursor::new("25-34\n8\ny\nnone\n");
        let mut output = Vec::new();
        let data = collect(&mut input, &mut output).unwrap();
        assert_eq!(data.age_group, "25-34");
        assert_eq!(data.musical_training_years, 8);
        assert!(data.plays_instrument);
        assert_eq!(data.hearing_issues, "none");
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Age group"));
        assert!(prompts.contains("hearing issues"));
    }

    #[test]
    fn bad_training_answer_defaults_to_zero() {
        let mut input = Cursor::new("18-24\na few\nn\nnone\n");
        let mut output = Vec::new();
        let data = collect(&mut input, &mut output).unwrap();
        assert_eq!(data.musical_training_years, 0);
        assert!(!data.plays_instrument);
    }

    #[test]
    fn wire_field_names() {
        let data = QuestionnaireData {
            age_group: "35-44".into(),
            musical_training_years: 2,
            plays_instrument: false,
            hearing_issues: "none".into(),
        };
        let value = serde_json::to_value(&data).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["ageGroup", "musicalTrainingYears", "playsInstrument", "hearingIssues"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }
}
