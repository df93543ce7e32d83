//! Attempt scoring.
//!
//! Computes the per-part and total score of a finished attempt from the
//! question set and the recorded answer map. Invoked exactly once, at
//! submission; missing answers and malformed input score zero and never
//! raise.

use std::collections::HashMap;

use crate::model::{Answer, AnswerMap, Question, QuestionKind, ScoreBreakdown};

/// Points for a correct single-choice answer.
pub const SINGLE_CHOICE_POINTS: f64 = 0.25;

/// Points for a correct short answer.
pub const SHORT_ANSWER_POINTS: f64 = 0.5;

/// Absolute tolerance for short-answer comparison. Guards against binary
/// float representation error, not a loose-match feature.
pub const SHORT_ANSWER_TOLERANCE: f64 = 0.001;

/// Maximum points for a true/false question.
pub const TRUE_FALSE_POINTS: f64 = 1.0;

/// The result of scoring one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptScore {
    pub breakdown: ScoreBreakdown,
    /// Questions that earned their full point value.
    pub correct_count: u32,
    pub total_questions: u32,
}

/// Points for a true/false question by number of correctly judged
/// propositions.
///
/// This is the exact step table of the platform, not a linear scale: three
/// of four correct is half credit, all four is full credit.
pub fn true_false_points(correct_judgements: u32) -> f64 {
    match correct_judgements {
        0 => 0.0,
        1 => 0.1,
        2 => 0.25,
        3 => 0.5,
        _ => 1.0,
    }
}

/// Parse a decimal number, accepting both `.` and `,` as the separator.
///
/// Returns `None` for anything that is not a number; callers treat that as
/// an incorrect answer.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Score a finished attempt.
///
/// Unanswered questions and answers whose variant does not match the
/// question kind contribute zero silently.
pub fn score_attempt(questions: &[Question], answers: &AnswerMap) -> AttemptScore {
    let mut part1 = 0.0;
    let mut part2 = 0.0;
    let mut part3 = 0.0;
    let mut correct_count = 0u32;

    for question in questions {
        let answer = answers.get(&question.id);
        let (earned, maximum) = match question.kind {
            QuestionKind::SingleChoice => {
                let earned = score_single_choice(question, answer);
                part1 += earned;
                (earned, SINGLE_CHOICE_POINTS)
            }
            QuestionKind::TrueFalse => {
                let earned = score_true_false(question, answer);
                part2 += earned;
                (earned, TRUE_FALSE_POINTS)
            }
            QuestionKind::ShortAnswer => {
                let earned = score_short_answer(question, answer);
                part3 += earned;
                (earned, SHORT_ANSWER_POINTS)
            }
        };
        if earned >= maximum {
            correct_count += 1;
        }
    }

    AttemptScore {
        breakdown: ScoreBreakdown::new(part1, part2, part3),
        correct_count,
        total_questions: questions.len() as u32,
    }
}

/// 0.25 iff the recorded content equals the correct choice's content
/// exactly. No partial credit.
fn score_single_choice(question: &Question, answer: Option<&Answer>) -> f64 {
    let Some(Answer::Choice(selected)) = answer else {
        return 0.0;
    };
    let Some(correct) = question.choices.iter().find(|c| c.correct) else {
        return 0.0;
    };
    if selected == &correct.content {
        SINGLE_CHOICE_POINTS
    } else {
        0.0
    }
}

/// Step-table credit over the question's propositions.
///
/// The table is defined for the platform's four-proposition questions; a
/// different choice count is flagged and the raw match count is clamped to
/// the table's domain.
fn score_true_false(question: &Question, answer: Option<&Answer>) -> f64 {
    let judgements: &HashMap<u64, bool> = match answer {
        Some(Answer::TrueFalse(judgements)) => judgements,
        _ => return 0.0,
    };

    if question.choices.len() != 4 {
        tracing::warn!(
            question_id = question.id,
            choices = question.choices.len(),
            "true/false question does not have 4 propositions; clamping to the step table"
        );
    }

    let matches = question
        .choices
        .iter()
        .filter(|choice| judgements.get(&choice.id) == Some(&choice.correct))
        .count() as u32;

    true_false_points(matches.min(4))
}

/// 0.5 iff both sides parse as numbers within tolerance of each other.
fn score_short_answer(question: &Question, answer: Option<&Answer>) -> f64 {
    let Some(Answer::Text(raw)) = answer else {
        return 0.0;
    };
    let Some(expected) = question.short_answer.as_deref().and_then(parse_decimal) else {
        return 0.0;
    };
    let Some(given) = parse_decimal(raw) else {
        return 0.0;
    };
    if (given - expected).abs() < SHORT_ANSWER_TOLERANCE {
        SHORT_ANSWER_POINTS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;

    fn choice(id: u64, content: &str, correct: bool) -> Choice {
        Choice {
            id,
            label: String::new(),
            content: content.into(),
            correct,
        }
    }

    fn mcq(id: u64) -> Question {
        Question {
            id,
            kind: QuestionKind::SingleChoice,
            content: "2+2?".into(),
            choices: vec![
                choice(1, "3", false),
                choice(2, "4", true),
                choice(3, "5", false),
                choice(4, "6", false),
            ],
            short_answer: None,
        }
    }

    fn tf(id: u64) -> Question {
        Question {
            id,
            kind: QuestionKind::TrueFalse,
            content: "judge each".into(),
            choices: vec![
                choice(11, "p1", true),
                choice(12, "p2", false),
                choice(13, "p3", true),
                choice(14, "p4", true),
            ],
            short_answer: None,
        }
    }

    fn short(id: u64, correct: &str) -> Question {
        Question {
            id,
            kind: QuestionKind::ShortAnswer,
            content: "7/2?".into(),
            choices: vec![],
            short_answer: Some(correct.into()),
        }
    }

    fn tf_answer(pairs: &[(u64, bool)]) -> Answer {
        Answer::TrueFalse(pairs.iter().copied().collect())
    }

    #[test]
    fn single_choice_exact_content_match() {
        let q = mcq(1);
        let mut answers = AnswerMap::new();
        answers.insert(1, Answer::Choice("4".into()));

        let score = score_attempt(&[q.clone()], &answers);
        assert_eq!(score.breakdown.part1, 0.25);
        assert_eq!(score.breakdown.total, 0.25);
        assert_eq!(score.correct_count, 1);

        answers.insert(1, Answer::Choice("5".into()));
        let score = score_attempt(&[q], &answers);
        assert_eq!(score.breakdown.part1, 0.0);
        assert_eq!(score.correct_count, 0);
    }

    #[test]
    fn single_choice_unanswered_scores_zero() {
        let score = score_attempt(&[mcq(1)], &AnswerMap::new());
        assert_eq!(score.breakdown.total, 0.0);
        assert_eq!(score.total_questions, 1);
    }

    #[test]
    fn true_false_step_table() {
        assert_eq!(true_false_points(0), 0.0);
        assert_eq!(true_false_points(1), 0.1);
        assert_eq!(true_false_points(2), 0.25);
        assert_eq!(true_false_points(3), 0.5);
        assert_eq!(true_false_points(4), 1.0);
    }

    #[test]
    fn true_false_three_of_four_is_half_credit() {
        let q = tf(2);
        let mut answers = AnswerMap::new();
        // p1..p3 judged correctly, p4 wrong.
        answers.insert(
            2,
            tf_answer(&[(11, true), (12, false), (13, true), (14, false)]),
        );

        let score = score_attempt(&[q], &answers);
        assert_eq!(score.breakdown.part2, 0.5);
        assert_eq!(score.correct_count, 0);
    }

    #[test]
    fn true_false_all_four_is_full_credit() {
        let q = tf(2);
        let mut answers = AnswerMap::new();
        answers.insert(
            2,
            tf_answer(&[(11, true), (12, false), (13, true), (14, true)]),
        );

        let score = score_attempt(&[q], &answers);
        assert_eq!(score.breakdown.part2, 1.0);
        assert_eq!(score.correct_count, 1);
    }

    #[test]
    fn true_false_untouched_propositions_do_not_match() {
        let q = tf(2);
        let mut answers = AnswerMap::new();
        // Only one proposition touched, judged correctly.
        answers.insert(2, tf_answer(&[(11, true)]));

        let score = score_attempt(&[q], &answers);
        assert_eq!(score.breakdown.part2, 0.1);
    }

    #[test]
    fn true_false_nonstandard_proposition_count_is_clamped() {
        // Flagged by validation; scoring still applies the step table on
        // the raw match count, clamped to the table's domain.
        let mut q = tf(2);
        q.choices.pop(); // 3 propositions
        let mut answers = AnswerMap::new();
        answers.insert(2, tf_answer(&[(11, true), (12, false), (13, true)]));
        assert_eq!(score_attempt(&[q], &answers).breakdown.part2, 0.5);

        let mut q = tf(2);
        q.choices.push(choice(15, "p5", true)); // 5 propositions
        let mut answers = AnswerMap::new();
        answers.insert(
            2,
            tf_answer(&[(11, true), (12, false), (13, true), (14, true), (15, true)]),
        );
        assert_eq!(score_attempt(&[q], &answers).breakdown.part2, 1.0);
    }

    #[test]
    fn short_answer_comma_decimal_accepted() {
        let q = short(3, "3.5");
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("3,5".into()));

        let score = score_attempt(&[q], &answers);
        assert_eq!(score.breakdown.part3, 0.5);
        assert_eq!(score.correct_count, 1);
    }

    #[test]
    fn short_answer_within_tolerance() {
        let q = short(3, "0.3");
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("0.30000000001".into()));
        assert_eq!(score_attempt(&[q], &answers).breakdown.part3, 0.5);
    }

    #[test]
    fn short_answer_outside_tolerance() {
        let q = short(3, "3.5");
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("3.502".into()));
        assert_eq!(score_attempt(&[q], &answers).breakdown.part3, 0.0);
    }

    #[test]
    fn short_answer_non_numeric_is_incorrect_not_an_error() {
        let q = short(3, "3.5");
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("three and a half".into()));
        assert_eq!(score_attempt(&[q], &answers).breakdown.part3, 0.0);

        // Non-numeric correct value from the source is also just incorrect.
        let q = short(3, "n/a");
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("3.5".into()));
        assert_eq!(score_attempt(&[q], &answers).breakdown.part3, 0.0);
    }

    #[test]
    fn mismatched_answer_variant_scores_zero() {
        let mut answers = AnswerMap::new();
        answers.insert(1, Answer::Text("4".into()));
        let score = score_attempt(&[mcq(1)], &answers);
        assert_eq!(score.breakdown.total, 0.0);
    }

    #[test]
    fn parts_accumulate_independently() {
        let questions = vec![mcq(1), tf(2), short(3, "3.5")];
        let mut answers = AnswerMap::new();
        answers.insert(1, Answer::Choice("4".into()));
        answers.insert(
            2,
            tf_answer(&[(11, true), (12, false), (13, true), (14, true)]),
        );
        answers.insert(3, Answer::Text("3,5".into()));

        let score = score_attempt(&questions, &answers);
        assert_eq!(score.breakdown.part1, 0.25);
        assert_eq!(score.breakdown.part2, 1.0);
        assert_eq!(score.breakdown.part3, 0.5);
        assert_eq!(score.breakdown.total, 1.75);
        assert_eq!(score.correct_count, 3);
        assert_eq!(score.total_questions, 3);
    }

    #[test]
    fn forty_five_minute_paper_single_correct_mcq() {
        // One MCQ answered correctly and nothing else.
        let questions = vec![mcq(1), tf(2), short(3, "3.5")];
        let mut answers = AnswerMap::new();
        answers.insert(1, Answer::Choice("4".into()));

        let score = score_attempt(&questions, &answers);
        assert_eq!(score.breakdown.part1, 0.25);
        assert_eq!(score.breakdown.part2, 0.0);
        assert_eq!(score.breakdown.part3, 0.0);
        assert_eq!(score.breakdown.total, 0.25);
    }

    #[test]
    fn parse_decimal_accepts_both_separators() {
        assert_eq!(parse_decimal("3.5"), Some(3.5));
        assert_eq!(parse_decimal("3,5"), Some(3.5));
        assert_eq!(parse_decimal("  -0,25 "), Some(-0.25));
        assert_eq!(parse_decimal("42"), Some(42.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1,2,3"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }
}
