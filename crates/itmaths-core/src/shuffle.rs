//! Attempt-load shuffling.
//!
//! Reorders a question set once per attempt: questions are permuted within
//! their type partition, the partitions are concatenated in the fixed paper
//! order (single-choice, true/false, short-answer), and single-choice
//! options are themselves permuted and relabelled positionally.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Question, QuestionKind};

/// Positional display label for a choice: `A`–`Z`, then `AA`, `AB`, …
pub fn choice_label(index: usize) -> String {
    let mut label = String::new();
    let mut n = index;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// Shuffle a question set for a new attempt.
///
/// Each type partition is independently Fisher–Yates-permuted, then the
/// partitions are concatenated as part I (single-choice), part II
/// (true/false), part III (short-answer) regardless of input order. For
/// single-choice questions the choice list is also permuted and labels are
/// reassigned by final position; true/false and short-answer questions keep
/// their choices untouched.
///
/// An empty input produces an empty output.
pub fn shuffle_paper<R: Rng>(questions: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let mut single = Vec::new();
    let mut true_false = Vec::new();
    let mut short = Vec::new();

    for question in questions {
        match question.kind {
            QuestionKind::SingleChoice => single.push(question),
            QuestionKind::TrueFalse => true_false.push(question),
            QuestionKind::ShortAnswer => short.push(question),
        }
    }

    single.shuffle(rng);
    true_false.shuffle(rng);
    short.shuffle(rng);

    for question in &mut single {
        question.choices.shuffle(rng);
        for (index, choice) in question.choices.iter_mut().enumerate() {
            choice.label = choice_label(index);
        }
    }

    single.extend(true_false);
    single.extend(short);
    single
}
