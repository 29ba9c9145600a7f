use std::collections::BTreeMap;

use crate::assessment::models::{EvaluationResult, Question, QuestionDetail};

/// Minimum local score that counts as a pass.
pub const PASS_THRESHOLD: u32 = 60;

/// Percentage of questions whose recorded answer equals the correct answer,
/// rounded to the nearest whole number. No questions scores 0.
pub fn calculate_score(questions: &[Question], answers: &BTreeMap<usize, String>) -> u32 {
    if questions.is_empty() {
        return 0;
    }
    let correct = count_correct(questions, answers);
    (100.0 * correct as f64 / questions.len() as f64).round() as u32
}

fn count_correct(questions: &[Question], answers: &BTreeMap<usize, String>) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i).is_some_and(|a| *a == q.correct_answer))
        .count()
}

/// Builds an evaluation without the backend, for quizzes scored in-process.
pub fn local_evaluation(
    questions: &[Question],
    answers: &BTreeMap<usize, String>,
) -> EvaluationResult {
    let score = calculate_score(questions, answers);

    let details = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let your_answer = answers.get(&i).cloned().unwrap_or_default();
            QuestionDetail {
                question: i + 1,
                correct: your_answer == q.correct_answer,
                your_answer,
                correct_answer: q.correct_answer.clone(),
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    EvaluationResult {
        score: Some(f64::from(score)),
        correct: Some(count_correct(questions, answers) as u32),
        total: Some(questions.len() as u32),
        passed: Some(score >= PASS_THRESHOLD),
        feedback: None,
        details,
        extra: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::QuestionMetadata;

    fn question(correct: &str) -> Question {
        Question {
            text: "q".into(),
            options: vec!["A) a".into(), "B) b".into()],
            correct_answer: correct.into(),
            explanation: None,
            metadata: QuestionMetadata::default(),
            expected_points: vec![],
        }
    }

    fn answers(pairs: &[(usize, &str)]) -> BTreeMap<usize, String> {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    #[test]
    fn test_two_of_three_rounds_to_67() {
        let questions = vec![question("A"), question("B"), question("B")];
        let answers = answers(&[(0, "A"), (1, "B"), (2, "A")]);
        assert_eq!(calculate_score(&questions, &answers), 67);
    }

    #[test]
    fn test_no_questions_scores_zero() {
        assert_eq!(calculate_score(&[], &BTreeMap::new()), 0);
    }

    #[test]
    fn test_missing_answers_count_as_wrong() {
        let questions = vec![question("A"), question("B")];
        assert_eq!(calculate_score(&questions, &answers(&[(1, "B")])), 50);
    }

    #[test]
    fn test_half_rounds_up() {
        // 1 of 8 = 12.5%
        let questions: Vec<Question> = (0..8).map(|_| question("A")).collect();
        assert_eq!(calculate_score(&questions, &answers(&[(0, "A")])), 13);
    }

    #[test]
    fn test_local_evaluation_details() {
        let questions = vec![question("A"), question("B"), question("B")];
        let result = local_evaluation(&questions, &answers(&[(0, "A"), (1, "B"), (2, "A")]));

        assert_eq!(result.score, Some(67.0));
        assert_eq!(result.correct, Some(2));
        assert_eq!(result.total, Some(3));
        assert_eq!(result.passed, Some(true));
        assert_eq!(result.details.len(), 3);
        assert_eq!(result.details[2].question, 3);
        assert!(!result.details[2].correct);
        assert_eq!(result.details[2].your_answer, "A");
        assert_eq!(result.details[2].correct_answer, "B");
    }

    #[test]
    fn test_local_evaluation_fail() {
        let questions = vec![question("A"), question("B")];
        let result = local_evaluation(&questions, &answers(&[(0, "B"), (1, "A")]));
        assert_eq!(result.score, Some(0.0));
        assert_eq!(result.passed, Some(false));
    }
}
