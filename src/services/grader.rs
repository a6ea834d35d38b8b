//! 自动判分 - 服务层

use crate::models::{BlankDefinition, GradeOutcome, QuizPayload, QuizQuestion, QuizResponse};

/// 对一次作答判分
///
/// - 选择题 / 判断题：作答可以是选项标签（`B`）或选项文本，全对得满分
/// - 填空题：逐空判断，按答对比例给分（向下取整）
/// - 简答题：交由人工批改
///
/// 作答类型与题型不匹配时记 0 分。
pub fn grade_response(question: &QuizQuestion, response: &QuizResponse) -> GradeOutcome {
    let possible = question.points;

    match (&question.payload, response) {
        (QuizPayload::ShortAnswer { .. }, _) => GradeOutcome::NeedsManualReview,
        (
            QuizPayload::Choice {
                options,
                correct_option_index,
            },
            QuizResponse::Choice(answer),
        ) => {
            let answer = answer.trim();
            let chosen = options.iter().position(|option| {
                option.id.eq_ignore_ascii_case(answer) || option.text.trim().eq_ignore_ascii_case(answer)
            });
            let correct = chosen.is_some() && chosen == *correct_option_index;
            GradeOutcome::Scored {
                awarded: if correct { possible } else { 0 },
                possible,
            }
        }
        (QuizPayload::FillInTheBlank { blanks }, QuizResponse::Blanks(answers)) => {
            let correct = blanks
                .iter()
                .zip(answers.iter().map(Some).chain(std::iter::repeat(None)))
                .filter(|(blank, answer)| answer.map_or(false, |a| blank_matches(blank, a)))
                .count();
            GradeOutcome::Scored {
                awarded: partial_credit(possible, correct, blanks.len()),
                possible,
            }
        }
        _ => GradeOutcome::Scored { awarded: 0, possible },
    }
}

fn blank_matches(blank: &BlankDefinition, answer: &str) -> bool {
    let answer = answer.trim();
    blank.correct_answers.iter().any(|expected| {
        let expected = expected.trim();
        if blank.case_sensitive {
            expected == answer
        } else {
            expected.to_lowercase() == answer.to_lowercase()
        }
    })
}

fn partial_credit(points: u32, correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let awarded = points as usize * correct / total;
    u32::try_from(awarded).unwrap_or(points)
}
