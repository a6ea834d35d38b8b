//! 测验模型转换 - 服务层
//!
//! 把格式化题目转为可自动判分的测验题目。纯函数，任何输入都能转换。

use crate::models::{
    BlankDefinition, FormattedQuestion, QuestionType, QuizOption, QuizPayload, QuizQuestion,
};

/// 批量转换，题目 id 为 `q{序号}`，序号从 1 开始
pub fn convert_to_quiz_questions(questions: &[FormattedQuestion]) -> Vec<QuizQuestion> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| convert_question(index + 1, question))
        .collect()
}

fn convert_question(order: usize, question: &FormattedQuestion) -> QuizQuestion {
    let payload = match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => choice_payload(question),
        QuestionType::FillInTheBlank => QuizPayload::FillInTheBlank {
            blanks: question
                .correct_answer
                .to_vec()
                .into_iter()
                .enumerate()
                .map(|(index, answer)| BlankDefinition {
                    position: index + 1,
                    correct_answers: vec![answer],
                    case_sensitive: false,
                })
                .collect(),
        },
        QuestionType::ShortAnswer => QuizPayload::ShortAnswer {
            keywords: question.correct_answer.to_vec(),
            requires_manual_grading: true,
        },
    };

    QuizQuestion {
        id: format!("q{}", order),
        question_type: question.question_type,
        order,
        question: question.question.clone(),
        points: question.points,
        payload,
    }
}

fn choice_payload(question: &FormattedQuestion) -> QuizPayload {
    let texts = question.options.clone().unwrap_or_default();
    let answer = question.correct_answer.primary().unwrap_or_default().trim();

    let correct_option_index = texts
        .iter()
        .position(|text| text == answer)
        .or_else(|| {
            texts
                .iter()
                .position(|text| text.trim().eq_ignore_ascii_case(answer))
        });

    let options = texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| QuizOption {
            id: option_label(index),
            text,
        })
        .collect();

    QuizPayload::Choice {
        options,
        correct_option_index,
    }
}

/// 选项标签：A、B、C…，超过 26 个时退化为数字
pub(crate) fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}
