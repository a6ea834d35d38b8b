//! 题目识别与抽取
//!
//! 把原始文本中的题目区拆成一道道题，判断题型并解析答案：
//! 分段 → 题型识别 → 答案解析，全部是纯函数。

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{CorrectAnswer, FormattedQuestion, ParsedQuestion, QuestionType};
use crate::text::normalizer::cleanup;

/// 未找到答案时写入的占位答案
pub const ANSWER_NOT_PROVIDED: &str = "Answer not provided";

static RE_QUESTIONS_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)questions\s*:").unwrap());
static RE_NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+\.").unwrap());
static RE_ITEM_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]*").unwrap());
static RE_ANSWER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:answers|answer[ \t]+key)[ \t]*:?[ \t]*$").unwrap());
static RE_ANSWER_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\banswer\s*:").unwrap());
static RE_EXPLANATION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bexplanation\s*:").unwrap());
static RE_OPTION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)(?:^|[ \t])\(?([A-D])[).]").unwrap());
static RE_TRUE_FALSE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(true|false)\b").unwrap());
static RE_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").unwrap());
static RE_LETTER_ANSWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(?([A-D])(?:[).:]\s*(.*)|\s*$)").unwrap());

const TRUE_FALSE_OPTIONS: [&str; 2] = ["True", "False"];

/// 拆分文章和题目区
///
/// 优先按 `Questions:` 标记拆分；没有标记时以第一个 `数字.` 开头的行作为题目区起点；
/// 都没有时整段都是文章，题目区为空。
pub fn split_passage_and_questions(raw: &str) -> (&str, &str) {
    if let Some(m) = RE_QUESTIONS_MARKER.find(raw) {
        return (&raw[..m.start()], &raw[m.end()..]);
    }
    if let Some(m) = RE_NUMBERED_LINE.find(raw) {
        return (&raw[..m.start()], &raw[m.start()..]);
    }
    (raw, "")
}

/// 从题目区抽取所有题目，顺序与原文一致
///
/// 识别到的题目不会被丢弃：没有答案时答案记为 `Answer not provided`。
pub fn extract_questions(questions_text: &str) -> Vec<ParsedQuestion> {
    let (body, answer_key) = match RE_ANSWER_KEY.find(questions_text) {
        Some(m) => (&questions_text[..m.start()], parse_answer_key(&questions_text[m.end()..])),
        None => (questions_text, HashMap::new()),
    };

    let mut questions: Vec<ParsedQuestion> = numbered_blocks(body)
        .into_iter()
        .map(|(number, block)| parse_block(number, block))
        .collect();

    for question in questions.iter_mut() {
        if question.answer != ANSWER_NOT_PROVIDED {
            continue;
        }
        if let Some(answer) = answer_key.get(&question.number) {
            question.answer = answer.clone();
            let question_type = reclassify_with_answer(question);
            question.question_type = question_type;
        }
    }

    debug!("题目抽取完成，共 {} 道", questions.len());
    questions
}

/// 按编号切分题块：每个块从 `数字.` 开始，到下一个编号为止
fn numbered_blocks(text: &str) -> Vec<(u32, &str)> {
    let starts: Vec<(usize, usize, u32)> = RE_ITEM_START
        .captures_iter(text)
        .enumerate()
        .filter_map(|(idx, caps)| {
            let whole = caps.get(0)?;
            let number = caps[1].parse().unwrap_or(idx as u32 + 1);
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start, number))| {
            let body_end = starts.get(i + 1).map_or(text.len(), |next| next.0);
            (number, &text[body_start..body_end])
        })
        .collect()
}

/// 解析答案表（`Answer Key:` 之后的 `1. A` 形式）
fn parse_answer_key(text: &str) -> HashMap<u32, String> {
    numbered_blocks(text)
        .into_iter()
        .map(|(number, answer)| (number, clean_inline(answer)))
        .filter(|(_, answer)| !answer.is_empty())
        .collect()
}

/// 解析单个题块
fn parse_block(number: u32, block: &str) -> ParsedQuestion {
    let answer_pos = RE_ANSWER_MARKER.find(block);
    let explanation_pos = RE_EXPLANATION_MARKER.find(block);

    let question_end = [answer_pos, explanation_pos]
        .iter()
        .flatten()
        .map(|m| m.start())
        .min()
        .unwrap_or(block.len());
    let question_part = &block[..question_end];

    let answer = answer_pos
        .map(|m| segment_after(block, m.end(), explanation_pos.map(|e| e.start())))
        .map(clean_inline)
        .filter(|answer| !answer.is_empty())
        .unwrap_or_else(|| ANSWER_NOT_PROVIDED.to_string());
    let explanation = explanation_pos
        .map(|m| segment_after(block, m.end(), answer_pos.map(|a| a.start())))
        .map(clean_inline)
        .filter(|explanation| !explanation.is_empty());

    let (question, options, question_type) = match extract_options(question_part) {
        Some((stem, options)) => (stem_or_label(number, stem), Some(options), QuestionType::MultipleChoice),
        None => {
            let question = stem_or_label(number, question_part);
            let question_type = classify_open_question(&question, &answer);
            let options = (question_type == QuestionType::TrueFalse)
                .then(|| TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect());
            (question, options, question_type)
        }
    };

    ParsedQuestion {
        number,
        question,
        answer,
        options,
        explanation,
        question_type,
    }
}

/// 题干为空（题块直接以选项开头，或只有编号）时用 `Question N` 代替
fn stem_or_label(number: u32, stem: &str) -> String {
    let stem = clean_inline(stem);
    if stem.is_empty() {
        debug!("第 {} 题题干为空，使用编号代替", number);
        format!("Question {}", number)
    } else {
        stem
    }
}

/// 取标记之后的片段，若另一个标记在其后则截断到该标记
fn segment_after(block: &str, start: usize, other_marker: Option<usize>) -> &str {
    let end = other_marker
        .filter(|&pos| pos > start)
        .unwrap_or(block.len());
    &block[start..end]
}

/// 识别选项（至少两个 A-D 选项标记，且标记后有文字）
///
/// 返回 (题干, 按 A-D 排序的选项)
fn extract_options(question_part: &str) -> Option<(&str, Vec<String>)> {
    let markers: Vec<(usize, usize, char)> = RE_OPTION_MARKER
        .captures_iter(question_part)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps[1].chars().next()?;
            Some((whole.start(), whole.end(), letter))
        })
        .collect();
    if markers.len() < 2 {
        return None;
    }

    let mut by_letter: BTreeMap<char, String> = BTreeMap::new();
    for (i, &(_, text_start, letter)) in markers.iter().enumerate() {
        let text_end = markers.get(i + 1).map_or(question_part.len(), |next| next.0);
        let text = clean_inline(&question_part[text_start..text_end]);
        if !text.is_empty() {
            by_letter.entry(letter).or_insert(text);
        }
    }
    if by_letter.len() < 2 {
        return None;
    }

    Some((&question_part[..markers[0].0], by_letter.into_values().collect()))
}

/// 非选择题的题型判断：判断题 → 填空题 → 简答题
fn classify_open_question(question: &str, answer: &str) -> QuestionType {
    let answer_hint = answer != ANSWER_NOT_PROVIDED && RE_TRUE_FALSE_WORD.is_match(answer);
    if answer_hint || RE_TRUE_FALSE_WORD.is_match(question) {
        return QuestionType::TrueFalse;
    }

    let lower = question.to_lowercase();
    let fill_phrase = (lower.contains("fill") && lower.contains("blank"))
        || (lower.contains("complete") && lower.contains("sentence"));
    if RE_BLANK.is_match(question) || fill_phrase {
        return QuestionType::FillInTheBlank;
    }

    QuestionType::ShortAnswer
}

/// 从答案表补齐答案后重新判断非选择题的题型
fn reclassify_with_answer(question: &mut ParsedQuestion) -> QuestionType {
    if question.question_type == QuestionType::MultipleChoice {
        return QuestionType::MultipleChoice;
    }
    let question_type = classify_open_question(&question.question, &question.answer);
    question.options = (question_type == QuestionType::TrueFalse)
        .then(|| TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect());
    question_type
}

/// 清理并压成单行
fn clean_inline(text: &str) -> String {
    cleanup(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 把答案解析为选项原文
///
/// 依次尝试：与选项完全一致 → 字母标签（`A`、`A) Paris`、`(B)`）→ 忽略大小写与句号的一致。
pub(crate) fn resolve_choice_answer(answer: &str, options: &[String]) -> Option<String> {
    let answer = answer.trim();
    if let Some(option) = options.iter().find(|option| option.as_str() == answer) {
        return Some(option.clone());
    }

    if let Some(caps) = RE_LETTER_ANSWER.captures(answer) {
        let index = caps[1].chars().next().map(|c| (c as u8 - b'A') as usize)?;
        if let Some(option) = options.get(index) {
            return Some(option.clone());
        }
    }

    let normalized = answer.trim_end_matches('.').to_lowercase();
    options
        .iter()
        .find(|option| option.trim_end_matches('.').to_lowercase() == normalized)
        .cloned()
}

/// 把判断题答案解析为 `True` / `False`
pub(crate) fn resolve_true_false(answer: &str) -> Option<String> {
    let lower = answer.trim().to_lowercase();
    let value = match lower.as_str() {
        "t" | "true" | "true." => Some(true),
        "f" | "false" | "false." => Some(false),
        _ => RE_TRUE_FALSE_WORD
            .captures(&lower)
            .map(|caps| &caps[1] == "true"),
    }?;
    Some(TRUE_FALSE_OPTIONS[if value { 0 } else { 1 }].to_string())
}

/// 把解析结果转为格式化题目，并保证选择题答案一定在选项中
///
/// 选择题答案无法对应到选项时降级为简答题，选项保留在题干里交由人工批改。
pub fn to_formatted_question(parsed: &ParsedQuestion) -> FormattedQuestion {
    let options = parsed.options.clone().unwrap_or_default();

    let resolved = match parsed.question_type {
        QuestionType::MultipleChoice => resolve_choice_answer(&parsed.answer, &options),
        QuestionType::TrueFalse => resolve_true_false(&parsed.answer),
        QuestionType::FillInTheBlank | QuestionType::ShortAnswer => None,
    };

    let (question_type, question, options, correct_answer) = match (parsed.question_type, resolved) {
        (question_type, Some(answer)) if question_type.is_choice() => (
            question_type,
            parsed.question.clone(),
            Some(options),
            CorrectAnswer::Single(answer),
        ),
        (QuestionType::MultipleChoice, None) => {
            debug!("第 {} 题答案无法对应选项，降级为简答题", parsed.number);
            (
                QuestionType::ShortAnswer,
                inline_options(&parsed.question, &options),
                None,
                CorrectAnswer::Single(parsed.answer.clone()),
            )
        }
        (QuestionType::TrueFalse, None) => {
            debug!("第 {} 题判断题答案无法识别，降级为简答题", parsed.number);
            (
                QuestionType::ShortAnswer,
                parsed.question.clone(),
                None,
                CorrectAnswer::Single(parsed.answer.clone()),
            )
        }
        (QuestionType::FillInTheBlank, _) => (
            QuestionType::FillInTheBlank,
            parsed.question.clone(),
            None,
            split_blank_answers(&parsed.question, &parsed.answer),
        ),
        (question_type, _) => (
            question_type,
            parsed.question.clone(),
            None,
            CorrectAnswer::Single(parsed.answer.clone()),
        ),
    };

    FormattedQuestion {
        question_type,
        question,
        options,
        correct_answer,
        explanation: parsed.explanation.clone(),
        points: question_type.points(),
    }
}

/// 多个空位且答案以 `,` / `;` 分隔时，拆成每空一个答案
fn split_blank_answers(question: &str, answer: &str) -> CorrectAnswer {
    let blank_count = RE_BLANK.find_iter(question).count();
    if blank_count > 1 {
        let parts: Vec<String> = answer
            .split(|c| c == ',' || c == ';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        if parts.len() > 1 {
            return CorrectAnswer::Multiple(parts);
        }
    }
    CorrectAnswer::Single(answer.to_string())
}

fn inline_options(question: &str, options: &[String]) -> String {
    let listed: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {}", (b'A' + i as u8) as char, option))
        .collect();
    format!("{} {}", question, listed.join(" "))
}
