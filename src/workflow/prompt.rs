//! 格式化提示词

/// 构建发送给远程格式化服务的提示词
///
/// 提示词中嵌入主题与原文，并写明输出 JSON 的结构和题型分值。
pub fn build_format_prompt(raw_content: &str, topic: &str) -> String {
    format!(
        r#"You are formatting a reading comprehension test about "{topic}".

Rewrite the raw content below into a clean reading test.

[Rules]
1. Keep the passage text faithful to the source. Fix spacing, remove labels such as "Passage:" and split it into readable paragraphs separated by a blank line.
2. Keep every question from the source, in order. If the source has no questions, write at least one question about the passage.
3. Use exactly one of these question types:
   - "multiple_choice": 2 points, "options" lists the choice texts without letter labels, "correctAnswer" is the full text of one option
   - "true_false": 1 point, "options" is ["True", "False"], "correctAnswer" is "True" or "False"
   - "fill_in_the_blank": 2 points, the question contains "___" for each blank, "correctAnswer" is a string or an array with one answer per blank
   - "short_answer": 3 points, "correctAnswer" is a model answer
4. Add an "explanation" when the source gives one.

[Output]
Return only one JSON object with this shape, no markdown and no commentary:
{{
  "passage": "string",
  "questions": [
    {{
      "type": "multiple_choice",
      "question": "string",
      "options": ["string"],
      "correctAnswer": "string",
      "explanation": "string",
      "points": 2
    }}
  ]
}}

[Raw content]
{raw_content}"#
    )
}
