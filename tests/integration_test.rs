use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reading_test_formatter::models::QuizPayload;
use reading_test_formatter::{
    convert_to_quiz_questions, format_batch, format_fallback, grade_response, utils::logging,
    ChatBackend, Config, FormatJob, GradeOutcome, LlmError, QuestionType, QuizResponse,
    ReadingTestFormatter,
};
use tokio::time::Instant;
use tokio_test::assert_ok;

const RAW: &str = "Passage:\nParis is the capital of France.It is known for the Eiffel Tower.\n\n\
Questions:\n\
1. What is the capital of France?\nA) Paris\nB) Lyon\nC) Nice\nD) Lille\nAnswer: A\n\
2. The Eiffel Tower is in Paris. True or False?\nAnswer: True";

const REMOTE_JSON: &str = r#"```json
{
  "passage": "Paris is the capital of France. It is known for the Eiffel Tower.",
  "questions": [
    {"type": "multiple_choice", "question": "What is the capital of France?",
     "options": ["Paris", "Lyon", "Nice", "Lille"], "correctAnswer": "A"},
    {"type": "true_false", "question": "The Eiffel Tower is in Paris.",
     "options": ["True", "False"], "correctAnswer": "True", "points": 1},
    {"type": "fill_in_the_blank", "question": "Paris is the capital of ___.",
     "correctAnswer": "France", "explanation": "Stated in the first sentence."}
  ]
}
```"#;

/// 按提示词内容返回预设响应，并记录调用时间
struct FakeBackend {
    response: Result<&'static str, &'static str>,
    calls: Mutex<Vec<Instant>>,
}

impl FakeBackend {
    fn ok(response: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Instant::now());
        tokio::time::sleep(Duration::from_millis(500)).await;
        match self.response {
            Ok(text) => Ok(text.to_string()),
            Err(message) => Err(LlmError::from_api_failure("fake", message)),
        }
    }
}

fn formatter(backend: Arc<FakeBackend>) -> ReadingTestFormatter {
    logging::init();
    assert_ok!(ReadingTestFormatter::with_backend(&Config::default(), backend))
}

#[tokio::test(start_paused = true)]
async fn test_remote_result_to_graded_quiz() {
    let backend = FakeBackend::ok(REMOTE_JSON);
    let formatter = formatter(Arc::clone(&backend));

    let test = formatter.format_reading_test(RAW, "Paris").await;
    assert_ok!(test.validate());
    assert_eq!(test.questions.len(), 3);
    assert_eq!(test.questions[0].points, 2);
    assert_eq!(test.questions[2].points, 2);

    let quiz = convert_to_quiz_questions(&test.questions);
    let ids: Vec<&str> = quiz.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["q1", "q2", "q3"]);

    match &quiz[0].payload {
        QuizPayload::Choice { correct_option_index, .. } => assert_eq!(*correct_option_index, Some(0)),
        other => panic!("应为选择题: {:?}", other),
    }

    assert_eq!(
        grade_response(&quiz[0], &QuizResponse::Choice("A".into())),
        GradeOutcome::Scored { awarded: 2, possible: 2 }
    );
    assert_eq!(
        grade_response(&quiz[1], &QuizResponse::Choice("False".into())),
        GradeOutcome::Scored { awarded: 0, possible: 1 }
    );
    assert_eq!(
        grade_response(&quiz[2], &QuizResponse::Blanks(vec!["france".into()])),
        GradeOutcome::Scored { awarded: 2, possible: 2 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_garbage_response_equals_fallback() {
    let backend = FakeBackend::ok("The model is overloaded, please try again.");
    let formatter = formatter(backend);

    let test = formatter.format_reading_test(RAW, "Paris").await;
    assert_eq!(*test, format_fallback(RAW, "Paris"));

    let types: Vec<QuestionType> = test.questions.iter().map(|q| q.question_type).collect();
    assert_eq!(types, [QuestionType::MultipleChoice, QuestionType::TrueFalse]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_content_is_not_retried_within_ttl() {
    let backend = FakeBackend::failing("429 Too Many Requests");
    let formatter = formatter(Arc::clone(&backend));

    let first = formatter.format_reading_test(RAW, "Paris").await;
    tokio::time::advance(Duration::from_secs(60 * 60)).await;
    let second = formatter.format_reading_test(RAW, "Paris").await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(backend.call_times().len(), 1);
    assert_eq!(formatter.stats().cache_hits, 1);
    assert_eq!(formatter.stats().fallbacks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_rate_limit() {
    let backend = FakeBackend::ok(REMOTE_JSON);
    let formatter = formatter(Arc::clone(&backend));

    let topics = ["Paris", "Lyon", "Nice", "Lille"];
    let results = join_all(
        topics
            .iter()
            .map(|topic| formatter.format_reading_test(RAW, topic)),
    )
    .await;

    assert!(results.iter().all(|test| test.validate().is_ok()));

    let times = backend.call_times();
    assert_eq!(times.len(), topics.len());
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(10));
    }
}

#[tokio::test(start_paused = true)]
async fn test_batch_is_total() {
    let backend = FakeBackend::failing("connection reset by peer");
    let formatter = Arc::new(formatter(backend));

    let jobs = vec![
        FormatJob::new("Paris", RAW),
        FormatJob::new("Empty", ""),
        FormatJob::new("Noise", "???\n\n\n!!!"),
    ];
    let results = format_batch(formatter, jobs, 2).await;

    assert_eq!(results.len(), 3);
    for test in &results {
        assert_ok!(test.validate());
    }
    assert_eq!(results[1].questions[0].question_type, QuestionType::ShortAnswer);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：LLM_API_KEY=... cargo test -- --ignored
async fn test_format_with_live_service() {
    logging::init();

    let config = Config::from_env();
    let formatter = ReadingTestFormatter::new(&config).expect("配置无效");

    let test = formatter.format_reading_test(RAW, "Paris").await;
    println!("{}", serde_json::to_string_pretty(&*test).unwrap());
    println!("统计: {:?}", formatter.stats());

    assert!(test.validate().is_ok());
}
