pub mod quiz;
pub mod reading_test;

pub use quiz::{BlankDefinition, GradeOutcome, QuizOption, QuizPayload, QuizQuestion, QuizResponse};
pub use reading_test::{
    CorrectAnswer, FormattedQuestion, FormattedReadingTest, ParsedQuestion, QuestionType,
};
