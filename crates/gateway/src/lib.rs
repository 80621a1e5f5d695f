#![forbid(unsafe_code)]

pub mod submission;

pub use submission::{GatewayError, InMemoryGateway, QuizResultUpload, SubmissionGateway};
