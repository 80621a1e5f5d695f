mod session;
mod timer;

pub use session::{
    AnswerInput, AssessmentSession, QuizOutcome, SessionPhase, SessionSnapshot, TickStatus,
};
pub use timer::CountdownHandle;
