mod controller;

pub use controller::{
    PracticeRun, SaveOutcome, SessionController, SessionHandle, SessionSnapshot, SessionState,
    RECORD_DATE_FORMAT,
};
