//! Backend endpoint paths, relative to `BACKEND_URL`.

pub const QUIZ_GENERATE: &str = "quiz/generate";
pub const QUIZ_EVALUATE: &str = "quiz/evaluate";

pub const INTERVIEW_START: &str = "interview/start";
pub const INTERVIEW_EVALUATE: &str = "interview/evaluate";

pub const VOICE_PROCESS: &str = "voice/process";

pub const JOBS_RECOMMEND: &str = "jobs/recommend";
pub const LEARNING_GENERATE: &str = "learning/generate";

pub const RESUME_ANALYZE: &str = "resume/analyze";
pub const RESUME_ENHANCE: &str = "resume/enhance";
pub const RESUME_GENERATE: &str = "resume/generate";
