use serde::{Deserialize, Serialize};

use crate::assessment::models::{require_text, Difficulty};
use crate::errors::AppError;

const MAX_WEEKLY_HOURS: u32 = 80;

fn default_weekly_hours() -> u32 {
    5
}

/// Input for a personalised learning plan.
#[derive(Debug, Clone, Deserialize)]
pub struct LearningPlanRequest {
    pub skill: String,
    #[serde(default)]
    pub current_level: Difficulty,
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: u32,
    /// Optional goal, e.g. the role the user is preparing for.
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningPlanPayload {
    pub skill: String,
    pub current_level: Difficulty,
    pub weekly_hours: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl LearningPlanRequest {
    pub fn into_payload(self) -> Result<LearningPlanPayload, AppError> {
        require_text("skill", &self.skill)?;
        if !(1..=MAX_WEEKLY_HOURS).contains(&self.weekly_hours) {
            return Err(AppError::Validation(format!(
                "weekly_hours must be between 1 and {MAX_WEEKLY_HOURS}"
            )));
        }
        Ok(LearningPlanPayload {
            skill: self.skill.trim().to_string(),
            current_level: self.current_level,
            weekly_hours: self.weekly_hours,
            goal: self
                .goal
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
        })
    }
}
