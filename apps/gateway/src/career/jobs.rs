//! Job recommendations: request validation and normalization of the
//! backend's loosely-shaped job list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assessment::models::require_text;
use crate::errors::AppError;

const MAX_EXPERIENCE_YEARS: u32 = 50;
const DEFAULT_SALARY: &str = "Not specified";
const DEFAULT_OUTLOOK: &str = "moderate";

fn default_experience() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSearchRequest {
    /// Comma-separated, as typed by the user.
    pub skills: String,
    #[serde(default = "default_experience")]
    pub experience_years: u32,
    pub target_role: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSearchPayload {
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub target_role: String,
    pub location: String,
}

impl JobSearchRequest {
    pub fn into_payload(self) -> Result<JobSearchPayload, AppError> {
        require_text("target_role", &self.target_role)?;
        let skills = parse_skills(&self.skills);
        if skills.is_empty() {
            return Err(AppError::Validation(
                "Please list at least one skill".to_string(),
            ));
        }
        if self.experience_years > MAX_EXPERIENCE_YEARS {
            return Err(AppError::Validation(format!(
                "experience_years must be between 0 and {MAX_EXPERIENCE_YEARS}"
            )));
        }
        Ok(JobSearchPayload {
            skills,
            experience_years: self.experience_years,
            target_role: self.target_role.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

/// Splits on commas, trims, and drops blanks.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Strong,
    Good,
    Fair,
    Weak,
}

impl MatchTier {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            MatchTier::Strong
        } else if percent >= 60.0 {
            MatchTier::Good
        } else if percent >= 40.0 {
            MatchTier::Fair
        } else {
            MatchTier::Weak
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub title: String,
    pub match_percent: f64,
    pub match_tier: MatchTier,
    pub skills_matched: Vec<String>,
    pub skills_to_learn: Vec<String>,
    pub salary_range: String,
    pub growth_outlook: String,
    /// The job exactly as the backend sent it.
    pub raw: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecommendations {
    pub total: usize,
    pub jobs: Vec<JobMatch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawJobs {
    #[serde(default)]
    pub jobs: Vec<Value>,
}

impl From<RawJobs> for JobRecommendations {
    fn from(raw: RawJobs) -> Self {
        let jobs: Vec<JobMatch> = raw
            .jobs
            .into_iter()
            .enumerate()
            .map(|(index, job)| normalize_job(index, job))
            .collect();
        JobRecommendations {
            total: jobs.len(),
            jobs,
        }
    }
}

/// Reads the first of `keys` that holds a non-null value.
fn first<'a>(job: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| job.get(*k))
        .find(|v| !v.is_null())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_percent(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn as_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(as_text).collect(),
        Some(Value::String(s)) => parse_skills(s),
        _ => Vec::new(),
    }
}

pub fn normalize_job(index: usize, job: Value) -> JobMatch {
    let title = first(&job, &["title", "position"])
        .map(as_text)
        .unwrap_or_else(|| format!("Job {}", index + 1));
    let match_percent = first(&job, &["match_percent", "match_score", "score"])
        .map(as_percent)
        .unwrap_or(0.0);

    JobMatch {
        title,
        match_percent,
        match_tier: MatchTier::from_percent(match_percent),
        skills_matched: as_list(first(&job, &["skills_matched", "matched_skills"])),
        skills_to_learn: as_list(first(&job, &["skills_to_learn", "required_skills"])),
        salary_range: first(&job, &["salary_range_usd", "salary", "compensation"])
            .map(as_text)
            .unwrap_or_else(|| DEFAULT_SALARY.to_string()),
        growth_outlook: first(&job, &["growth_outlook", "outlook"])
            .map(as_text)
            .unwrap_or_else(|| DEFAULT_OUTLOOK.to_string()),
        raw: job,
    }
}
