//! Resume analysis, enhancement and generation requests.
//!
//! Generation sends a cleaned copy of the structured resume: partially filled
//! rows the form always carries are stripped before the backend sees them.

use serde::{Deserialize, Serialize};

use crate::assessment::models::require_text;
use crate::errors::AppError;

/// Free-text resume plus the role it should be measured against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeTextRequest {
    pub resume_text: String,
    pub target_role: String,
}

impl ResumeTextRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.resume_text.trim().is_empty() || self.target_role.trim().is_empty() {
            return Err(AppError::Validation(
                "Please fill in both resume text and target role".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub target_role: String,
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

impl StructuredResume {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("target_role", &self.target_role)
            .map_err(|_| AppError::Validation("Please specify a target role".to_string()))?;
        if self.personal_info.name.trim().is_empty() || self.personal_info.email.trim().is_empty()
        {
            return Err(AppError::Validation(
                "Please fill in at least name and email".to_string(),
            ));
        }
        Ok(())
    }

    /// Drops empty experience/education rows and blank list entries.
    pub fn cleaned(self) -> Self {
        let experience = self
            .experience
            .into_iter()
            .filter(|e| !e.title.trim().is_empty() || !e.company.trim().is_empty())
            .map(|e| ExperienceItem {
                highlights: non_blank(e.highlights),
                ..e
            })
            .collect();

        let education = self
            .education
            .into_iter()
            .filter(|e| !e.degree.trim().is_empty() || !e.institution.trim().is_empty())
            .collect();

        Self {
            experience,
            education,
            skills: non_blank(self.skills),
            certifications: non_blank(self.certifications),
            ..self
        }
    }
}
