use serde::{Deserialize, Serialize};

use crate::{
    content::{optional, required},
    error::ApiError,
    skills::repo_types::{Skill, SkillDraft, DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub level: Option<i64>,
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl SkillInput {
    pub fn into_draft(self) -> Result<SkillDraft, ApiError> {
        let name = required("name", self.name).map_err(ApiError::Validation)?;
        let category = required("category", self.category).map_err(ApiError::Validation)?;
        Ok(SkillDraft {
            name,
            category,
            level: clamp_level(self.level),
            icon: optional(self.icon),
            order: self.order,
        })
    }
}

/// Out-of-range levels are pulled to the nearest bound.
pub fn clamp_level(level: Option<i64>) -> i32 {
    match level {
        Some(l) => l.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as i32,
        None => DEFAULT_LEVEL,
    }
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<Skill>,
}

#[derive(Debug, Serialize)]
pub struct SkillResponse {
    pub skill: Skill,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_clamped_into_range() {
        assert_eq!(clamp_level(Some(150)), 100);
        assert_eq!(clamp_level(Some(0)), 1);
        assert_eq!(clamp_level(Some(-7)), 1);
        assert_eq!(clamp_level(Some(i64::MAX)), 100);
        assert_eq!(clamp_level(Some(73)), 73);
        assert_eq!(clamp_level(None), 50);
    }

    #[test]
    fn skill_requires_name_and_category() {
        let input: SkillInput = serde_json::from_str(r#"{"name":"Rust","level":150}"#).unwrap();
        assert!(matches!(input.into_draft(), Err(ApiError::Validation(_))));

        let input: SkillInput =
            serde_json::from_str(r#"{"name":" Rust ","category":"Languages","level":150,"icon":""}"#)
                .unwrap();
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.name, "Rust");
        assert_eq!(draft.level, 100);
        assert_eq!(draft.icon, None);
    }
}
