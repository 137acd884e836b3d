use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::{
    content::{clean_list, optional, required},
    error::ApiError,
    experience::repo_types::{Experience, ExperienceDraft},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    pub company: Option<String>,
    pub position: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub order: i32,
}

impl ExperienceInput {
    pub fn into_draft(self) -> Result<ExperienceDraft, ApiError> {
        let company = required("company", self.company).map_err(ApiError::Validation)?;
        let position = required("position", self.position).map_err(ApiError::Validation)?;
        let description = required("description", self.description).map_err(ApiError::Validation)?;
        let start_date = match optional(self.start_date) {
            Some(raw) => parse_date("startDate", &raw)?,
            None => return Err(ApiError::Validation("startDate is required".into())),
        };
        let end_date = if self.current {
            None
        } else {
            optional(self.end_date)
                .map(|raw| parse_date("endDate", &raw))
                .transpose()?
        };
        if let Some(end) = end_date {
            if end < start_date {
                return Err(ApiError::Validation("endDate must not precede startDate".into()));
            }
        }
        Ok(ExperienceDraft {
            company,
            position,
            description,
            technologies: clean_list(self.technologies),
            start_date,
            end_date,
            current: self.current,
            order: self.order,
        })
    }
}

/// Accepts `YYYY-MM-DD`, or a full timestamp whose date part is used.
fn parse_date(field: &str, raw: &str) -> Result<Date, ApiError> {
    let day = raw.split('T').next().unwrap_or(raw);
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}

#[derive(Debug, Serialize)]
pub struct ExperienceListResponse {
    pub experience: Vec<Experience>,
}

#[derive(Debug, Serialize)]
pub struct ExperienceResponse {
    pub experience: Experience,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn input(json: &str) -> ExperienceInput {
        serde_json::from_str(json).expect("valid json")
    }

    #[test]
    fn current_entry_drops_end_date() {
        let draft = input(
            r#"{"company":"Acme","position":"Engineer","description":"Built things",
                "startDate":"2022-03-01","endDate":"2023-01-01","current":true}"#,
        )
        .into_draft()
        .unwrap();
        assert!(draft.current);
        assert_eq!(draft.end_date, None);
        assert_eq!(draft.start_date, date!(2022 - 03 - 01));
    }

    #[test]
    fn past_entry_keeps_end_date_and_accepts_timestamps() {
        let draft = input(
            r#"{"company":"Acme","position":"Engineer","description":"d",
                "startDate":"2020-01-15T00:00:00.000Z","endDate":"2021-06-30"}"#,
        )
        .into_draft()
        .unwrap();
        assert_eq!(draft.start_date, date!(2020 - 01 - 15));
        assert_eq!(draft.end_date, Some(date!(2021 - 06 - 30)));
    }

    #[test]
    fn blank_end_date_means_open() {
        let draft = input(
            r#"{"company":"Acme","position":"Engineer","description":"d",
                "startDate":"2020-01-15","endDate":""}"#,
        )
        .into_draft()
        .unwrap();
        assert_eq!(draft.end_date, None);
    }

    #[test]
    fn invalid_dates_are_rejected() {
        for body in [
            r#"{"company":"A","position":"P","description":"d"}"#,
            r#"{"company":"A","position":"P","description":"d","startDate":"last spring"}"#,
            r#"{"company":"A","position":"P","description":"d","startDate":"2022-01-01","endDate":"2021-01-01"}"#,
        ] {
            let err = input(body).into_draft().unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{body}");
        }
    }

    #[test]
    fn response_uses_iso_dates() {
        let draft = input(
            r#"{"company":"Acme","position":"Engineer","description":"d","startDate":"2020-01-15"}"#,
        )
        .into_draft()
        .unwrap();
        let exp = <Experience as crate::content::ContentEntity>::from_draft(
            uuid::Uuid::new_v4(),
            draft,
            time::OffsetDateTime::now_utc(),
        );
        let json = serde_json::to_value(ExperienceResponse { experience: exp }).unwrap();
        assert_eq!(json["experience"]["startDate"], "2020-01-15");
        assert!(json["experience"]["endDate"].is_null());
        assert_eq!(json["experience"]["current"], false);
    }
}
