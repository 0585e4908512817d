use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use chrono::NaiveDateTime;

use crate::models::{AddressFields, EventInput};
use crate::storage::Upload;
use crate::utils::{AppError, AppResult};

/// `datetime-local` inputs post minutes; seconds are accepted too.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// The multipart event form, as submitted for create and edit.
#[derive(Debug, Default)]
pub struct EventForm {
    fields: HashMap<String, String>,
    file: Option<Upload>,
}

impl EventForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = EventForm::default();

        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                // Browsers send an empty part when no file was picked
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(Upload { file_name, bytes });
                }
            } else {
                let value = field.text().await.map_err(form_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn datetime(&self, name: &str, label: &str) -> AppResult<NaiveDateTime> {
        let raw = self
            .text(name)
            .ok_or_else(|| AppError::ValidationError(format!("{label} is required")))?;

        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "{label} '{raw}' is not a valid date and time (expected YYYY-MM-DDTHH:MM)"
                ))
            })
    }

    fn category_id(&self) -> AppResult<Option<i64>> {
        match self.text("category_id").as_deref() {
            None | Some("0") => Ok(None),
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                AppError::ValidationError(format!("Category '{raw}' is not a valid id"))
            }),
        }
    }

    pub fn into_input(self) -> AppResult<(EventInput, Option<Upload>)> {
        let input = EventInput {
            title: self
                .text("title")
                .ok_or_else(|| AppError::ValidationError("Title is required".to_string()))?,
            description: self.text("description"),
            start_datetime: self.datetime("start_datetime", "Start date & time")?,
            end_datetime: self.datetime("end_datetime", "End date & time")?,
            address: AddressFields {
                location_name: self.text("location_name"),
                street_name: self.text("street_name"),
                street_number: self.text("street_number"),
                postal_code: self.text("postal_code"),
            },
            category_id: self.category_id()?,
        };

        Ok((input, self.file))
    }
}

fn form_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::ValidationError(format!("Malformed form data: {}", err.body_text()))
    }
}
