use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web::BytesMut;
use futures_util::TryStreamExt;

use crate::errors::{AppError, AppResult};
use crate::utils::upload::PhotoUpload;
use crate::utils::validation::EmployeeForm;

const PHOTO_FIELD: &str = "photo_file";
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// A parsed create/edit submission: the text fields plus the optional photo.
#[derive(Debug, Default)]
pub struct Submission {
    pub form: EmployeeForm,
    pub photo: Option<PhotoUpload>,
}

fn map_multipart_error(err: MultipartError) -> AppError {
    log::warn!("Malformed multipart body: {}", err);
    AppError::BadRequest("Malformed form submission".to_string())
}

async fn read_field(field: &mut Field, name: &str, limit: usize) -> AppResult<BytesMut> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "Field '{}' exceeds the {} byte limit",
                name, limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn text(name: &str, buf: BytesMut) -> AppResult<String> {
    String::from_utf8(buf.to_vec())
        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}

/// Buffers the whole multipart body so nothing is written before validation runs.
pub async fn read_submission(mut payload: Multipart, max_upload_bytes: usize) -> AppResult<Submission> {
    let mut submission = Submission::default();

    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let disposition = field.content_disposition().clone();
        let name = disposition.get_name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let bytes = read_field(&mut field, &name, max_upload_bytes).await?;
            let file_name = disposition.get_filename().unwrap_or_default().to_string();
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() || !bytes.is_empty() {
                submission.photo = Some(PhotoUpload {
                    file_name,
                    bytes: bytes.freeze(),
                });
            }
            continue;
        }

        let value = text(&name, read_field(&mut field, &name, MAX_TEXT_FIELD_BYTES).await?)?;
        let form = &mut submission.form;
        match name.as_str() {
            "id" => {
                let value = value.trim();
                form.id = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| AppError::BadRequest("Invalid employee id".to_string()))?)
                };
            }
            "first_name" => form.first_name = value,
            "last_name" => form.last_name = value,
            "email" => form.email = value,
            "mobile" => form.mobile = value,
            "date_of_birth" => form.date_of_birth = value,
            "photo_path" => form.photo_path = Some(value).filter(|v| !v.is_empty()),
            other => log::debug!("Ignoring unknown form field {:?}", other),
        }
    }

    Ok(submission)
}
