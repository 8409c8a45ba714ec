use crate::error::ApiError;
use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use storage::Upload;

/// A `multipart/form-data` write: a `data` JSON part, an optional `file`
/// part and any number of `images` parts
#[derive(Debug)]
pub struct FormData<T> {
    pub data: T,
    pub file: Option<Upload>,
    pub images: Vec<Upload>,
}

pub async fn read_form<T: DeserializeOwned>(
    mut multipart: Multipart,
) -> Result<FormData<T>, ApiError> {
    let mut data = None;
    let mut file = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "data" => {
                let text = field.text().await.map_err(bad_request)?;
                data = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiError::BadRequest(format!("Partie « data » invalide : {e}"))
                })?);
            }
            "file" | "images" | "images[]" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(bad_request)?;

                // Browsers send an empty part when no file was picked
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let upload = Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                };
                if name == "file" {
                    file = Some(upload);
                } else {
                    images.push(upload);
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("Partie « data » manquante.".to_owned()))?;
    Ok(FormData { data, file, images })
}

fn bad_request(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(err.to_string())
}
