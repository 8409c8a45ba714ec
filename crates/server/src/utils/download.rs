use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Sends stored bytes as an attachment
pub fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    let file_name: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || "-_.".contains(c) { c } else { '_' })
        .collect();

    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_sanitized() {
        let response = attachment(b"%PDF".to_vec(), "application/pdf", "attestation \"é\".pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_owned();
        assert_eq!(disposition, "attachment; filename=\"attestation____.pdf\"");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    }
}
