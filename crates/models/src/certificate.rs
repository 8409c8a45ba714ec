use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Prefix of every verification code handed out with a certificate
pub const CODE_PREFIX: &str = "CERT";

/// Module completion of a student within one formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(completed: u64, total: u64) -> Self {
        Self { completed, total }
    }

    /// A formation without modules can never be completed
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = (self.completed.min(self.total) * 100) / self.total;
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Generates a code of the form `CERT-XXXX-XXXX-XXXX`
pub fn generate_verification_code() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!(
        "{CODE_PREFIX}-{}-{}-{}",
        &hex[0..4],
        &hex[4..8],
        &hex[8..12]
    )
}

/// Canonical `CERT-XXXX-XXXX-XXXX` form of user input.
///
/// Case, spaces and dashes are ignored and the prefix may be omitted. Input
/// that cannot be a code is returned compacted so it never matches.
pub fn normalize_code(code: &str) -> String {
    let compact: String = code
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let body = compact.strip_prefix(CODE_PREFIX).unwrap_or(&compact);
    if body.len() != 12 {
        return compact;
    }
    format!(
        "{CODE_PREFIX}-{}-{}-{}",
        &body[0..4],
        &body[4..8],
        &body[8..12]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_module_formation_progress() {
        assert!(!Progress::new(2, 3).is_complete());
        assert!(Progress::new(3, 3).is_complete());
    }

    #[test]
    fn test_empty_formation_is_never_complete() {
        assert!(!Progress::new(0, 0).is_complete());
        assert_eq!(Progress::new(0, 0).percent(), 0);
    }

    #[test]
    fn test_percent_rounds_down() {
        assert_eq!(Progress::new(1, 3).percent(), 33);
        assert_eq!(Progress::new(3, 3).percent(), 100);
    }

    #[test]
    fn test_verification_code_shape() {
        let code = generate_verification_code();
        assert_eq!(code.len(), "CERT-XXXX-XXXX-XXXX".len());
        assert!(code.starts_with("CERT-"));
        assert_eq!(normalize_code(&code.to_lowercase()), code);
        assert_ne!(code, generate_verification_code());
    }

    #[test]
    fn test_normalize_ignores_separators_and_prefix() {
        let code = "CERT-609C-53FC-8A13";
        assert_eq!(normalize_code("cert609c53fc8a13"), code);
        assert_eq!(normalize_code(" CERT 609C 53FC 8A13 "), code);
        assert_eq!(normalize_code("609c-53fc-8a13"), code);
        assert_eq!(normalize_code("CERT-609C"), "CERT609C");
    }
}
