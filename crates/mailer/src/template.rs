use serde::Serialize;
use serde_json::Value;

/// Every transactional email the portal sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    ContactMessage,
    PartnershipRequest,
    ClubApplication,
    ReservationStatusChanged,
    EventRegistrationStatusChanged,
    CompetitionRegistrationStatusChanged,
    CertificateIssued,
}

impl Template {
    fn subject(self) -> &'static str {
        match self {
            Self::ContactMessage => "Nouveau message de contact : {{subject}}",
            Self::PartnershipRequest => "Demande de partenariat : {{organization}}",
            Self::ClubApplication => "Nouvelle candidature au club {{club}}",
            Self::ReservationStatusChanged => "Votre réservation : {{status}}",
            Self::EventRegistrationStatusChanged => "Inscription à « {{event}} » : {{status}}",
            Self::CompetitionRegistrationStatusChanged => {
                "Candidature au concours « {{competition}} » : {{status}}"
            }
            Self::CertificateIssued => "Votre certificat « {{formation}} » est disponible",
        }
    }

    fn body(self) -> &'static str {
        match self {
            Self::ContactMessage => {
                "{{name}} <{{email}}> a écrit :\n\n{{message}}"
            }
            Self::PartnershipRequest => {
                "Organisation : {{organization}}\nContact : {{contact_name}} <{{email}}> {{phone}}\n\n{{message}}"
            }
            Self::ClubApplication => {
                "{{name}} <{{email}}> souhaite rejoindre le club {{club}}.\n\nMotivation :\n{{motivation}}"
            }
            Self::ReservationStatusChanged => {
                "Bonjour {{name}},\n\nVotre demande de réservation ({{resource}}) du {{date}} de {{starts_at}} à {{ends_at}} est désormais : {{status}}.\n{{note}}"
            }
            Self::EventRegistrationStatusChanged => {
                "Bonjour {{name}},\n\nVotre inscription à l'événement « {{event}} » du {{starts_at}} est désormais : {{status}}."
            }
            Self::CompetitionRegistrationStatusChanged => {
                "Bonjour {{name}},\n\nVotre candidature au concours « {{competition}} » du {{date}} est désormais : {{status}}."
            }
            Self::CertificateIssued => {
                "Bonjour {{name}},\n\nFélicitations ! Votre certificat pour la formation « {{formation}} » a été délivré.\nCode de vérification : {{code}}\n{{verify_url}}"
            }
        }
    }

    /// Renders subject and body from the data bag
    pub fn render(self, data: &Value) -> (String, String) {
        (fill(self.subject(), data), fill(self.body(), data))
    }
}

/// Replaces `{{key}}` with the matching top-level field; missing keys render empty
fn fill(template: &str, data: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        match data.get(after[..end].trim()) {
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_substitutes_fields() {
        let data = json!({ "name": "Awa", "count": 3, "note": null });
        assert_eq!(
            fill("{{name}} x{{count}}{{note}}{{missing}}!", &data),
            "Awa x3!"
        );
    }

    #[test]
    fn test_fill_keeps_unterminated_braces() {
        assert_eq!(fill("a {{b", &json!({})), "a {{b");
    }

    #[test]
    fn test_reservation_rendering() {
        let (subject, body) = Template::ReservationStatusChanged.render(&json!({
            "name": "Kofi",
            "status": "approuvée",
            "resource": "salle",
            "date": "02/05/2025",
            "starts_at": "10:00",
            "ends_at": "12:00",
        }));
        assert_eq!(subject, "Votre réservation : approuvée");
        assert!(body.starts_with("Bonjour Kofi,"));
        assert!(body.contains("de 10:00 à 12:00"));
    }
}
