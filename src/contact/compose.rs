use askama::Template;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::Serialize;

use super::labels::{Service, Urgency};
use super::Submission;
use crate::config::ContactConfig;

/// A composed quote request, ready to hand to a dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPayload {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// The customer's address, used as `Reply-To` when mail is sent directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Template)]
#[template(path = "email/quote_request.txt")]
struct QuoteRequestBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    company: &'a str,
    service: &'a str,
    origin: &'a str,
    destination: &'a str,
    weight: String,
    urgency: &'a str,
    message: &'a str,
    site_name: &'a str,
    sent_at: String,
}

/// Build the subject and plain-text body for a submission.
///
/// Pure apart from `now`: the same data and instant always yield the same
/// payload.
pub fn prepare_email_data(
    data: &Submission,
    config: &ContactConfig,
    now: DateTime<Utc>,
) -> Result<EmailPayload, askama::Error> {
    let service = Service::resolve(data.value("service"));

    let body = QuoteRequestBody {
        first_name: data.value("firstName"),
        last_name: data.value("lastName"),
        email: data.value("email"),
        phone: data.value("phone"),
        company: data.non_empty("company").unwrap_or("No especificada"),
        service,
        origin: data.value("origin"),
        destination: data.value("destination"),
        weight: data
            .non_empty("weight")
            .map(|w| format!("{w} kg"))
            .unwrap_or_else(|| "No especificado".to_string()),
        urgency: Urgency::resolve(data.value("urgency")),
        message: data.value("message"),
        site_name: &config.site_name,
        sent_at: format_es_co(&now.with_timezone(&config.utc_offset)),
    }
    .render()?;

    Ok(EmailPayload {
        to: config.to_address.clone(),
        subject: format!("Nueva Solicitud de Cotización - {service}"),
        body: body.trim().to_string(),
        reply_to: data
            .non_empty("email")
            .map(|e| e.trim().to_string()),
    })
}

/// `D/M/YYYY, h:mm:ss a. m.` as Colombian Spanish renders a local date-time.
pub fn format_es_co(at: &DateTime<FixedOffset>) -> String {
    let (pm, hour) = at.hour12();
    format!(
        "{}/{}/{}, {}:{:02}:{:02} {}",
        at.day(),
        at.month(),
        at.year(),
        hour,
        at.minute(),
        at.second(),
        if pm { "p. m." } else { "a. m." }
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ana() -> Submission {
        [
            ("firstName", "Ana"),
            ("lastName", "Diaz"),
            ("email", "ana@x.co"),
            ("phone", "3001234567"),
            ("service", "embalaje"),
            ("origin", "Bogotá"),
            ("destination", "Medellín"),
            ("urgency", "express"),
            ("message", "hola"),
        ]
        .into_iter()
        .collect()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn subject_uses_service_label() {
        let payload = prepare_email_data(&ana(), &ContactConfig::default(), Utc::now()).unwrap();
        assert_eq!(payload.to, "info@servicecargue.com");
        assert_eq!(
            payload.subject,
            "Nueva Solicitud de Cotización - Embalaje Profesional"
        );
        assert!(payload.subject.contains("Embalaje Profesional"));
    }

    #[test]
    fn body_has_every_section() {
        let payload =
            prepare_email_data(&ana(), &ContactConfig::default(), at(2026, 10, 17, 20, 4, 5))
                .unwrap();
        let body = &payload.body;

        assert!(body.starts_with("NUEVA SOLICITUD DE COTIZACIÓN - SERVICECARGUE"));
        assert!(body.contains("Nombre Completo: Ana Diaz"));
        assert!(body.contains("Email: ana@x.co"));
        assert!(body.contains("Teléfono: 3001234567"));
        assert!(body.contains("Servicio Solicitado: Embalaje Profesional"));
        assert!(body.contains("Ciudad de Origen: Bogotá"));
        assert!(body.contains("Ciudad de Destino: Medellín"));
        assert!(body.contains("Urgencia: Express (1-2 días)"));
        assert!(body.contains("MENSAJE DEL CLIENTE:"));
        assert!(body.contains("\nhola\n"));
        assert!(body.contains("Solicitud enviada desde: www.servicecargue.com"));
        // 20:04:05 UTC is 15:04:05 in Bogotá.
        assert!(body.ends_with("Fecha: 17/10/2026, 3:04:05 p. m."));
    }

    #[test]
    fn optional_fields_fall_back_to_placeholders() {
        let payload = prepare_email_data(&ana(), &ContactConfig::default(), Utc::now()).unwrap();
        assert!(payload.body.contains("Empresa: No especificada"));
        assert!(payload.body.contains("Peso Aproximado: No especificado"));

        let mut data = ana();
        data.insert("company", "Acme SAS");
        data.insert("weight", "120");
        let payload = prepare_email_data(&data, &ContactConfig::default(), Utc::now()).unwrap();
        assert!(payload.body.contains("Empresa: Acme SAS"));
        assert!(payload.body.contains("Peso Aproximado: 120 kg"));
    }

    #[test]
    fn unknown_codes_pass_through_verbatim() {
        let mut data = ana();
        data.insert("service", "mudanza");
        data.insert("urgency", "ayer");
        let payload = prepare_email_data(&data, &ContactConfig::default(), Utc::now()).unwrap();
        assert_eq!(payload.subject, "Nueva Solicitud de Cotización - mudanza");
        assert!(payload.body.contains("Servicio Solicitado: mudanza"));
        assert!(payload.body.contains("Urgencia: ayer"));
    }

    #[test]
    fn deterministic_for_same_instant() {
        let now = at(2026, 1, 2, 3, 4, 5);
        let a = prepare_email_data(&ana(), &ContactConfig::default(), now).unwrap();
        let b = prepare_email_data(&ana(), &ContactConfig::default(), now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_the_timestamp_varies() {
        let config = ContactConfig::default();
        let a = prepare_email_data(&ana(), &config, at(2026, 1, 2, 3, 4, 5)).unwrap();
        let b = prepare_email_data(&ana(), &config, at(2027, 6, 7, 8, 9, 10)).unwrap();
        assert_eq!(a.subject, b.subject);

        let strip = |body: &str| body.rsplit_once("Fecha:").map(|(head, _)| head.to_string());
        assert_eq!(strip(&a.body), strip(&b.body));
        assert_ne!(a.body, b.body);
    }

    #[test]
    fn reply_to_is_customer_address() {
        let payload = prepare_email_data(&ana(), &ContactConfig::default(), Utc::now()).unwrap();
        assert_eq!(payload.reply_to.as_deref(), Some("ana@x.co"));
    }

    #[test]
    fn es_co_format_uses_twelve_hour_clock() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let morning = offset.with_ymd_and_hms(2026, 3, 9, 0, 7, 9).unwrap();
        assert_eq!(format_es_co(&morning), "9/3/2026, 12:07:09 a. m.");
        let noon = offset.with_ymd_and_hms(2026, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(format_es_co(&noon), "25/12/2026, 12:00:00 p. m.");
    }
}
