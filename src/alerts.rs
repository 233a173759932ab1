//! Success and error banners shown above the contact form.
//!
//! [`AlertSlot`] and [`schedule_dismiss`] hold the banner lifecycle: one
//! alert at a time, and a timer only removes the alert it was started for.
//! Served pages carry the same rule as markup. [`render_alert`] writes the
//! display time into `animation-delay`, and `site/static/css/site.css`
//! hides the banner when it runs out. A page always holds a single banner
//! because [`insert_before_form`] drops earlier ones first.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use askama::Template;
use regex::Regex;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::html;

/// Id of the form the banner is placed in front of.
pub const FORM_ID: &str = "contactForm";

static RENDERED_ALERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--alert-->.*?<!--/alert-->").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert-success",
            AlertKind::Error => "alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub icon: &'static str,
    pub heading: &'static str,
    pub message: String,
}

impl Alert {
    pub fn success() -> Self {
        Self {
            kind: AlertKind::Success,
            icon: "ri-check-circle-line",
            heading: "¡Solicitud Enviada Exitosamente!",
            message: "Hemos recibido tu solicitud de cotización. Nos pondremos en contacto contigo en las próximas 2 horas durante horario laboral.".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            icon: "ri-error-warning-line",
            heading: "Error al Enviar",
            message: message.into(),
        }
    }
}

/// Identifies one showing of an alert in an [`AlertSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertHandle(u64);

/// The banner area in front of the form. Holds at most one alert.
#[derive(Debug, Default)]
pub struct AlertSlot {
    current: Option<(AlertHandle, Alert)>,
    shown: u64,
}

impl AlertSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `alert`, removing whatever was showing first.
    pub fn show(&mut self, alert: Alert) -> AlertHandle {
        if let Some((previous, _)) = self.current.take() {
            tracing::debug!("Replacing alert {:?}", previous);
        }
        self.shown += 1;
        let handle = AlertHandle(self.shown);
        self.current = Some((handle, alert));
        handle
    }

    /// Remove the alert shown under `handle`. Returns `false` if it is
    /// already gone or was replaced.
    pub fn dismiss(&mut self, handle: AlertHandle) -> bool {
        match &self.current {
            Some((current, _)) if *current == handle => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref().map(|(_, alert)| alert)
    }

    pub fn is_showing(&self) -> bool {
        self.current.is_some()
    }
}

/// Remove the alert under `handle` once `after` has elapsed. The task
/// resolves to whether it removed anything.
pub fn schedule_dismiss(
    slot: Arc<Mutex<AlertSlot>>,
    handle: AlertHandle,
    after: Duration,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        slot.lock().await.dismiss(handle)
    })
}

#[derive(Template)]
#[template(path = "alerts/alert.html")]
struct AlertTemplate<'a> {
    alert: &'a Alert,
    dismiss_ms: u128,
    mailto: Option<&'a str>,
}

/// Render the banner markup. The page hides it after `dismiss_after`.
pub fn render_alert(
    alert: &Alert,
    dismiss_after: Duration,
    mailto: Option<&str>,
) -> Result<String, askama::Error> {
    AlertTemplate {
        alert,
        dismiss_ms: dismiss_after.as_millis(),
        mailto,
    }
    .render()
}

/// Drop banners rendered earlier, then put `alert_html` right before the
/// form. `None` when the page has no form.
pub fn insert_before_form(page: &str, alert_html: &str) -> Option<String> {
    let cleared = RENDERED_ALERT_RE.replace_all(page, "");
    html::insert_before(&cleared, FORM_ID, alert_html)
}

/// Render the slot's current alert into `page`. An empty slot clears any
/// banner already on the page.
pub fn present(
    page: &str,
    slot: &AlertSlot,
    dismiss_after: Duration,
    mailto: Option<&str>,
) -> Result<String, askama::Error> {
    let alert_html = match slot.current() {
        Some(alert) => render_alert(alert, dismiss_after, mailto)?,
        None => String::new(),
    };

    Ok(insert_before_form(page, &alert_html).unwrap_or_else(|| {
        tracing::warn!("Element {FORM_ID} not found, alert not shown");
        page.to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<main><h2>Contacto</h2><form id="contactForm"><button type="submit">Enviar</button></form></main>"#;

    #[test]
    fn showing_twice_keeps_one_alert() {
        let mut slot = AlertSlot::new();
        let first = slot.show(Alert::error("uno"));
        let second = slot.show(Alert::success());

        assert_ne!(first, second);
        assert_eq!(slot.current().map(|a| a.kind), Some(AlertKind::Success));
        assert!(!slot.dismiss(first));
        assert!(slot.is_showing());
        assert!(slot.dismiss(second));
        assert!(!slot.is_showing());
    }

    #[test]
    fn dismiss_twice_is_harmless() {
        let mut slot = AlertSlot::new();
        let handle = slot.show(Alert::success());
        assert!(slot.dismiss(handle));
        assert!(!slot.dismiss(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn untouched_alert_is_removed_after_its_duration() {
        let slot = Arc::new(Mutex::new(AlertSlot::new()));
        let handle = slot.lock().await.show(Alert::success());

        let task = schedule_dismiss(slot.clone(), handle, Duration::from_secs(8));

        tokio::time::sleep(Duration::from_millis(7999)).await;
        assert!(slot.lock().await.is_showing());

        assert!(task.await.unwrap());
        assert!(!slot.lock().await.is_showing());
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_alert_survives_the_earlier_timer() {
        let slot = Arc::new(Mutex::new(AlertSlot::new()));
        let first = slot.lock().await.show(Alert::error("uno"));
        let task = schedule_dismiss(slot.clone(), first, Duration::from_secs(8));

        tokio::time::sleep(Duration::from_secs(2)).await;
        slot.lock().await.show(Alert::success());

        assert!(!task.await.unwrap());
        let slot = slot.lock().await;
        assert_eq!(slot.current().map(|a| a.kind), Some(AlertKind::Success));
    }

    #[test]
    fn renders_banner_with_escaped_message() {
        let html = render_alert(
            &Alert::error("<script>x</script>"),
            Duration::from_secs(8),
            None,
        )
        .unwrap();
        assert!(html.contains(r#"class="alert alert-error""#));
        assert!(html.contains(r#"data-dismiss-after="8000""#));
        assert!(html.contains("ri-error-warning-line"));
        assert!(html.contains("Error al Enviar"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn success_banner_links_the_mail_client() {
        let html = render_alert(
            &Alert::success(),
            Duration::from_secs(8),
            Some("mailto:info@servicecargue.com?subject=a&body=b"),
        )
        .unwrap();
        assert!(html.contains("¡Solicitud Enviada Exitosamente!"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("mailto:info@servicecargue.com?subject=a&amp;body=b"));
    }

    #[test]
    fn banner_goes_right_before_the_form() {
        let mut slot = AlertSlot::new();
        slot.show(Alert::success());
        let page = present(PAGE, &slot, Duration::from_secs(8), None).unwrap();

        let alert_at = page.find("<!--alert-->").unwrap();
        let end_at = page.find("<!--/alert-->").unwrap() + "<!--/alert-->".len();
        let form_at = page.find(r#"<form id="contactForm">"#).unwrap();
        assert!(alert_at < form_at);
        assert_eq!(end_at, form_at);
    }

    #[test]
    fn presenting_again_replaces_previous_banner() {
        let mut slot = AlertSlot::new();
        slot.show(Alert::error("uno"));
        let page = present(PAGE, &slot, Duration::from_secs(8), None).unwrap();
        slot.show(Alert::success());
        let page = present(&page, &slot, Duration::from_secs(8), None).unwrap();

        assert_eq!(page.matches("<!--alert-->").count(), 1);
        assert!(page.contains("alert-success"));
        assert!(!page.contains("alert-error"));
    }

    #[test]
    fn page_without_form_is_left_alone() {
        let mut slot = AlertSlot::new();
        slot.show(Alert::success());
        let page = "<main>sin formulario</main>";
        assert_eq!(present(page, &slot, Duration::from_secs(8), None).unwrap(), page);
    }
}
