use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use servicecargue::config::{Config, ContactConfig};
use servicecargue::dispatch::Dispatcher;
use servicecargue::state::AppState;

pub const NAV_HTML: &str = r#"<nav class="navbar"><a href="/">ServiceCargue</a></nav>"#;
pub const FOOTER_HTML: &str = r#"<footer class="footer">Pie de página</footer>"#;

pub const CONTACT_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<body>
    <div id="nav-placeholder"></div>
    <main>
        <form id="contactForm" method="post" action="/contact">
            <input name="firstName" required>
            <input name="email" type="email" required>
            <select name="service" required>
                <option value="">Servicio</option>
                <option value="embalaje">Embalaje Profesional</option>
                <option value="cargue">Cargue de Paquetes</option>
            </select>
            <textarea name="message" required></textarea>
            <button type="submit">Enviar</button>
        </form>
    </main>
    <div id="footer-placeholder"></div>
</body>
</html>"#;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<body>
    <div id="nav-placeholder"></div>
    <main>Inicio</main>
    <div id="footer-placeholder"></div>
</body>
</html>"#;

/// A running test server instance with its own site directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub site_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET a page, return (body, status).
    pub async fn get_page(&self, path: &str) -> (String, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get page failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }

    /// Submit JSON to the contact endpoint, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/contact"))
            .header("accept", "application/json")
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit the form the way a browser does, return (html, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (String, StatusCode) {
        let resp = self
            .client
            .post(self.url("/contact"))
            .header("accept", "text/html")
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }

    /// Run the blur check for one field, return (body, status).
    pub async fn validate_field(&self, field: &str, value: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/contact/validate"))
            .json(&json!({ "field": field, "value": value }))
            .send()
            .await
            .expect("validate field failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// A complete, valid quote request.
pub fn ana() -> Value {
    json!({
        "firstName": "Ana",
        "lastName": "Diaz",
        "email": "ana@x.co",
        "phone": "3001234567",
        "service": "embalaje",
        "origin": "Bogotá",
        "destination": "Medellín",
        "urgency": "normal",
        "message": "hola"
    })
}

pub fn ana_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("firstName", "Ana"),
        ("lastName", "Diaz"),
        ("email", "ana@x.co"),
        ("phone", "3001234567"),
        ("service", "embalaje"),
        ("origin", "Bogotá"),
        ("destination", "Medellín"),
        ("urgency", "normal"),
        ("message", "hola"),
    ]
}

/// Write a site with a contact page, an index and both fragments.
pub fn write_site() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("servicecargue_test_{}", Uuid::now_v7().simple()));
    std::fs::create_dir_all(&dir).expect("Failed to create site dir");
    write_file(&dir, "contacto.html", CONTACT_HTML);
    write_file(&dir, "index.html", INDEX_HTML);
    write_file(&dir, "nav.html", NAV_HTML);
    write_file(&dir, "footer.html", FOOTER_HTML);
    dir
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("Failed to write site file");
}

pub fn test_config(site_dir: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        site_dir,
        contact_page: "contacto.html".to_string(),
        fragment_base_url: None,
        contact: ContactConfig {
            send_delay: Duration::ZERO,
            ..ContactConfig::default()
        },
        max_body_size: 65_536,
        rate_limit: 100,
        rate_window_secs: 60,
        trusted_proxies: vec![],
        log_level: "warn".to_string(),
        smtp: None,
    }
}

/// Spawn a test app with a fresh site directory and the default dispatcher.
pub async fn spawn_app() -> TestApp {
    spawn_with(test_config(write_site()), None).await
}

/// Spawn a test app from `config`, optionally replacing the dispatcher.
pub async fn spawn_with(config: Config, dispatcher: Option<Arc<dyn Dispatcher>>) -> TestApp {
    let site_dir = config.site_dir.clone();

    let state = match dispatcher {
        Some(d) => AppState::with_dispatcher(config, d),
        None => AppState::from_config(config),
    };
    let app = servicecargue::router(Arc::new(state));

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        site_dir,
    }
}

/// Remove the site directory after a test.
pub fn cleanup(app: TestApp) {
    let _ = std::fs::remove_dir_all(&app.site_dir);
}
