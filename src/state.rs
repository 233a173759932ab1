use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{self, Dispatcher};
use crate::fragments::{FragmentSource, FsSource, HttpSource};
use crate::rate_limit::{InFlight, SubmissionRateLimiter};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub fragments: Arc<dyn FragmentSource>,
    pub submission_limiter: SubmissionRateLimiter,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let dispatcher = dispatch::from_config(&config);
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: Config, dispatcher: Arc<dyn Dispatcher>) -> Self {
        let fragments: Arc<dyn FragmentSource> = match &config.fragment_base_url {
            Some(base) => {
                tracing::info!("Loading fragments from {base}");
                Arc::new(HttpSource::new(base.clone()))
            }
            None => Arc::new(FsSource::new(config.site_dir.clone())),
        };

        Self {
            config,
            dispatcher,
            fragments,
            submission_limiter: SubmissionRateLimiter::new(),
            in_flight: InFlight::new(),
        }
    }
}
