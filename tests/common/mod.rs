use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Records the `key` field of every missing-key notice.
#[derive(Clone, Default)]
pub struct Notices(Arc<Mutex<Vec<String>>>);

impl Notices {
    pub fn keys(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct KeyField(Option<String>);

impl Visit for KeyField {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "key" {
            self.0 = Some(format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "key" {
            self.0 = Some(value.to_owned());
        }
    }
}

impl<S: Subscriber> Layer<S> for Notices {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != "polyarray::notice" {
            return;
        }
        let mut key = KeyField(None);
        event.record(&mut key);
        self.0.lock().unwrap().push(key.0.unwrap_or_default());
    }
}

/// Runs `f` with a subscriber that captures notices, returning the keys seen.
pub fn capture_notices(f: impl FnOnce()) -> Vec<String> {
    let notices = Notices::default();
    let subscriber = tracing_subscriber::registry().with(notices.clone());
    tracing::subscriber::with_default(subscriber, f);
    notices.keys()
}
