//! Every engine entry point runs inside the same `execute` span.

use std::sync::{Arc, Mutex};

use scriptbox::{CancelToken, Engine, ExecutionRequest, Namespace};
use tracing::span;
use tracing::subscriber::with_default;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

#[derive(Clone, Default)]
struct SpanNames(Arc<Mutex<Vec<String>>>);

impl SpanNames {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl<S: tracing::Subscriber> Layer<S> for SpanNames {
    fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
        self.0.lock().unwrap().push(attrs.metadata().name().to_string());
    }
}

#[test]
fn every_entry_point_opens_the_execute_span() {
    let names = SpanNames::default();
    let subscriber = Registry::default().with(names.clone());
    let engine = Engine::default();
    let ns = Namespace::new();

    with_default(subscriber, || {
        engine.execute("x = 1\n", &ns);
        assert_eq!(names.take(), vec!["execute".to_string()]);

        engine.execute_with_cancel("x = 1\n", &ns, &CancelToken::new());
        assert_eq!(names.take(), vec!["execute".to_string()]);

        engine.run(&ExecutionRequest::new("x = (\n", ns.clone()));
        assert_eq!(names.take(), vec!["execute".to_string()]);
    });
}
