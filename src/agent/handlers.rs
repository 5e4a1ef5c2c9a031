use super::events::SessionErrorEvent;
use super::session::SessionHandle;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Invoked once per `session.error` event, in arrival order. The handle lets
/// the handler speak back into the session.
pub type ErrorHandler =
    Box<dyn Fn(SessionHandle, SessionErrorEvent) -> BoxFuture<()> + Send + Sync>;

#[derive(Default)]
pub struct EventHandlers {
    pub on_error: Option<ErrorHandler>,
}

impl EventHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_error<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(SessionHandle, SessionErrorEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error = Some(Box::new(move |session, event| {
            Box::pin(handler(session, event))
        }));
        self
    }
}
