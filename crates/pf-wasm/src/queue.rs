//! Serialized trigger queue in front of the controller.
//!
//! Every trigger goes through `inbox` and is handled by one drain task at a
//! time, so a handler never observes another handler half way through. The
//! controller is moved out of its slot while an event is being handled.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use pf_config::JsonConfig;
use pf_core::{Activation, Controller, Message, MutationBatch, Page, SettingsStore};

/// Trigger waiting for the controller.
pub(crate) enum Event {
    /// `done` receives the startup outcome once the event has been handled.
    Start {
        config_json: String,
        done: oneshot::Sender<Activation>,
    },
    Mutations(MutationBatch),
    DebounceTimer,
    UrlChange { href: String, previous: String },
    PollUrl,
    Message(Message),
    Destroy,
}

pub(crate) struct EventQueue<P, S> {
    controller: RefCell<Option<Controller<P, S>>>,
    inbox: RefCell<VecDeque<Event>>,
    draining: Cell<bool>,
    active: Cell<bool>,
    hidden: Cell<usize>,
}

impl<P, S> EventQueue<P, S>
where
    P: Page,
    S: SettingsStore,
{
    pub fn new(controller: Controller<P, S>) -> Self {
        Self {
            controller: RefCell::new(Some(controller)),
            inbox: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            active: Cell::new(false),
            hidden: Cell::new(0),
        }
    }

    pub fn push(&self, event: Event) {
        self.inbox.borrow_mut().push_back(event);
    }

    /// Queue a startup. The receiver is cancelled if the queue is destroyed
    /// before the startup is handled.
    pub fn push_start(&self, config_json: String) -> oneshot::Receiver<Activation> {
        let (done, receiver) = oneshot::channel();
        self.push(Event::Start { config_json, done });
        receiver
    }

    /// Handle queued events until the inbox is empty. Returns at once if
    /// another drain is already running; that one picks up whatever is queued.
    pub async fn drain(self: Rc<Self>) {
        if self.draining.replace(true) {
            return;
        }

        loop {
            let event = self.inbox.borrow_mut().pop_front();
            let Some(event) = event else { break };

            let taken = self.controller.borrow_mut().take();
            let Some(mut controller) = taken else {
                // Destroyed; anything still queued is dropped
                self.inbox.borrow_mut().clear();
                break;
            };

            let keep = handle(&mut controller, event).await;
            self.active.set(controller.is_active());
            self.hidden.set(controller.hidden_count());
            if keep {
                *self.controller.borrow_mut() = Some(controller);
            }
        }

        self.draining.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.get()
    }
}

/// Run one event. Returns false once the controller has been torn down.
async fn handle<P, S>(controller: &mut Controller<P, S>, event: Event) -> bool
where
    P: Page,
    S: SettingsStore,
{
    match event {
        Event::Start { config_json, done } => {
            let activation = controller.start(&JsonConfig::new(config_json)).await;
            log::debug!("Content script {activation:?}");
            // The caller may have stopped waiting
            let _ = done.send(activation);
        }
        Event::Mutations(batch) => controller.on_mutations(&batch),
        Event::DebounceTimer => controller.on_debounce_timer(),
        Event::UrlChange { href, previous } => controller.on_url_change(&href, &previous),
        Event::PollUrl => {
            controller.poll_url();
        }
        Event::Message(message) => controller.on_message(message).await,
        Event::Destroy => {
            controller.teardown();
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use async_trait::async_trait;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use pf_core::{
        ClickError, ClickTrigger, Dom, EngineOptions, Navigator, NodeHandle, ObserverOptions, Observers,
        QueryError, Scheduler, StorageError, StoredSettings,
    };

    const AD_QUERY: &str = "//div[@class='ad']";
    const CONFIG: &str =
        r#"{"sections":[{"id":"ads","name":"Ads","platform":"twitter","queries":["//div[@class='ad']"]}]}"#;

    /// Pending once, then ready.
    #[derive(Default)]
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    /// An x.com page with two ad nodes.
    struct StubPage {
        displays: BTreeMap<NodeHandle, String>,
        observing: bool,
    }

    impl StubPage {
        fn new() -> Self {
            Self {
                displays: BTreeMap::from([
                    (NodeHandle(1), "block".to_string()),
                    (NodeHandle(2), "flex".to_string()),
                ]),
                observing: false,
            }
        }
    }

    impl Dom for StubPage {
        fn evaluate(&mut self, query: &str) -> Result<Vec<NodeHandle>, QueryError> {
            if query == AD_QUERY {
                Ok(self.displays.keys().copied().collect())
            } else {
                Ok(Vec::new())
            }
        }

        fn display(&self, node: NodeHandle) -> Option<String> {
            self.displays.get(&node).cloned()
        }

        fn set_display(&mut self, node: NodeHandle, value: &str) {
            self.displays.insert(node, value.to_string());
        }

        fn tag_hidden(&mut self, _node: NodeHandle, _section_id: &str) {}

        fn untag_hidden(&mut self, _node: NodeHandle) {}
    }

    impl ClickTrigger for StubPage {
        fn click(&mut self, _query: &str, _delay_ms: u32) -> Result<(), ClickError> {
            Ok(())
        }
    }

    impl Navigator for StubPage {
        fn current_href(&self) -> String {
            "https://x.com/home".to_string()
        }

        fn replace(&mut self, _url: &str) {}
    }

    impl Scheduler for StubPage {
        fn schedule(&mut self, _delay_ms: u32) {}
    }

    impl Observers for StubPage {
        fn attach(&mut self, _options: ObserverOptions) {
            self.observing = true;
        }

        fn detach(&mut self) {
            self.observing = false;
        }
    }

    /// Storage that suspends once on every call, like a promise-backed area.
    #[derive(Default)]
    struct SlowStore {
        state: RefCell<StoredSettings>,
    }

    #[async_trait(?Send)]
    impl SettingsStore for SlowStore {
        async fn load(&self) -> Result<StoredSettings, StorageError> {
            YieldNow::default().await;
            Ok(self.state.borrow().clone())
        }

        async fn save_field(&self, partial: &StoredSettings) -> Result<(), StorageError> {
            YieldNow::default().await;
            self.state.borrow_mut().merge(partial);
            Ok(())
        }
    }

    fn queue() -> Rc<EventQueue<StubPage, SlowStore>> {
        let controller = Controller::new(StubPage::new(), SlowStore::default(), EngineOptions::default());
        Rc::new(EventQueue::new(controller))
    }

    #[test]
    fn test_start_behind_running_drain_reports_activation() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let queue = queue();

        // A message arrives first and its drain is already running when
        // startup is queued behind it
        queue.push(Event::Message(Message::ToggleExtension { enabled: true }));
        spawner.spawn_local(queue.clone().drain()).unwrap();
        let done = queue.push_start(CONFIG.to_string());
        spawner.spawn_local(queue.clone().drain()).unwrap();

        let activation = pool.run_until(done);
        assert_eq!(activation, Ok(Activation::Active));
        assert!(queue.is_active());
        assert_eq!(queue.hidden_count(), 2);
    }

    #[test]
    fn test_destroy_before_start_cancels_startup() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let queue = queue();

        queue.push(Event::Destroy);
        let done = queue.push_start(CONFIG.to_string());
        spawner.spawn_local(queue.clone().drain()).unwrap();

        assert!(pool.run_until(done).is_err());
        assert!(!queue.is_active());
        assert_eq!(queue.hidden_count(), 0);
    }

    #[test]
    fn test_events_handled_in_order() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let queue = queue();

        let done = queue.push_start(CONFIG.to_string());
        queue.push(Event::Message(Message::ToggleExtension { enabled: false }));
        queue.push(Event::Mutations(MutationBatch::added(3)));
        spawner.spawn_local(queue.clone().drain()).unwrap();
        pool.run_until_stalled();

        assert_eq!(pool.run_until(done), Ok(Activation::Active));
        assert!(queue.is_active());
        // Disabling after startup restored both nodes
        assert_eq!(queue.hidden_count(), 0);

        queue.push(Event::Message(Message::ToggleExtension { enabled: true }));
        queue.push(Event::Destroy);
        queue.push(Event::PollUrl);
        spawner.spawn_local(queue.clone().drain()).unwrap();
        pool.run_until_stalled();

        assert!(!queue.is_active());
        assert_eq!(queue.hidden_count(), 0);
        assert!(queue.controller.borrow().is_none());
        assert!(queue.inbox.borrow().is_empty());
    }
}
