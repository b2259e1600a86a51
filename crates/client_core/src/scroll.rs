use std::sync::atomic::{AtomicBool, Ordering};

/// Turns sentinel-visibility reports from the embedding UI into load-more
/// calls. Fires at most once per transition into view, and only while more
/// pages remain; whether a fetch is already in flight is the store's own
/// re-entrancy guard to enforce, not duplicated here.
pub struct LoadMoreTrigger {
    on_load_more: Box<dyn Fn() + Send + Sync>,
    has_more: AtomicBool,
    in_view: AtomicBool,
}

impl LoadMoreTrigger {
    pub fn new(on_load_more: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            on_load_more: Box::new(on_load_more),
            has_more: AtomicBool::new(true),
            in_view: AtomicBool::new(false),
        }
    }

    /// Reports the sentinel's current visibility. A transition into view
    /// fires the callback once; repeated reports of the same state do not.
    pub fn observe(&self, visible: bool) {
        let was_visible = self.in_view.swap(visible, Ordering::SeqCst);
        if visible && !was_visible && self.has_more.load(Ordering::SeqCst) {
            (self.on_load_more)();
        }
    }

    /// Updates the continuation flag. Re-enabling while the sentinel is
    /// already in view fires once, mirroring an observer re-attaching and
    /// reporting the current state.
    pub fn set_has_more(&self, has_more: bool) {
        let had_more = self.has_more.swap(has_more, Ordering::SeqCst);
        if has_more && !had_more && self.in_view.load(Ordering::SeqCst) {
            (self.on_load_more)();
        }
    }
}
