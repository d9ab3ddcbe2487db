//! Page visibility, the gate for background polling.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Owner side of the visibility signal. Pollers hold a [`VisibilityWatch`].
pub struct PageVisibility {
    tx: watch::Sender<Visibility>,
}

impl PageVisibility {
    pub fn new(initial: Visibility) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn set(&self, visibility: Visibility) {
        self.tx.send_replace(visibility);
    }

    pub fn current(&self) -> Visibility {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> VisibilityWatch {
        VisibilityWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for PageVisibility {
    fn default() -> Self {
        Self::new(Visibility::Visible)
    }
}

#[derive(Clone)]
pub struct VisibilityWatch {
    rx: watch::Receiver<Visibility>,
}

impl VisibilityWatch {
    /// A watch that never leaves `Visible`.
    pub fn always_visible() -> Self {
        let (_tx, rx) = watch::channel(Visibility::Visible);
        Self { rx }
    }

    pub fn is_visible(&self) -> bool {
        *self.rx.borrow() == Visibility::Visible
    }
}
