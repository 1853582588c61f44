use std::cell::RefCell;

use kuchiki::NodeRef;

use crate::page::{self, Page};

pub const MODAL_OPEN_CLASS: &str = "modal-open";
pub const DIALOG_SELECTOR: &str = "[role=\"dialog\"]";

/// Shows and hides dialog panels through `aria-hidden` and keeps the body
/// `modal-open` class set iff at least one panel is visible.
#[derive(Default)]
pub struct ModalCoordinator {
    panels: RefCell<Vec<NodeRef>>,
}

impl ModalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a panel that may not carry `role="dialog"`.
    pub fn register(&self, panel: &NodeRef) {
        let mut panels = self.panels.borrow_mut();
        if !panels.iter().any(|p| p == panel) {
            panels.push(panel.clone());
        }
    }

    pub fn open(&self, page: &Page, panel: Option<&NodeRef>) {
        let Some(panel) = panel else {
            return;
        };
        self.register(panel);
        page::set_attr(panel, "aria-hidden", "false");
        if let Some(body) = page.body() {
            page::add_class(&body, MODAL_OPEN_CLASS);
        }
    }

    pub fn close(&self, page: &Page, panel: Option<&NodeRef>) {
        let Some(panel) = panel else {
            return;
        };
        page::set_attr(panel, "aria-hidden", "true");
        if self.any_open(page) {
            return;
        }
        if let Some(body) = page.body() {
            page::remove_class(&body, MODAL_OPEN_CLASS);
        }
    }

    pub fn any_open(&self, page: &Page) -> bool {
        self.panels.borrow().iter().any(is_open)
            || page.select_all(DIALOG_SELECTOR).iter().any(is_open)
    }
}

pub fn is_open(panel: &NodeRef) -> bool {
    page::attr(panel, "aria-hidden").as_deref() == Some("false")
}

pub fn body_flag_set(page: &Page) -> bool {
    page.body()
        .map(|b| page::has_class(&b, MODAL_OPEN_CLASS))
        .unwrap_or(false)
}
