use kuchiki::NodeRef;

use crate::modal::ModalCoordinator;
use crate::page::{self, Page};

pub const MENU_CLOSE_SELECTOR: &str = "[data-close=\"menu\"]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuClick {
    /// A real link: the menu closes and the browser follows `href`.
    Navigate { href: String },
    /// Close button or backdrop: the menu closes and the default action is suppressed.
    Dismiss,
    Ignored,
}

impl MenuClick {
    pub fn prevents_default(&self) -> bool {
        matches!(self, MenuClick::Dismiss)
    }
}

pub struct MenuController {
    panel: Option<NodeRef>,
}

impl MenuController {
    pub fn new(page: &Page, panel_id: &str) -> Self {
        Self {
            panel: page.by_id(panel_id),
        }
    }

    pub fn panel(&self) -> Option<&NodeRef> {
        self.panel.as_ref()
    }

    pub fn open(&self, page: &Page, modals: &ModalCoordinator) {
        modals.open(page, self.panel.as_ref());
    }

    pub fn close(&self, page: &Page, modals: &ModalCoordinator) {
        modals.close(page, self.panel.as_ref());
    }

    /// Dispatch a click whose target lies inside the menu panel.
    pub fn click(&self, page: &Page, modals: &ModalCoordinator, target: &NodeRef) -> MenuClick {
        let Some(panel) = &self.panel else {
            return MenuClick::Ignored;
        };
        if !page::is_within(target, panel) {
            return MenuClick::Ignored;
        }

        // A link wins over a close marker on the same path.
        if let Some(link) = page::closest(target, "a[href]") {
            self.close(page, modals);
            return MenuClick::Navigate {
                href: page::attr(&link, "href").unwrap_or_default(),
            };
        }

        if page::closest(target, MENU_CLOSE_SELECTOR).is_some() {
            self.close(page, modals);
            return MenuClick::Dismiss;
        }

        MenuClick::Ignored
    }
}
