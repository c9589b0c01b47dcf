use std::collections::BTreeMap;

use super::{Handler, HostState};

pub type PageId = u32;

#[derive(Debug, Clone)]
pub struct Action {
    pub title: String,
    pub handler: Option<Handler>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub actions: Vec<Action>,
}

/// Radial action menu: a set of pages and a pointer to the shown one.
#[derive(Debug, Default)]
pub(super) struct ActionWheel {
    pages: BTreeMap<PageId, Page>,
    current: Option<PageId>,
    next_id: PageId,
}

impl ActionWheel {
    pub(super) fn current(&self) -> Option<PageId> {
        self.current
    }

    pub(super) fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }
}

impl HostState {
    pub fn new_page(&mut self, title: &str) -> PageId {
        self.wheel.next_id = self.wheel.next_id.wrapping_add(1);
        let id = self.wheel.next_id;
        self.log(format!("action_wheel.newPage #{id} {title}"));
        self.wheel.pages.insert(
            id,
            Page {
                title: title.to_string(),
                actions: Vec::new(),
            },
        );
        id
    }

    pub fn add_action(&mut self, page: PageId, title: &str, handler: Option<Handler>) -> Option<usize> {
        let entry = self.wheel.pages.get_mut(&page)?;
        entry.actions.push(Action {
            title: title.to_string(),
            handler,
        });
        let index = entry.actions.len() - 1;
        self.log(format!("action_wheel.#{page}.newAction {title}"));
        Some(index)
    }

    pub fn clear_actions(&mut self, page: PageId) {
        if let Some(entry) = self.wheel.pages.get_mut(&page) {
            entry.actions.clear();
            self.log(format!("action_wheel.#{page}.clearActions"));
        }
    }

    pub fn set_current_page(&mut self, page: Option<PageId>) {
        match page {
            Some(id) => self.log(format!("action_wheel.setPage #{id}")),
            None => self.log("action_wheel.setPage"),
        }
        self.wheel.current = page;
    }

    pub fn current_page(&self) -> Option<PageId> {
        self.wheel.current
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.wheel.pages.get(&id)
    }
}
