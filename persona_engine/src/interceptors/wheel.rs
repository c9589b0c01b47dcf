use persona_config::Category;

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{HostState, PageId};
use crate::snapshot::Snapshots;

pub(crate) fn record_page(snapshots: &mut Snapshots, page: Option<PageId>) {
    snapshots.page = page;
}

pub(crate) struct ActionWheelInterceptor;

impl Interceptor for ActionWheelInterceptor {
    fn category(&self) -> Category {
        Category::ActionWheel
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        env.snapshots.page = host.current_page();
        if env.snapshots.page.is_some() {
            host.set_current_page(None);
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        if let Some(page) = env.snapshots.page {
            host.set_current_page(Some(page));
        }
    }
}
