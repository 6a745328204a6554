//! View registration as the host sees it.

use crate::dom::NodeId;
use crate::view::{KanbanView, ViewContext, ViewOption, VIEW_TYPE};

pub const VIEW_NAME: &str = "Kanban";
pub const VIEW_ICON: &str = "layout-kanban";

pub type ViewFactory = fn(ViewContext, NodeId) -> KanbanView;

#[derive(Debug, Clone, Copy)]
pub struct ViewRegistration {
    pub view_type: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub factory: ViewFactory,
    pub options: fn() -> Vec<ViewOption>,
}

impl ViewRegistration {
    pub fn create(&self, ctx: ViewContext, mount: NodeId) -> KanbanView {
        (self.factory)(ctx, mount)
    }
}

/// Registered views, looked up by type.
#[derive(Debug, Default)]
pub struct Plugin {
    views: Vec<ViewRegistration>,
}

impl Plugin {
    /// Plugin with the kanban view registered.
    pub fn load() -> Self {
        let mut plugin = Self::default();
        plugin.register(ViewRegistration {
            view_type: VIEW_TYPE,
            name: VIEW_NAME,
            icon: VIEW_ICON,
            factory: KanbanView::new,
            options: KanbanView::describe_configuration_options,
        });
        tracing::debug!(view = VIEW_TYPE, "registered view");
        plugin
    }

    pub fn register(&mut self, registration: ViewRegistration) {
        self.views.retain(|v| v.view_type != registration.view_type);
        self.views.push(registration);
    }

    pub fn view(&self, view_type: &str) -> Option<&ViewRegistration> {
        self.views.iter().find(|v| v.view_type == view_type)
    }

    pub fn views(&self) -> &[ViewRegistration] {
        &self.views
    }
}
