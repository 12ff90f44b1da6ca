use serde::{Deserialize, Serialize};

use crate::api::{GroupDefinition, LayoutType, Monitor, Synthetic, Widget, WidgetDefinition};
use crate::app::{Component, Container};

/// Collects the widgets of its components into one group widget.
///
/// Monitors and synthetics pass through to the enclosing container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group<C> {
    pub title: String,
    pub components: Vec<C>,
}

impl<C> Group<C> {
    pub fn new(title: impl Into<String>, components: Vec<C>) -> Self {
        Self {
            title: title.into(),
            components,
        }
    }
}

struct GroupContainer<'a> {
    parent: &'a mut dyn Container,
    widgets: Vec<Widget>,
}

impl Container for GroupContainer<'_> {
    fn name(&self) -> &str {
        self.parent.name()
    }

    fn add_widget(&mut self, title: &str, definition: WidgetDefinition) {
        self.widgets.push(Widget::from(definition.with_title(title)));
    }

    fn add_synthetic(&mut self, name: &str, synthetic: Synthetic) {
        self.parent.add_synthetic(name, synthetic);
    }

    fn add_warning_monitor(&mut self, name: &str, monitor: Monitor) {
        self.parent.add_warning_monitor(name, monitor);
    }

    fn add_outage_monitor(&mut self, name: &str, monitor: Monitor) {
        self.parent.add_outage_monitor(name, monitor);
    }
}

impl<C: Component> Component for Group<C> {
    fn apply(&self, container: &mut dyn Container) {
        let mut group = GroupContainer {
            parent: &mut *container,
            widgets: Vec::new(),
        };
        for component in &self.components {
            component.apply(&mut group);
        }

        let widgets = group.widgets;
        container.add_widget(
            &self.title,
            WidgetDefinition::Group(GroupDefinition {
                title: None,
                layout_type: LayoutType::Ordered,
                widgets,
            }),
        );
    }
}
