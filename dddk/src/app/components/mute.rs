//! Ignore the monitors a set of components declares.
//!
//! Handy for a new service that is not yet seeing production traffic but
//! should already get its dashboards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{Monitor, Synthetic, WidgetDefinition};
use crate::app::{Component, Container};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mute<C>(pub Vec<C>);

struct MutedContainer<'a> {
    parent: &'a mut dyn Container,
}

impl Container for MutedContainer<'_> {
    fn name(&self) -> &str {
        self.parent.name()
    }

    fn add_widget(&mut self, title: &str, definition: WidgetDefinition) {
        self.parent.add_widget(title, definition);
    }

    fn add_synthetic(&mut self, name: &str, synthetic: Synthetic) {
        self.parent.add_synthetic(name, synthetic);
    }

    fn add_warning_monitor(&mut self, name: &str, _monitor: Monitor) {
        debug!("Muted warning monitor {}", name);
    }

    fn add_outage_monitor(&mut self, name: &str, _monitor: Monitor) {
        debug!("Muted outage monitor {}", name);
    }
}

impl<C: Component> Component for Mute<C> {
    fn apply(&self, container: &mut dyn Container) {
        let mut muted = MutedContainer { parent: container };
        for component in &self.0 {
            component.apply(&mut muted);
        }
    }
}
