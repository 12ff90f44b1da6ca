//! Application units: one service's dashboard, synthetics and monitors.
//!
//! An `App` is built by applying components to it. Components only talk to
//! the `Container` trait, so they can be wrapped by groups (widgets nest
//! into a group widget) and mutes (monitors are dropped).

pub mod components;
pub mod manifest;

use serde::{Deserialize, Serialize};

use crate::api::{
    AlertGraph, Dashboard, Monitor, Slo, SloThreshold, SloWidget, Synthetic, Widget,
    WidgetDefinition,
};

pub use components::{Group, Mute};
pub use manifest::{load_apps, AppManifest, ComponentSpec};

/// Monitors carrying this tag get an alert graph on the app dashboard.
pub const ALERT_GRAPH_TAG: &str = "dddk:alert_graph";

/// Who gets notified for an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Notified on warnings and everything else that is not an outage.
    pub warning_contact: String,
    /// Notified (paged) on outages.
    pub alert_contact: String,
}

/// Something widgets, synthetics and monitors can be added to.
pub trait Container {
    /// Name of the app the container belongs to.
    fn name(&self) -> &str;

    fn add_widget(&mut self, title: &str, definition: WidgetDefinition);

    fn add_synthetic(&mut self, name: &str, synthetic: Synthetic);

    /// A monitor that should not page anyone.
    fn add_warning_monitor(&mut self, name: &str, monitor: Monitor);

    /// A monitor that pages and counts towards the app's SLO.
    fn add_outage_monitor(&mut self, name: &str, monitor: Monitor);
}

/// A reusable building block that adds resources to a container.
pub trait Component: Send + Sync {
    fn apply(&self, container: &mut dyn Container);
}

impl Component for Box<dyn Component> {
    fn apply(&self, container: &mut dyn Container) {
        (**self).apply(container)
    }
}

/// A monitor together with the id it was synced under, for alert graphs.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertGraphSource {
    pub monitor_id: i64,
    pub monitor_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub name: String,
    pub team: Team,
    pub board: Dashboard,
    pub synthetics: Vec<Synthetic>,
    pub warning_monitors: Vec<Monitor>,
    pub outage_monitors: Vec<Monitor>,
}

impl App {
    pub fn new<C: Component>(name: impl Into<String>, team: Team, components: &[C]) -> Self {
        let name = name.into();
        let mut app = Self {
            board: Dashboard::new(name.clone()),
            name,
            team,
            synthetics: Vec::new(),
            warning_monitors: Vec::new(),
            outage_monitors: Vec::new(),
        };

        for component in components {
            component.apply(&mut app);
        }
        app
    }

    fn service_tag(&self) -> String {
        format!("service:{}", self.name.to_lowercase())
    }

    /// Uptime SLO over the given outage monitors, if there are any.
    pub fn slo(&self, monitor_ids: Vec<i64>) -> Option<Slo> {
        if monitor_ids.is_empty() {
            return None;
        }

        Some(Slo {
            name: format!("{} SLO", self.name),
            kind: "monitor".to_string(),
            description: Some(format!(
                "Track the uptime of {} {}",
                self.name, self.team.warning_contact
            )),
            monitor_ids,
            thresholds: vec![SloThreshold {
                timeframe: "30d".to_string(),
                target: 99.9,
                warning: Some(99.95),
            }],
            tags: vec![format!("service:{}", self.name)],
        })
    }

    /// The dashboard as it should be pushed.
    ///
    /// The SLO widget goes first, alert graphs go after the declared widgets.
    pub fn dashboard(&self, slo_id: Option<&str>, alert_graphs: &[AlertGraphSource]) -> Dashboard {
        let mut board = self.board.clone();

        if let Some(slo_id) = slo_id {
            let widget = WidgetDefinition::Slo(SloWidget {
                title: Some(format!("{} SLO", self.name)),
                viz: "slo".to_string(),
                slo_id: slo_id.to_string(),
                time_windows: vec!["30d".to_string()],
                show_error_budget: true,
                view_type: "detail".to_string(),
                view_mode: "overall".to_string(),
            });
            board.widgets.insert(0, widget.into());
        }

        for graph in alert_graphs {
            let widget = WidgetDefinition::AlertGraph(AlertGraph {
                title: Some(format!("Alert: {}", graph.monitor_name)),
                alert_id: graph.monitor_id.to_string(),
                viz_type: "timeseries".to_string(),
            });
            board.widgets.push(widget.into());
        }

        board
    }
}

impl Container for App {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_widget(&mut self, title: &str, definition: WidgetDefinition) {
        self.board
            .widgets
            .push(Widget::from(definition.with_title(title)));
    }

    fn add_synthetic(&mut self, name: &str, mut synthetic: Synthetic) {
        synthetic.name = name.to_string();
        synthetic.message = format!("{} {}", synthetic.message, self.team.alert_contact);
        synthetic.tags.push(self.service_tag());
        self.synthetics.push(synthetic);
    }

    fn add_warning_monitor(&mut self, name: &str, mut monitor: Monitor) {
        monitor.name = name.to_string();
        monitor.message = format!(
            "{} {}",
            strip_indent(&monitor.message),
            self.team.warning_contact
        );
        monitor.tags.push(self.service_tag());
        self.warning_monitors.push(monitor);
    }

    fn add_outage_monitor(&mut self, name: &str, mut monitor: Monitor) {
        monitor.name = name.to_string();
        let message = notify_on_close(&strip_indent(&monitor.message), &self.team.alert_contact);
        monitor.message = format!("{} {}", message, self.team.warning_contact);
        monitor.tags.push(self.service_tag());
        self.outage_monitors.push(monitor);
    }
}

/// Insert `contact` before every `{{/is_*}}` closing tag except
/// `{{/is_warning}}`.
fn notify_on_close(message: &str, contact: &str) -> String {
    const CLOSE: &str = "{{/is_";
    const WARNING_CLOSE: &str = "{{/is_warning}}";

    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(pos) = rest.find(CLOSE) {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        if !tail.starts_with(WARNING_CLOSE) {
            out.push(' ');
            out.push_str(contact);
        }
        out.push_str(CLOSE);
        rest = &tail[CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

/// Remove the common leading whitespace of all non-blank lines.
pub fn strip_indent(s: &str) -> String {
    let indent = s
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return s.to_string();
    }

    s.split('\n')
        .map(|line| {
            if line.chars().count() >= indent {
                line.chars().skip(indent).collect()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}
