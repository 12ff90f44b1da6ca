//! Built-in components.
//!
//! Each component is a plain struct that deserializes from an app manifest
//! and adds widgets, monitors or synthetics to a container.

pub mod elb;
pub mod fargate;
pub mod group;
pub mod healthcheck;
pub mod mute;
pub mod rds;
pub mod styles;

use crate::api::{DisplayType, Marker, Request, Style, TimeSeries, WidgetDefinition};

pub use elb::{Alb, Elb};
pub use fargate::{Fargate, FargateService};
pub use group::Group;
pub use healthcheck::Healthcheck;
pub use mute::Mute;
pub use rds::{BurstableRds, Rds};

pub(crate) fn timeseries(requests: Vec<Request>) -> WidgetDefinition {
    WidgetDefinition::Timeseries(TimeSeries {
        requests,
        ..Default::default()
    })
}

pub(crate) fn timeseries_with_markers(
    requests: Vec<Request>,
    markers: Vec<Marker>,
) -> WidgetDefinition {
    WidgetDefinition::Timeseries(TimeSeries {
        requests,
        markers: Some(markers),
        ..Default::default()
    })
}

pub(crate) fn bars(q: impl Into<String>, style: Style) -> Request {
    Request::query(q, DisplayType::Bars, style)
}

pub(crate) fn area(q: impl Into<String>, style: Style) -> Request {
    Request::query(q, DisplayType::Area, style)
}
