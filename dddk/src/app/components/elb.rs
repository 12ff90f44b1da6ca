//! Load balancers: classic ELBs and ALB target groups.

use serde::{Deserialize, Serialize};

use super::{area, bars, styles, timeseries};
use crate::api::{Monitor, MonitorOptions, Request, Thresholds};
use crate::app::{Component, Container};

fn host_monitor(query: String, message: String, critical: f64, no_data_timeframe: u64) -> Monitor {
    Monitor::new("metric alert", query, message).with_options(MonitorOptions {
        include_tags: Some(false),
        no_data_timeframe: Some(no_data_timeframe),
        notify_no_data: Some(true),
        new_host_delay: Some(300),
        evaluation_delay: Some(900),
        thresholds: Some(Thresholds::critical(critical)),
        ..Default::default()
    })
}

/// An application load balancer and its target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alb {
    pub name: String,
    /// Prepended to every widget title, useful with several ALBs per app.
    #[serde(default)]
    pub title_prefix: Option<String>,
}

impl Alb {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title_prefix: None,
        }
    }

    fn title(&self, title: &str) -> String {
        match self.title_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix} {title}"),
            _ => title.to_string(),
        }
    }
}

impl Component for Alb {
    fn apply(&self, container: &mut dyn Container) {
        let name = &self.name;

        container.add_widget(
            &self.title("Target group 5xx"),
            timeseries(vec![bars(
                format!("max:aws.elb.httpcode_target_5xx{{name:{name}}}.as_count()"),
                styles::ERROR,
            )]),
        );

        container.add_widget(
            &self.title("Target group 4xx"),
            timeseries(vec![bars(
                format!("max:aws.elb.httpcode_target_4xx{{name:{name}}}.as_count()"),
                styles::ERROR,
            )]),
        );

        container.add_widget(
            &self.title("Host count"),
            timeseries(vec![area(
                format!(
                    "min:aws.elb.healthy_host_count{{name:{name}}}.rollup(min), max:aws.elb.un_healthy_host_count{{name:{name}}}.rollup(max)"
                ),
                styles::TRAFFIC,
            )]),
        );

        container.add_outage_monitor(
            &format!("No healthy hosts on alb {name}"),
            host_monitor(
                format!("min(last_5m):sum:aws.elb.healthy_host_count{{name:{name}}} < 1"),
                format!(
                    "
        {{{{#is_alert}}}}
          Not enough healthy hosts on alb {name}!
        {{{{/is_alert}}}}"
                ),
                1.0,
                900,
            ),
        );

        container.add_warning_monitor(
            &format!("Unheathy host count is high on alb {name}"),
            host_monitor(
                format!("max(last_5m):sum:aws.elb.un_healthy_host_count{{name:{name}}} > 0.05"),
                format!(
                    "
        {{{{#is_alert}}}}
          There are unhealthy hosts on alb {name}!
        {{{{/is_alert}}}}"
                ),
                0.05,
                900,
            ),
        );

        container.add_widget(
            &self.title("Target group traffic (r/s)"),
            timeseries(vec![
                area(
                    format!(
                        "sum:aws.elb.httpcode_target_2xx{{name:{name}}}.as_rate(), sum:aws.elb.httpcode_target_3xx{{name:{name}}}.as_rate()"
                    ),
                    styles::TRAFFIC,
                ),
                Request::line(
                    format!(
                        "week_before(sum:aws.elb.httpcode_target_2xx{{name:{name}}}.as_rate()) + week_before(sum:aws.elb.httpcode_target_3xx{{name:{name}}}.as_rate())"
                    ),
                    styles::WEEK_BEFORE,
                ),
            ]),
        );
    }
}

/// A classic ELB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elb {
    pub name: String,
}

impl Component for Elb {
    fn apply(&self, container: &mut dyn Container) {
        let name = &self.name;

        container.add_widget(
            "ELB Backend connection errors",
            timeseries(vec![bars(
                format!("sum:aws.elb.backend_connection_errors{{name:{name}}}"),
                styles::ERROR,
            )]),
        );

        container.add_widget(
            "Surge queue length",
            timeseries(vec![area(
                format!("max:aws.elb.surge_queue_length{{name:{name}}}"),
                styles::ERROR,
            )]),
        );

        // no_data_timeframe is in minutes
        container.add_outage_monitor(
            &format!("No healty hosts on elb {name}"),
            host_monitor(
                format!("min(last_5m):sum:aws.elb.healthy_host_count{{name:{name}}} < 1"),
                format!(
                    "
        {{{{#is_alert}}}}
          Not enough healthy hosts on elb {name}!
        {{{{/is_alert}}}}"
                ),
                1.0,
                15,
            ),
        );

        container.add_warning_monitor(
            &format!("Unheathy host count is high on elb {name}"),
            host_monitor(
                format!("max(last_5m):sum:aws.elb.un_healthy_host_count{{name:{name}}} > 0.05"),
                format!(
                    "
        {{{{#is_alert}}}}
          There are unhealthy hosts on elb {name}!
        {{{{/is_alert}}}}"
                ),
                0.05,
                15,
            ),
        );

        container.add_widget(
            "Host count",
            timeseries(vec![
                Request::line(
                    format!("min:aws.elb.healthy_host_count{{name:{name}}}.rollup(min)"),
                    styles::TRAFFIC,
                ),
                Request::line(
                    format!("max:aws.elb.un_healthy_host_count{{name:{name}}}.rollup(min)"),
                    styles::TRAFFIC,
                ),
            ]),
        );

        container.add_widget(
            "Response times",
            timeseries(vec![
                Request::line(
                    format!(
                        "avg:aws.elb.latency{{name:{name}}}, avg:aws.elb.latency.p95{{name:{name}}}, avg:aws.elb.latency.p99{{name:{name}}}"
                    ),
                    styles::TRAFFIC,
                ),
                Request::line(
                    format!(
                        "week_before(avg:aws.elb.latency{{name:{name}}}), week_before(avg:aws.elb.latency.p95{{name:{name}}}), week_before(avg:aws.elb.latency.p99{{name:{name}}})"
                    ),
                    styles::WEEK_BEFORE,
                ),
            ]),
        );
    }
}
