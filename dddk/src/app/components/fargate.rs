//! Fargate ECS tasks (not plain ECS).
//!
//! `Fargate` scopes metrics by task family, `FargateService` by unified
//! service tagging (`service` + `env`). Both render the same widgets and
//! monitors.

use serde::{Deserialize, Serialize};

use super::{styles, timeseries, timeseries_with_markers};
use crate::api::{Marker, Monitor, MonitorOptions, Request, Thresholds};
use crate::app::{Component, Container};

const MEMORY_MESSAGE: &str = "
          {{#is_alert}}
            Memory use for container {{container_id}} is too high, if it hits 100% ECS will automatically restart the
            container. This usually causes a few dropped requests before the ELB marks this instance as unhealthy.
          {{/is_alert}}

          {{#is_recovery}}
            Memory use back within threshold.
          {{/is_recovery}}
      ";

const CPU_MESSAGE: &str = "
          {{#is_alert}}
            CPU use for container {{container_id}} is too high, this results in degraded performance and some
            requests may start timing out.
          {{/is_alert}}

          {{#is_recovery}}
            CPU use is back within threshold
          {{/is_recovery}}
                ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fargate {
    pub task_family: String,
}

impl Component for Fargate {
    fn apply(&self, container: &mut dyn Container) {
        let scope = format!("ecs_task_family:{}", self.task_family);
        add_fargate(container, &self.task_family, &scope);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FargateService {
    pub service: String,
    #[serde(default = "default_env")]
    pub env: String,
}

fn default_env() -> String {
    "production".to_string()
}

impl FargateService {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            env: default_env(),
        }
    }
}

impl Component for FargateService {
    fn apply(&self, container: &mut dyn Container) {
        let scope = format!("service:{},env:{}", self.service, self.env);
        add_fargate(container, &self.service, &scope);
    }
}

/// `name` appears in monitor names, `scope` is the metric tag filter.
fn add_fargate(container: &mut dyn Container, name: &str, scope: &str) {
    container.add_widget(
        "Container memory use (%)",
        timeseries_with_markers(
            vec![
                Request::line(
                    format!(
                        "(avg:ecs.fargate.mem.rss{{{scope}}} by {{container_id}}/avg:ecs.fargate.mem.limit{{{scope}}} by {{container_id}})*100"
                    ),
                    styles::MEMORY,
                ),
                Request::line(
                    format!(
                        "(week_before(avg:ecs.fargate.mem.rss{{{scope}}})/week_before(avg:ecs.fargate.mem.limit{{{scope}}}))*100"
                    ),
                    styles::WEEK_BEFORE,
                ),
            ],
            vec![
                Marker::new("y = 70", "warning dashed"),
                Marker::new("y = 90", "error dashed"),
            ],
        ),
    );

    container.add_warning_monitor(
        &format!("Fargate container memory use is high on {name}"),
        Monitor::new(
            "query alert",
            format!(
                "avg(last_15m):(avg:ecs.fargate.mem.rss{{{scope}}} by {{container_id}}/avg:ecs.fargate.mem.limit{{{scope}}} by {{container_id}})*100 > 90"
            ),
            MEMORY_MESSAGE,
        )
        .with_options(MonitorOptions {
            include_tags: Some(false),
            thresholds: Some(Thresholds::critical(90.0)),
            ..Default::default()
        }),
    );

    container.add_widget(
        "Container count",
        timeseries(vec![
            Request::line(
                format!("count_not_null(avg:ecs.fargate.cpu.user{{{scope}}} by {{container_id}})"),
                styles::MEMORY,
            ),
            Request::line(
                format!(
                    "week_before(count_not_null(avg:ecs.fargate.cpu.user{{{scope}}} by {{container_id}}))"
                ),
                styles::WEEK_BEFORE,
            ),
        ]),
    );

    container.add_warning_monitor(
        &format!("Fargate container CPU use is high on {name}"),
        Monitor::new(
            "query alert",
            format!(
                "avg(last_15m):avg:ecs.fargate.cpu.percent{{{scope}}} by {{container_id}} > 80"
            ),
            CPU_MESSAGE,
        )
        .with_options(MonitorOptions {
            include_tags: Some(false),
            thresholds: Some(Thresholds {
                critical: Some(80.0),
                critical_recovery: Some(70.0),
                ..Default::default()
            }),
            ..Default::default()
        }),
    );

    container.add_widget(
        "CPU utilization (fargate)",
        timeseries_with_markers(
            vec![
                Request::line(
                    format!(
                        "autosmooth(avg:ecs.fargate.cpu.percent{{{scope}}} by {{container_id}})"
                    ),
                    styles::CPU,
                ),
                Request::line(
                    format!("autosmooth(week_before(avg:ecs.fargate.cpu.percent{{{scope}}}))"),
                    styles::WEEK_BEFORE,
                ),
            ],
            vec![Marker::new("y < 100", "info solid")],
        ),
    );
}
