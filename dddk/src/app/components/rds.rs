//! RDS instances: CPU, connections, IO, storage and burst balances.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{styles, timeseries};
use crate::api::{Monitor, MonitorOptions, Request, Thresholds};
use crate::app::{Component, Container};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rds {
    pub databases: Vec<String>,
}

impl Rds {
    pub fn new<S: Into<String>>(databases: impl IntoIterator<Item = S>) -> Self {
        Self {
            databases: databases.into_iter().map(Into::into).collect(),
        }
    }

    fn each(&self, query: impl Fn(&str) -> Request) -> Vec<Request> {
        self.databases.iter().map(|db| query(db.as_str())).collect()
    }

    fn each_pair(&self, query: impl Fn(&str) -> [Request; 2]) -> Vec<Request> {
        self.databases.iter().flat_map(|db| query(db.as_str())).collect()
    }
}

impl Component for Rds {
    fn apply(&self, container: &mut dyn Container) {
        container.add_widget(
            "RDS CPU",
            timeseries(self.each(|db| {
                Request::line(
                    format!("avg:aws.rds.cpuutilization{{name:{db}}} by {{host}}"),
                    styles::CPU,
                )
            })),
        );

        container.add_widget(
            "RDS Connections",
            timeseries(self.each(|db| {
                Request::line(
                    format!("max:aws.rds.database_connections{{name:{db}}} by {{host}}"),
                    styles::TRAFFIC,
                )
            })),
        );

        for db in &self.databases {
            let monitor = Monitor::new(
                "metric alert",
                format!("min(last_1h):max:aws.rds.burst_balance{{name:{db}}} by {{host}} <= 50"),
                "{{#is_warning}}
            RDS BurstBalance for {{host.name}}  is below 80%. Things will alert if it gets below 50%. Check what is happening on the RDS instance (why are the IOPS so high?).
        {{/is_warning}}

        {{#is_alert}}
            RDS BurstBalance for {{host.name}} is below 50%! IOPS throughput will be throttled if this reaches 0%, possibly resulting in degraded RDS performance. Check what is happening on the RDS instance (why are the IOPS so high?).
        {{/is_alert}}

        {{#is_recovery}}
            RDS BurstBalance for {{host.name}} is looking better now.
        {{/is_recovery}}",
            )
            .with_options(MonitorOptions {
                new_host_delay: Some(300),
                include_tags: Some(false),
                no_data_timeframe: Some(300),
                notify_no_data: Some(true),
                thresholds: Some(Thresholds {
                    critical: Some(50.0),
                    warning: Some(80.0),
                    ..Default::default()
                }),
                ..Default::default()
            });

            container.add_warning_monitor(&format!("RDS burst balance low on {db}"), monitor);
        }

        container.add_widget(
            "Burst balance used",
            timeseries(self.each(|db| {
                Request::line(
                    format!("100 - max:aws.rds.burst_balance{{name:{db}}} by {{host}}"),
                    styles::ERROR,
                )
            })),
        );

        container.add_widget(
            "RDS Memory use",
            timeseries(self.each_pair(|db| {
                [
                    Request::line(
                        format!("max:aws.rds.swap_usage{{name:{db}}} by {{host}}"),
                        styles::MEMORY,
                    ),
                    Request::line(
                        format!("max:aws.rds.freeable_memory{{name:{db}}} by {{host}}"),
                        styles::MEMORY,
                    ),
                ]
            })),
        );

        container.add_widget(
            "RDS io/s",
            timeseries(self.each_pair(|db| {
                [
                    Request::line(
                        format!("autosmooth(avg:aws.rds.read_iops{{name:{db}}} by {{host}})"),
                        styles::TRAFFIC,
                    ),
                    Request::line(
                        format!("autosmooth(avg:aws.rds.write_iops{{name:{db}}} by {{host}})"),
                        styles::TRAFFIC,
                    ),
                ]
            })),
        );

        container.add_widget(
            "RDS storage",
            timeseries(self.each_pair(|db| {
                [
                    Request::line(
                        format!("avg:aws.rds.total_storage_space{{name:{db}}} by {{host}}"),
                        styles::UPPER_BOUND,
                    ),
                    Request::line(
                        format!(
                            "avg:aws.rds.total_storage_space{{name:{db}}} by {{host}} - avg:aws.rds.free_storage_space{{name:{db}}} by {{host}}"
                        ),
                        styles::MEMORY,
                    ),
                ]
            })),
        );

        container.add_widget(
            "RDS latency",
            timeseries(self.each_pair(|db| {
                [
                    Request::line(
                        format!("autosmooth(avg:aws.rds.read_latency{{name:{db}}} by {{host}})"),
                        styles::TRAFFIC,
                    ),
                    Request::line(
                        format!("autosmooth(avg:aws.rds.write_latency{{name:{db}}} by {{host}})"),
                        styles::TRAFFIC,
                    ),
                ]
            })),
        );
    }
}

/// CPU credit monitors for burstable (t-class) RDS instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstableRds {
    pub databases: Vec<String>,
}

impl Component for BurstableRds {
    fn apply(&self, container: &mut dyn Container) {
        for db in &self.databases {
            let mut extra = Map::new();
            extra.insert("notify_audit".to_string(), Value::Bool(false));
            extra.insert("locked".to_string(), Value::Bool(false));
            extra.insert("timeout_h".to_string(), json!(0));
            extra.insert("silenced".to_string(), json!({}));

            let monitor = Monitor::new(
                "metric alert",
                format!("max(last_1h):avg:aws.rds.cpucredit_balance{{name:{db}}} by {{host}} <= 100"),
                "{{#is_warning}}
            RDS CPUCreditBalance for {{host.name}} is below 200. Things will alert if it gets below 50%. Check what is happening on the RDS instance (why is the CPU credit balance depleting?).
        {{/is_warning}}

        {{#is_alert}}
            RDS CPUCreditBalance for {{host.name}} is below 100! Throttling will occur if balance depletes.
        {{/is_alert}}

        {{#is_recovery}}
            RDS CPUCreditBalance for {{host.name}} is looking better now.
        {{/is_recovery}}",
            )
            .with_options(MonitorOptions {
                include_tags: Some(false),
                new_host_delay: Some(3600),
                require_full_window: Some(true),
                notify_no_data: Some(false),
                renotify_interval: Some(0),
                thresholds: Some(Thresholds {
                    critical: Some(100.0),
                    warning: Some(200.0),
                    ..Default::default()
                }),
                extra,
                ..Default::default()
            });

            container.add_warning_monitor(
                &format!("EC2 CPU credit balance is low on {db}"),
                monitor,
            );
        }
    }
}
