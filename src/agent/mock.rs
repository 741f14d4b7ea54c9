//! Mock Agent（开发与演示用，无需后端）
//!
//! 按固定顺序做大小写不敏感的子串匹配：sales → table → growth → 默认，首个命中即返回。
//! 顺序即优先级：同时包含 "sales" 与 "table" 的查询走 sales。回复前挂起 [min, max) 的均匀随机时长。

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::agent::{AgentResponse, ResolverError, ResponseResolver};
use crate::config::AgentSection;
use crate::widget::{ChartConfig, ChartProps, TableProps, TableRow, WidgetAction, WidgetDescriptor};

/// 模拟延迟区间（左闭右开）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyWindow {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// 不挂起（测试用）
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// 区间为空（max <= min）时固定取 min
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(2000))
    }
}

/// 关键词规则：(关键词, 回复构造)
type Rule = (&'static str, fn() -> AgentResponse);

const RULES: &[Rule] = &[
    ("sales", sales_response),
    ("table", table_response),
    ("growth", growth_response),
];

/// 基于关键词的 Mock 解析器
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    latency: LatencyWindow,
}

impl MockAgent {
    pub fn new(latency: LatencyWindow) -> Self {
        Self { latency }
    }

    pub fn from_config(cfg: &AgentSection) -> Self {
        Self::new(LatencyWindow::new(
            Duration::from_millis(cfg.min_latency_ms),
            Duration::from_millis(cfg.max_latency_ms),
        ))
    }

    /// 纯匹配，不含延迟
    pub fn respond(query: &str) -> AgentResponse {
        let lower = query.to_lowercase();
        RULES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, build)| build())
            .unwrap_or_else(default_response)
    }
}

#[async_trait]
impl ResponseResolver for MockAgent {
    async fn resolve(&self, query: &str) -> Result<AgentResponse, ResolverError> {
        let delay = self.latency.sample();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "mock agent thinking");
        tokio::time::sleep(delay).await;
        Ok(Self::respond(query))
    }
}

fn chart(title: &str, data: &[f64], background: &str, border: &str) -> WidgetAction {
    WidgetAction::render(WidgetDescriptor::SalesChart(ChartProps {
        title: title.to_string(),
        data: data.to_vec(),
        chart_config: Some(ChartConfig {
            background_color: Some(background.to_string()),
            border_color: Some(border.to_string()),
            border_width: None,
        }),
    }))
}

fn kpi_row(metric: &str, value: f64, change: &str) -> TableRow {
    let mut row = TableRow::new();
    row.insert("metric".into(), metric.into());
    row.insert("value".into(), value.into());
    row.insert("change".into(), change.into());
    row
}

fn sales_response() -> AgentResponse {
    AgentResponse {
        message: "I've analyzed the sales data. Revenue is up 15% compared to last quarter. Here's a visual breakdown:".into(),
        action: chart(
            "Q3 Revenue",
            &[10.0, 20.0, 15.0, 30.0, 25.0, 35.0, 40.0],
            "rgba(75, 192, 192, 0.5)",
            "rgb(75, 192, 192)",
        ),
    }
}

fn table_response() -> AgentResponse {
    AgentResponse {
        message: "Sure, here's the data in a table format:".into(),
        action: WidgetAction::render(WidgetDescriptor::KpiList(TableProps {
            title: "Key Performance Indicators".into(),
            data: vec![
                kpi_row("Revenue", 125000.0, "+15%"),
                kpi_row("Users", 5420.0, "+8%"),
                kpi_row("Conversion", 3.2, "+0.5%"),
                kpi_row("Retention", 87.0, "+2%"),
            ],
        })),
    }
}

fn growth_response() -> AgentResponse {
    AgentResponse {
        message: "Here's the user growth data for the past quarter:".into(),
        action: chart(
            "User Growth",
            &[100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            "rgba(59, 130, 246, 0.5)",
            "rgb(59, 130, 246)",
        ),
    }
}

fn default_response() -> AgentResponse {
    AgentResponse {
        message: "I've analyzed your data. Here's what I found:".into(),
        action: chart(
            "Analytics Overview",
            &[12.0, 19.0, 15.0, 25.0, 22.0, 30.0, 28.0],
            "rgba(255, 205, 86, 0.5)",
            "rgb(255, 205, 86)",
        ),
    }
}
