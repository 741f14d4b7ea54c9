//! 组件描述符类型
//!
//! 组件名与 props 绑在同一个枚举里（`WidgetDescriptor`），图表组件不可能携带表格 props。
//! JSON 形状与前端约定一致：`{"component": "SalesChart", "props": {...}}`；
//! `WidgetAction` 在同一层再加 `"type": "render_widget"`。

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 可渲染的组件名（封闭集合）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetComponent {
    /// 折线/柱状图表
    SalesChart,
    /// KPI 表格
    #[serde(rename = "KPIList")]
    KpiList,
}

impl WidgetComponent {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetComponent::SalesChart => "SalesChart",
            WidgetComponent::KpiList => "KPIList",
        }
    }
}

impl fmt::Display for WidgetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 图表样式（均可选，渲染端自行决定缺省值）
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u16>,
}

/// 图表 props：标题 + 数值序列 + 可选样式
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartProps {
    pub title: String,
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_config: Option<ChartConfig>,
}

/// 表格单元格：字符串或数字
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// 扁平记录；键的插入顺序即列顺序
pub type TableRow = IndexMap<String, CellValue>;

/// 表格 props：标题 + 扁平记录序列
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableProps {
    pub title: String,
    pub data: Vec<TableRow>,
}

impl TableProps {
    /// 表头取自首行的键；无数据时为空
    pub fn columns(&self) -> Vec<&str> {
        self.data
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// 激活中的组件描述符：组件名 + 对应 props
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", content = "props")]
pub enum WidgetDescriptor {
    SalesChart(ChartProps),
    #[serde(rename = "KPIList")]
    KpiList(TableProps),
}

impl WidgetDescriptor {
    pub fn component(&self) -> WidgetComponent {
        match self {
            WidgetDescriptor::SalesChart(_) => WidgetComponent::SalesChart,
            WidgetDescriptor::KpiList(_) => WidgetComponent::KpiList,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            WidgetDescriptor::SalesChart(p) => &p.title,
            WidgetDescriptor::KpiList(p) => &p.title,
        }
    }
}

/// 渲染指令类型（目前只有一种）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    RenderWidget,
}

/// Agent 回复附带的渲染指令：`{"type": "render_widget", "component": ..., "props": {...}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidgetAction {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    #[serde(flatten)]
    pub widget: WidgetDescriptor,
}

impl WidgetAction {
    pub fn render(widget: WidgetDescriptor) -> Self {
        Self {
            kind: ActionKind::RenderWidget,
            widget,
        }
    }
}
