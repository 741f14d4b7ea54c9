//! 画布组件：组件名枚举与各组件的强类型 props

pub mod types;

pub use types::{
    ActionKind, CellValue, ChartConfig, ChartProps, TableProps, TableRow, WidgetAction,
    WidgetComponent, WidgetDescriptor,
};
