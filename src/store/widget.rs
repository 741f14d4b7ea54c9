//! 画布组件状态：至多一个激活描述符 + 加载标志
//!
//! 设置新描述符会整体替换旧值，不做合并。

use serde::Serialize;
use tokio::sync::watch;

use crate::widget::WidgetDescriptor;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WidgetState {
    pub active: Option<WidgetDescriptor>,
    pub is_loading: bool,
}

#[derive(Debug)]
pub struct WidgetStore {
    state: watch::Sender<WidgetState>,
}

impl WidgetStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(WidgetState::default());
        Self { state }
    }

    pub fn set_active(&self, widget: WidgetDescriptor) {
        self.state.send_modify(|s| s.active = Some(widget));
    }

    pub fn clear(&self) {
        self.state.send_modify(|s| s.active = None);
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.is_loading = loading);
    }

    pub fn active(&self) -> Option<WidgetDescriptor> {
        self.state.borrow().active.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn snapshot(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{ChartProps, TableProps};

    fn chart(title: &str) -> WidgetDescriptor {
        WidgetDescriptor::SalesChart(ChartProps {
            title: title.into(),
            data: vec![1.0, 2.0, 3.0],
            chart_config: None,
        })
    }

    #[test]
    fn test_set_active_replaces_previous() {
        let store = WidgetStore::new();
        store.set_active(chart("first"));
        store.set_active(WidgetDescriptor::KpiList(TableProps {
            title: "second".into(),
            data: vec![],
        }));

        let active = store.active().unwrap();
        assert_eq!(active.title(), "second");
        assert!(matches!(active, WidgetDescriptor::KpiList(_)));
    }

    #[test]
    fn test_clear_keeps_loading_flag() {
        let store = WidgetStore::new();
        store.set_active(chart("c"));
        store.set_loading(true);
        store.clear();

        assert!(store.active().is_none());
        assert!(store.is_loading());
    }

    #[test]
    fn test_initial_state() {
        let store = WidgetStore::new();
        assert_eq!(store.snapshot(), WidgetState::default());
    }
}
