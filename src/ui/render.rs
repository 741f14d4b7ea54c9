//! 界面渲染
//!
//! 左侧对话区：按角色着色、激活消息高亮、逐字输出时显示光标、等待 Agent 时显示 Thinking；
//! 右侧画布：按组件名分派到柱状图（SalesChart）或表格（KPIList）；底部为输入框与快捷键提示。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::core::{ChatPhase, UiState};
use crate::store::Role;
use crate::widget::{CellValue, ChartProps, TableProps, WidgetDescriptor};

const STREAM_CURSOR: &str = "▌";
/// 未配置颜色时的柱状图颜色
const DEFAULT_BAR_COLOR: Color = Color::Cyan;

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 千分位格式化：125000 -> "125,000"，3.2 -> "3.2"
pub fn format_number(n: f64) -> String {
    let raw = format!("{n}");
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// 解析 CSS 的 rgb()/rgba() 颜色；透明度忽略
pub fn parse_css_color(css: &str) -> Option<Color> {
    let css = css.trim();
    let inner = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    Some(Color::Rgb(r, g, b))
}

fn cell_text(v: &CellValue) -> String {
    match v {
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.clone(),
    }
}

/// 绘制一帧
pub fn draw(f: &mut Frame, state: &UiState, input_buffer: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    draw_conversation(f, panes[0], state);
    draw_canvas(f, panes[1], state);
    draw_input(f, rows[1], state, input_buffer);
}

fn draw_conversation(f: &mut Frame, area: Rect, state: &UiState) {
    let phase_str = match state.phase {
        ChatPhase::Idle => "空闲",
        ChatPhase::AwaitingResponse => "思考中…",
        ChatPhase::Streaming => "输出中…",
    };
    let block = Block::default()
        .title(format!(" Chat │ {} ", phase_str))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let content_width = area.width.saturating_sub(2) as usize;

    let mut text_lines: Vec<Line> = Vec::new();
    for (idx, m) in state.messages.iter().enumerate() {
        if idx > 0 {
            text_lines.push(Line::from(Span::raw("")));
        }
        let active = state.active_message_id == Some(m.id);
        let (prefix, color) = match (m.role, active) {
            (Role::User, _) => ("You   ", Color::Cyan),
            (Role::Agent, true) => ("Agent▶", Color::LightGreen),
            (Role::Agent, false) => ("Agent ", Color::Green),
        };
        let mut body = m.content.clone();
        if m.is_streaming {
            body.push_str(STREAM_CURSOR);
        }
        let body_style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let wrapped = wrap_text(&body, content_width.saturating_sub(prefix.chars().count() + 1).max(10));
        for (i, line) in wrapped.into_iter().enumerate() {
            let pref = if i == 0 { prefix } else { "      " };
            text_lines.push(Line::from(vec![
                Span::styled(pref, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(line, body_style),
            ]));
        }
    }
    if state.phase.is_thinking() {
        if !text_lines.is_empty() {
            text_lines.push(Line::from(Span::raw("")));
        }
        text_lines.push(Line::from(Span::styled(
            "Agent  Thinking…",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // 始终滚到底部
    let content_height = area.height.saturating_sub(2) as usize;
    let scroll = text_lines.len().saturating_sub(content_height);
    let paragraph = Paragraph::new(Text::from(text_lines))
        .block(block)
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);
}

fn draw_canvas(f: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .title(" Canvas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    if state.widget_loading {
        let p = Paragraph::new("Loading widget…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    match &state.widget {
        None => {
            let p = Paragraph::new("No widget active")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(p, area);
        }
        Some(WidgetDescriptor::SalesChart(props)) => draw_chart(f, area, block, props),
        Some(WidgetDescriptor::KpiList(props)) => draw_table(f, area, block, props),
    }
}

fn draw_chart(f: &mut Frame, area: Rect, block: Block, props: &ChartProps) {
    let color = props
        .chart_config
        .as_ref()
        .and_then(|c| c.border_color.as_deref())
        .and_then(parse_css_color)
        .unwrap_or(DEFAULT_BAR_COLOR);

    let labels: Vec<String> = (1..=props.data.len()).map(|i| i.to_string()).collect();
    let bars: Vec<(&str, u64)> = labels
        .iter()
        .zip(&props.data)
        .map(|(label, v)| (label.as_str(), v.max(0.0).round() as u64))
        .collect();

    let n = bars.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(2) / n).saturating_sub(1).clamp(1, 9);

    let chart = BarChart::default()
        .block(block.title_bottom(Line::from(Span::styled(
            format!(" {} ", props.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))))
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color));
    f.render_widget(chart, area);
}

fn draw_table(f: &mut Frame, area: Rect, block: Block, props: &TableProps) {
    let columns = props.columns();
    let header = Row::new(columns.iter().map(|c| c.to_string()))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows = props.data.iter().map(|record| {
        Row::new(columns.iter().map(|c| {
            record.get(*c).map(cell_text).unwrap_or_default()
        }))
    });
    let widths = vec![Constraint::Fill(1); columns.len().max(1)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title_bottom(Line::from(Span::styled(
            format!(" {} ", props.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))));
    f.render_widget(table, area);
}

fn draw_input(f: &mut Frame, area: Rect, state: &UiState, input_buffer: &str) {
    let title = if state.input_locked() {
        " 等待回复… "
    } else {
        " 输入 "
    };
    let hint = " Enter 发送 │ ↑↓ 选择回复 │ Ctrl+L 清空 │ Esc/Ctrl+Q 退出 ";
    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let input = Paragraph::new(input_buffer)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(if state.input_locked() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, area);
}
