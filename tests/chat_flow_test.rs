//! 对话回合集成测试：Mock Agent 全流程与失败解析器

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatdash::agent::{AgentResponse, MockAgent, ResolverError, ResponseResolver};
use chatdash::config::AppConfig;
use chatdash::core::{ChatEvent, ChatSession, APOLOGY_MESSAGE};
use chatdash::store::Role;
use chatdash::widget::{TableProps, WidgetComponent, WidgetDescriptor};

struct RejectingResolver;

#[async_trait]
impl ResponseResolver for RejectingResolver {
    async fn resolve(&self, _query: &str) -> Result<AgentResponse, ResolverError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Err(ResolverError::Timeout)
    }
}

#[tokio::test(start_paused = true)]
async fn test_show_me_sales_scenario() {
    let session = ChatSession::with_mock_agent(&AppConfig::default());
    let mut events = session.orchestrator().subscribe_events();

    session.send_user_message("Show me sales").await;

    let messages = session.messages().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Show me sales");

    let agent = &messages[1];
    let expected = MockAgent::respond("Show me sales");
    assert_eq!(agent.role, Role::Agent);
    assert_eq!(agent.content, expected.message);
    assert!(!agent.is_streaming);

    let widget = session.widgets().active().unwrap();
    assert_eq!(widget.component(), WidgetComponent::SalesChart);
    assert_eq!(widget.title(), "Q3 Revenue");
    let WidgetDescriptor::SalesChart(chart) = &widget else {
        panic!("Expected SalesChart");
    };
    assert_eq!(chart.data.len(), 7);
    assert_eq!(session.messages().active_message_id(), Some(agent.id));

    // 每个字符对应一次可观察的前缀
    let mut revealed = 0;
    while let Ok(ev) = events.try_recv() {
        if let ChatEvent::ContentRevealed { content, .. } = ev {
            revealed += 1;
            assert!(expected.message.starts_with(&content));
            assert_eq!(content.chars().count(), revealed);
        }
    }
    assert_eq!(revealed, expected.message.chars().count());
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_only_scenario() {
    let session = ChatSession::with_mock_agent(&AppConfig::default());

    session.send_user_message("   ").await;

    assert_eq!(session.messages().message_count(), 0);
    assert!(!session.orchestrator().is_thinking());
    assert!(!session.widgets().is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_rejecting_resolver_scenario() {
    let session = ChatSession::new(&AppConfig::default(), Arc::new(RejectingResolver));
    let existing = WidgetDescriptor::KpiList(TableProps {
        title: "Existing".into(),
        data: vec![],
    });
    session.widgets().set_active(existing.clone());

    session.send_user_message("Show me sales").await;

    let messages = session.messages().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Agent);
    assert_eq!(messages[1].content, APOLOGY_MESSAGE);
    assert!(messages[1].widget_action.is_none());
    assert_eq!(session.widgets().active(), Some(existing));
    assert!(!session.widgets().is_loading());
    assert!(!session.orchestrator().is_thinking());
}

#[tokio::test(start_paused = true)]
async fn test_widget_follows_latest_turn() {
    let session = ChatSession::with_mock_agent(&AppConfig::default());

    session.send_user_message("Show me the table").await;
    assert_eq!(
        session.widgets().active().unwrap().component(),
        WidgetComponent::KpiList
    );

    session.send_user_message("and the growth?").await;
    let widget = session.widgets().active().unwrap();
    assert_eq!(widget.title(), "User Growth");
    assert_eq!(session.messages().message_count(), 4);
    assert_eq!(
        session.messages().active_message_id(),
        session.messages().last_message().map(|m| m.id)
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_sends_do_not_interleave() {
    let session = Arc::new(ChatSession::with_mock_agent(&AppConfig::default()));

    let handles: Vec<_> = ["sales", "table", "growth"]
        .into_iter()
        .map(|q| {
            let s = session.clone();
            tokio::spawn(async move { s.send_user_message(q).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    let messages = session.messages().messages();
    assert_eq!(messages.len(), 6);
    for pair in messages.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Agent);
        let expected = MockAgent::respond(&pair[0].content);
        assert_eq!(pair[1].content, expected.message);
    }
    assert!(!session.orchestrator().is_streaming());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_in_flight_turn() {
    let session = Arc::new(ChatSession::with_mock_agent(&AppConfig::default()));
    let s = session.clone();
    let turn = tokio::spawn(async move { s.send_user_message("Show me sales").await });

    // 延迟至少 1s，此时仍在等待 Agent
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.shutdown();
    turn.await.unwrap();

    assert_eq!(session.messages().message_count(), 1);
    assert!(session.widgets().active().is_none());
    assert!(!session.widgets().is_loading());

    // 拆除后的提交不再产生回合
    session.send_user_message("table").await;
    assert_eq!(session.messages().message_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_while_thinking_leaves_session_empty() {
    let session = Arc::new(ChatSession::with_mock_agent(&AppConfig::default()));
    let s = session.clone();
    let turn = tokio::spawn(async move { s.send_user_message("Show me sales").await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    session.clear();
    turn.await.unwrap();

    assert_eq!(session.messages().message_count(), 0);
    assert!(session.widgets().active().is_none());
    assert!(session.messages().active_message_id().is_none());
    assert!(!session.widgets().is_loading());

    // 清空后的会话仍可正常使用
    session.send_user_message("table").await;
    assert_eq!(session.messages().message_count(), 2);
    assert_eq!(
        session.widgets().active().unwrap().component(),
        WidgetComponent::KpiList
    );
}
