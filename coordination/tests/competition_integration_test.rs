//! Integration tests for competition mode
//!
//! Runs full submit → fold → project flows through `AppContext` and
//! checks the statistics invariants after every sequence.

mod common;

use common::{win, win_with_correction, FakeBackend};
use coordination::{
    AgentId, AppContext, BackendError, CompeteReply, CompetitionState, CompetitionStatistics,
    EventFilter, Exchange, ExchangeKind, PanelEvent, Slot,
};

fn assert_invariants(stats: &CompetitionStatistics, n: u64) {
    assert_eq!(stats.total_competitions(), n);
    let wins: u64 = AgentId::competitors()
        .iter()
        .map(|a| u64::from(stats.wins(*a)))
        .sum();
    assert_eq!(wins, n);
    for agent in AgentId::competitors() {
        assert_eq!(stats.response_times(*agent).len(), stats.wins(*agent) as usize);
    }
}

fn competition_context(backend: std::sync::Arc<FakeBackend>) -> AppContext {
    let ctx = AppContext::new(backend);
    ctx.set_competition_mode(true);
    ctx
}

/// Test: the documented happy path folds one win and no correction
#[tokio::test]
async fn test_competition_result_end_to_end() {
    common::init_tracing();
    let backend = FakeBackend::new();
    backend.push_compete(Ok(CompeteReply {
        winner: Some("data_analytics".into()),
        winning_time: Some(1.23),
        winning_response: Some("z".into()),
        analyses: Some(Default::default()),
        correction_needed: Some(false),
        ..Default::default()
    }));
    let ctx = competition_context(backend.clone());
    let mut stats_events = ctx
        .bus()
        .subscribe_filtered(EventFilter::new().types(vec!["statistics_changed"]));

    let handle = ctx.submit_message("x").unwrap();
    ctx.wait_idle().await;

    let stats = ctx.statistics();
    assert_invariants(&stats, 1);
    assert_eq!(stats.wins(AgentId::DataAnalytics), 1);
    assert_eq!(stats.response_times(AgentId::DataAnalytics), &[1.23]);

    let board = ctx.leaderboard();
    assert_eq!(board[0].agent, AgentId::DataAnalytics);
    assert_eq!(board[0].avg_response_time, Some(1.23));

    assert!(matches!(
        stats_events.recv().await.unwrap(),
        PanelEvent::StatisticsChanged {
            total_competitions: 1,
            ..
        }
    ));

    let entries = ctx.conversation().snapshot();
    let reply = entries
        .iter()
        .find(|e| e.handle == Some(handle) && e.kind() == ExchangeKind::CompetitionResult)
        .unwrap();
    match reply.exchange() {
        Some(Exchange::CompetitionResult(result)) => {
            assert_eq!(result.winning_response, "z");
            assert!(result.correction.is_none());
            assert!(result.analyses.is_empty());
        }
        other => panic!("expected competition result, got {:?}", other),
    }
    assert!(!reply.analyses_visible);
    assert_eq!(
        ctx.engine().run_state(handle),
        Some(CompetitionState::Resolved)
    );
}

/// Test: a reply missing `winner` changes nothing but the reply slot
#[tokio::test]
async fn test_malformed_result_is_rejected_whole() {
    let backend = FakeBackend::new();
    backend.push_compete(Ok(win("compliance", 2.0)));
    backend.push_compete(Ok(CompeteReply {
        winner: None,
        ..win("compliance", 1.0)
    }));
    let ctx = competition_context(backend.clone());

    ctx.submit_message("first").unwrap();
    ctx.wait_idle().await;
    let notices_before = count_notices(&ctx);

    let handle = ctx.submit_message("second").unwrap();
    ctx.wait_idle().await;

    assert_invariants(&ctx.statistics(), 1);
    assert_eq!(count_notices(&ctx), notices_before + 1);
    assert_eq!(
        ctx.conversation().snapshot().last().unwrap().exchange(),
        Some(&Exchange::notice(
            "Error",
            "Received an unexpected response. Please try again."
        ))
    );
    assert_eq!(ctx.engine().run_state(handle), Some(CompetitionState::Failed));
}

fn count_notices(ctx: &AppContext) -> usize {
    ctx.conversation()
        .snapshot()
        .iter()
        .filter(|e| e.kind() == ExchangeKind::SystemNotice)
        .count()
}

/// Test: transport failure and backend `error` leave statistics untouched
#[tokio::test]
async fn test_failed_competitions_do_not_count() {
    let backend = FakeBackend::new();
    backend.push_compete(Err(BackendError::Transport("timed out".into())));
    backend.push_compete(Ok(CompeteReply {
        error: Some("No certified agents available to compete".into()),
        ..Default::default()
    }));
    let ctx = competition_context(backend.clone());
    let mut failures = ctx
        .bus()
        .subscribe_filtered(EventFilter::new().types(vec!["competition_failed"]));

    ctx.submit_message("a").unwrap();
    ctx.submit_message("b").unwrap();
    ctx.wait_idle().await;

    assert_invariants(&ctx.statistics(), 0);
    assert!(failures.recv().await.is_ok());
    assert!(failures.recv().await.is_ok());
    assert_eq!(ctx.conversation().pending_count(), 0);
}

/// Test: invariants hold across a mixed sequence with corrections
#[tokio::test]
async fn test_statistics_invariants_over_sequence() {
    let backend = FakeBackend::new();
    let replies = [
        win("compliance", 1.0),
        win_with_correction("compliance", 3.0, "risk_forecasting"),
        win_with_correction("systems_integration", 0.5, "systems_integration"),
        win("data_analytics", 2.5),
        win_with_correction("compliance", 2.0, "risk_forecasting"),
    ];
    for reply in replies.iter().cloned() {
        backend.push_compete(Ok(reply));
    }
    let ctx = competition_context(backend.clone());

    for (i, _) in replies.iter().enumerate() {
        ctx.submit_message(&format!("q{}", i)).unwrap();
        ctx.wait_idle().await;
        assert_invariants(&ctx.statistics(), i as u64 + 1);
    }

    let stats = ctx.statistics();
    assert_eq!(stats.wins(AgentId::Compliance), 3);
    assert_eq!(stats.average_response_time(AgentId::Compliance), Some(2.0));
    assert_eq!(stats.corrections(AgentId::RiskForecasting), 2);
    assert_eq!(stats.corrections(AgentId::SystemsIntegration), 1);
    assert_eq!(stats.corrections(AgentId::Compliance), 0);

    let corrections: Vec<_> = ctx
        .conversation()
        .snapshot()
        .iter()
        .filter_map(|e| match e.exchange() {
            Some(Exchange::CompetitionResult(r)) => r.correction.as_ref().map(|c| c.agent),
            _ => None,
        })
        .collect();
    assert_eq!(
        corrections,
        vec![
            AgentId::RiskForecasting,
            AgentId::SystemsIntegration,
            AgentId::RiskForecasting
        ]
    );
}

/// Test: equal wins rank in declaration order, not fold order
#[tokio::test]
async fn test_leaderboard_ties_use_declaration_order() {
    let backend = FakeBackend::new();
    for winner in [
        "project_management",
        "data_analytics",
        "compliance",
        "data_analytics",
        "compliance",
    ] {
        backend.push_compete(Ok(win(winner, 1.0)));
    }
    let ctx = competition_context(backend.clone());

    for i in 0..5 {
        ctx.submit_message(&format!("q{}", i)).unwrap();
    }
    ctx.wait_idle().await;

    let board = ctx.leaderboard();
    let top: Vec<_> = board.iter().take(3).map(|r| (r.rank, r.agent, r.wins)).collect();
    assert_eq!(
        top,
        vec![
            (1, AgentId::Compliance, 2),
            (2, AgentId::DataAnalytics, 2),
            (3, AgentId::ProjectManagement, 1),
        ]
    );
    assert!(board[3..].iter().all(|r| r.wins == 0 && r.avg_response_time.is_none()));
}

/// Test: concurrent competitions resolve independently and in log order
#[tokio::test]
async fn test_concurrent_competitions_resolve_in_place() {
    let backend = FakeBackend::new();
    let first = backend.gate_compete("first");
    let second = backend.gate_compete("second");
    let ctx = competition_context(backend.clone());
    let mut resolved = ctx
        .bus()
        .subscribe_filtered(EventFilter::new().types(vec!["competition_resolved"]));

    let h1 = ctx.submit_message("first").unwrap();
    let h2 = ctx.submit_message("second").unwrap();

    second
        .send(Ok(win_with_correction("implementation_support", 0.9, "compliance")))
        .unwrap();
    assert_eq!(resolved.recv().await.unwrap().handle(), Some(h2));
    assert_invariants(&ctx.statistics(), 1);
    assert_eq!(
        ctx.engine().run_state(h1),
        Some(CompetitionState::AwaitingResult)
    );

    first.send(Ok(win("compliance", 1.4))).unwrap();
    ctx.wait_idle().await;
    assert_invariants(&ctx.statistics(), 2);

    let entries = ctx.conversation().snapshot();
    let winners: Vec<_> = entries
        .iter()
        .filter_map(|e| match &e.slot {
            Slot::Resolved {
                exchange: Exchange::CompetitionResult(r),
            } => Some((e.handle, r.winner)),
            _ => None,
        })
        .collect();
    assert_eq!(
        winners,
        vec![
            (Some(h1), AgentId::Compliance),
            (Some(h2), AgentId::ImplementationSupport)
        ]
    );
}

/// Test: competition placeholders belong to the whole panel
#[tokio::test]
async fn test_competition_placeholder_is_panel_wide() {
    let backend = FakeBackend::new();
    let gate = backend.gate_compete("q");
    let ctx = competition_context(backend.clone());
    ctx.select(AgentId::Compliance);

    let handle = ctx.submit_message("q").unwrap();
    let pending = ctx
        .conversation()
        .snapshot()
        .into_iter()
        .find(|e| e.handle == Some(handle) && e.is_pending())
        .unwrap();
    assert_eq!(pending.slot, Slot::Pending { agent: AgentId::All });

    gate.send(Ok(win("compliance", 1.0))).unwrap();
    ctx.wait_idle().await;

    // Analyses start hidden and toggle per result
    assert_eq!(ctx.toggle_analyses(handle), Ok(true));
    assert_eq!(ctx.toggle_analyses(handle), Ok(false));
}
