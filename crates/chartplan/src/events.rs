//! Event wrapper: logs every executed event before delegating.

use crate::hooks::{EventConfig, EventExecutor, TestEvent, TestEvents};
use crate::logger::Logger;

/// Copy of `events` where every executor logs `→ <event>` at `Debug` first.
///
/// A config entry without an executor gets one that only logs. Cases and
/// other passthrough configuration are carried over unchanged. Errors from
/// the original executor propagate untouched.
#[must_use]
pub fn wrap_events<C: 'static>(events: &TestEvents<C>, logger: &Logger) -> TestEvents<C> {
    events
        .iter()
        .map(|(key, event)| {
            let wrapped = match event {
                TestEvent::Exec(exec) => TestEvent::Exec(wrap(key, Some(exec.clone()), logger.clone())),
                TestEvent::Config(config) => TestEvent::Config(EventConfig {
                    exec: Some(wrap(key, config.exec.clone(), logger.clone())),
                    cases: config.cases.clone(),
                }),
            };
            (key.clone(), wrapped)
        })
        .collect()
}

fn wrap<C: 'static>(key: &str, exec: Option<EventExecutor<C>>, logger: Logger) -> EventExecutor<C> {
    let message = format!("    → {key}");
    EventExecutor::new(move |ctx, event| {
        logger.debug(&message);
        match &exec {
            Some(exec) => exec.call(ctx, event),
            None => Box::pin(futures::future::ready(Ok(()))),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::hooks::Event;
    use crate::logger::{capture, LogLevel};
    use serde_json::{json, Map, Value};

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_wrapped_executor_logs_and_delegates() {
        let events: TestEvents<Vec<String>> = TestEvents::new().with_sync_exec("GO", |ctx: &mut Vec<String>, event| {
            ctx.push(event.event_type.clone());
            Ok(())
        });
        let (logger, lines) = capture(LogLevel::Debug);
        let wrapped = wrap_events(&events, &logger);

        let mut ctx = Vec::new();
        wrapped.executor("GO").unwrap().call(&mut ctx, &Event::new("GO")).await.unwrap();

        assert_eq!(ctx, vec!["GO"]);
        assert_eq!(lines.lock().unwrap().clone(), vec![(LogLevel::Debug, "    → GO".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_executor_becomes_logged_noop() {
        let events: TestEvents<()> = TestEvents::new().with_config(
            "PAY",
            EventConfig::without_exec().with_case(payload(json!({"amount": 5}))),
        );
        let (logger, lines) = capture(LogLevel::Debug);
        let wrapped = wrap_events(&events, &logger);

        assert_eq!(wrapped.get("PAY").unwrap().cases(), events.get("PAY").unwrap().cases());
        wrapped.executor("PAY").unwrap().call(&mut (), &Event::new("PAY")).await.unwrap();
        assert_eq!(lines.lock().unwrap().len(), 1);
        assert!(events.executor("PAY").is_none());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let events: TestEvents<()> =
            TestEvents::new().with_sync_exec("BREAK", |_, _| Err("boom".into()));
        let (logger, _) = capture(LogLevel::None);
        let wrapped = wrap_events(&events, &logger);

        let err = wrapped
            .executor("BREAK")
            .unwrap()
            .call(&mut (), &Event::new("BREAK"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
