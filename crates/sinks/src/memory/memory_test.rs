//! Memory provider tests

use std::sync::Arc;

use logcast_pipeline::{Provider, Router};
use logcast_protocol::{LevelFilter, LogMessage};

use super::MemoryProvider;

#[test]
fn test_stores_in_order() {
    let provider = MemoryProvider::default();
    assert_eq!(provider.name(), "memory");
    assert!(provider.is_empty());

    provider.log(&LogMessage::info("", "a")).unwrap();
    provider.log(&LogMessage::error("", "b")).unwrap();

    assert_eq!(provider.len(), 2);
    assert_eq!(
        provider.snapshot(),
        vec![LogMessage::info("", "a"), LogMessage::error("", "b")]
    );
}

#[test]
fn test_clear() {
    let provider = MemoryProvider::new("scratch");
    provider.log(&LogMessage::debug("", "x")).unwrap();
    provider.clear();
    assert!(provider.is_empty());
}

#[test]
fn test_behind_router() {
    let router = Router::new();
    let memory = Arc::new(MemoryProvider::new("memory"));
    router.add_provider(memory.clone(), LevelFilter::Warn);

    router.log(&LogMessage::info("app", "skip")).unwrap();
    router.log(&LogMessage::warn("app", "keep")).unwrap();

    assert_eq!(memory.snapshot(), vec![LogMessage::warn("app", "keep")]);
}
