#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, Goal, Money, NotificationKind, NotificationSink, NotifyError};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_sink(None).await
}

pub async fn engine_with_sink(
    sink: Option<Arc<dyn NotificationSink>>,
) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let mut builder = Engine::builder().database(db.clone());
    if let Some(sink) = sink {
        builder = builder.notifier(sink);
    }
    let engine = builder.build().await.unwrap();

    engine.new_user("alice").await.unwrap();
    engine.new_user("bob").await.unwrap();
    (engine, db)
}

pub fn money(value: Decimal) -> Money {
    Money::new(value).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(NotificationKind, Goal)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(NotificationKind, Goal)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, kind: NotificationKind, goal: &Goal) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push((kind, goal.clone()));
        Ok(())
    }
}

/// Fails every delivery.
#[derive(Debug, Default)]
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn notify(&self, _kind: NotificationKind, _goal: &Goal) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp down".to_string()))
    }
}
