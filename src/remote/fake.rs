// src/remote/fake.rs
//
// Implementações em memória das fronteiras remotas, usadas pelos testes de
// serviço. Registram cada chamada para as asserções de "nenhuma chamada
// remota aconteceu".

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::common::error::AppError;
use crate::remote::auth_api::{AuthApi, AuthSession, AuthUser, UserChange};
use crate::remote::data_api::{DataApi, Filter, Row};

fn value_matches(row_value: Option<&Value>, filter_value: &Value) -> bool {
    let Some(row_value) = row_value else {
        return false;
    };
    if row_value == filter_value {
        return true;
    }
    // Ids numéricos chegam como string no filtro; compara a forma textual.
    let rendered = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    rendered(row_value) == rendered(filter_value)
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| value_matches(row.get(&f.column), &f.value))
}

#[derive(Default)]
pub struct FakeDataApi {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    calls: Mutex<Vec<String>>,
    fail_ops: Mutex<HashSet<&'static str>>,
    next_id: AtomicI64,
}

impl FakeDataApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        self.tables.lock().unwrap().insert(table.into(), rows);
    }

    pub fn rows_of(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Faz toda chamada futura da operação falhar com erro remoto.
    pub fn fail_on(&self, op: &'static str) {
        self.fail_ops.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str, table: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(format!("{op}:{table}"));
        if self.fail_ops.lock().unwrap().contains(op) {
            return Err(AppError::Remote(format!("falha simulada em {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DataApi for FakeDataApi {
    async fn select(
        &self,
        table: &str,
        _columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, AppError> {
        self.record("select", table)?;
        Ok(self
            .rows_of(table)
            .into_iter()
            .filter(|row| matches(row, filters))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, AppError> {
        self.record("insert", table)?;
        let mut inserted = Vec::with_capacity(rows.len());
        let mut tables = self.tables.lock().unwrap();
        let stored = tables.entry(table.into()).or_default();
        for mut row in rows {
            if !row.contains_key("id") {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                row.insert("id".into(), json!(id));
            }
            stored.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> Result<(), AppError> {
        self.record("update", table)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches(row, filters)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), AppError> {
        self.record("delete", table)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !matches(row, filters));
        }
        Ok(())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, AppError> {
        self.record("count", table)?;
        Ok(self
            .rows_of(table)
            .iter()
            .filter(|row| matches(row, filters))
            .count() as u64)
    }
}

#[derive(Default)]
pub struct FakeAuthApi {
    pub session: Mutex<Option<AuthSession>>,
    pub sign_in_emails: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<UserChange>>,
    fail_ops: Mutex<HashSet<&'static str>>,
    corrupted: Mutex<bool>,
    pub user_id: Mutex<String>,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self {
            user_id: Mutex::new("u1".into()),
            ..Self::default()
        }
    }

    pub fn fail_on(&self, op: &'static str) {
        self.fail_ops.lock().unwrap().insert(op);
    }

    /// Simula storage local podre: `get_session` passa a devolver corrupção.
    pub fn corrupt_storage(&self) {
        *self.corrupted.lock().unwrap() = true;
    }

    fn should_fail(&self, op: &'static str) -> bool {
        self.fail_ops.lock().unwrap().contains(op)
    }

    fn make_session(&self, email: &str) -> AuthSession {
        AuthSession {
            access_token: "tok".into(),
            refresh_token: Some("refresh".into()),
            expires_at: None,
            user: AuthUser {
                id: self.user_id.lock().unwrap().clone(),
                email: Some(email.into()),
            },
        }
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, AppError> {
        self.sign_in_emails.lock().unwrap().push(email.into());
        if self.should_fail("sign_in") {
            return Err(AppError::Auth("Invalid login credentials".into()));
        }
        let session = self.make_session(email);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthUser, AppError> {
        if self.should_fail("sign_up") {
            return Err(AppError::Auth("User already registered".into()));
        }
        Ok(AuthUser {
            id: self.user_id.lock().unwrap().clone(),
            email: Some(email.into()),
        })
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        if self.should_fail("sign_out") {
            return Err(AppError::Auth("network unreachable".into()));
        }
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, AppError> {
        if *self.corrupted.lock().unwrap() {
            return Err(AppError::StorageCorruption("Invalid Refresh Token".into()));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn update_user(&self, change: UserChange) -> Result<(), AppError> {
        if self.should_fail("update_user") {
            return Err(AppError::Auth("update rejected".into()));
        }
        self.updates.lock().unwrap().push(change);
        Ok(())
    }
}
