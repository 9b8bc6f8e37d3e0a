// src/common/notify.rs

use std::collections::VecDeque;

use serde::Serialize;

/// Severidade de uma notificação transitória (o "snackbar" do painel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

// Fila de notificações pendentes. Cada operação remota que falha entra aqui;
// nada é descartado silenciosamente. A UI drena a fila e exibe os avisos
// com auto-dismiss.
#[derive(Debug, Default)]
pub struct Notifier {
    queue: VecDeque<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => tracing::error!("🔔 {message}"),
            Severity::Warning => tracing::warn!("🔔 {message}"),
            _ => tracing::info!("🔔 {message}"),
        }
        self.queue.push_back(Notification { severity, message });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    /// Remove e devolve a notificação mais antiga.
    pub fn pop(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    /// Drena a fila inteira, na ordem de chegada.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
