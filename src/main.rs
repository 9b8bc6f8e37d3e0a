// src/main.rs

use painel_admin::config::AppState;
use painel_admin::services::session::SessionState;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let mut app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Tenta restaurar uma sessão persistida antes de qualquer navegação.
    app_state.session.initialize().await;

    match app_state.session.state() {
        SessionState::Authenticated(active) => {
            tracing::info!(
                "✅ Sessão restaurada para {} (papel: {:?})",
                active.user.email.as_deref().unwrap_or("<sem e-mail>"),
                active.role
            );
        }
        SessionState::Reset => {
            tracing::warn!("⚠️ Sessão local corrompida foi descartada; login necessário.");
        }
        _ => {
            tracing::info!("✅ Nenhuma sessão ativa; aguardando login.");
        }
    }
}
