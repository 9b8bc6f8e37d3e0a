// src/config.rs

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::remote::session_store::SessionStore;
use crate::remote::supabase::{SupabaseAuthClient, SupabaseDataClient};
use crate::services::session::SessionContext;

/// Configuração lida do ambiente na subida do processo.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: Url,
    pub anon_key: String,
    /// Caminho do arquivo de sessão persistida; ausente = só memória.
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let supabase_url = env::var("SUPABASE_URL")?.parse::<Url>()?;
        let anon_key = env::var("SUPABASE_ANON_KEY")?;
        let session_file = env::var("SESSION_FILE").ok().map(PathBuf::from);

        Ok(Self {
            supabase_url,
            anon_key,
            session_file,
        })
    }
}

/// Estado compartilhado da aplicação: clientes remotos e o contexto de
/// sessão já ligados entre si.
pub struct AppState {
    pub session: SessionContext,
    pub store: Arc<SessionStore>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Ok(Self::from_config(config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_config(config: AppConfig) -> Self {
        let http = reqwest::Client::new();

        let store = Arc::new(match &config.session_file {
            Some(path) => SessionStore::with_file(path.clone()),
            None => SessionStore::in_memory(),
        });

        let auth = Arc::new(SupabaseAuthClient::new(
            http.clone(),
            config.supabase_url.clone(),
            config.anon_key.clone(),
            store.clone(),
        ));
        let data = Arc::new(SupabaseDataClient::new(
            http,
            config.supabase_url,
            config.anon_key,
            store.clone(),
        ));

        tracing::info!("✅ Clientes remotos configurados com sucesso!");

        let session = SessionContext::new(auth, data, store.clone());
        Self { session, store }
    }
}
