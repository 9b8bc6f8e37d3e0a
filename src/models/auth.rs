// src/models/auth.rs

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Papel de um usuário dentro do tenant, vindo da tabela `profiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Inventory,
    Accounting,
    Service,
    User,
    Inactive,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Manager,
        Role::Inventory,
        Role::Accounting,
        Role::Service,
        Role::User,
        Role::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Inventory => "Inventory",
            Role::Accounting => "Accounting",
            Role::Service => "Service",
            Role::User => "User",
            Role::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    // Papel desconhecido no banco vira Err; quem consome trata como "sem
    // permissões" em vez de derrubar a hidratação do perfil.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(())
    }
}

/// Registro da tabela `profiles`, um por usuário autenticável.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub company_id: Option<String>,
}

/// Registro da tabela `licenses`, um por tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub status: String,
    pub expiration_date: String,
}

impl License {
    pub const ACTIVE: &'static str = "Active";

    /// Expiração estritamente anterior a "agora". Data ilegível não conta
    /// como expirada; a licença cai no check de status se estiver errada.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&self.expiration_date) {
            return ts.with_timezone(&Utc) < now;
        }
        if let Ok(date) = NaiveDate::parse_from_str(&self.expiration_date, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return midnight.and_utc() < now;
            }
        }
        false
    }

    pub fn is_valid(&self) -> bool {
        self.status == Self::ACTIVE && !self.is_expired()
    }
}
