// src/permissions.rs

use crate::models::auth::Role;

// =============================================================================
//  TABELA ESTÁTICA DE PERMISSÕES
// =============================================================================
//
// Configuração imutável do processo; nada aqui vem do banco. O conjunto é
// recomputado a cada consulta, nunca cacheado. Papel desconhecido ou ausente
// não tem permissão nenhuma (fail-closed).

pub const VIEW: &str = "view";
pub const MANAGE_USERS: &str = "manageUsers";
pub const ADMIN_SETTINGS: &str = "adminSettings";
pub const MANAGE_CUSTOMERS: &str = "manageCustomers";
pub const MANAGE_PARTS: &str = "manageParts";
pub const MANAGE_INVOICES: &str = "manageInvoices";
pub const VIEW_DASHBOARD: &str = "viewDashboard";
pub const MANAGE_VENDORS: &str = "manageVendors";

/// Permissões concedidas a um papel. `Inactive` não entra na tabela.
pub fn permissions_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &[
            VIEW,
            MANAGE_USERS,
            ADMIN_SETTINGS,
            MANAGE_CUSTOMERS,
            MANAGE_PARTS,
            MANAGE_INVOICES,
            VIEW_DASHBOARD,
            MANAGE_VENDORS,
        ],
        Role::Manager => &[VIEW, MANAGE_USERS],
        Role::Inventory => &[VIEW, MANAGE_USERS],
        // "test" sobrou de uma rodada de QA do perfil contábil; remover exige
        // combinar com o time de frontend que ainda consulta a string.
        Role::Accounting => &[VIEW, MANAGE_USERS, MANAGE_CUSTOMERS, "test"],
        Role::Service => &[VIEW, MANAGE_USERS],
        Role::User => &[VIEW],
        Role::Inactive => &[],
    }
}

/// Verdadeiro se o papel possui QUALQUER uma das permissões pedidas.
/// Sem papel (sessão anônima, perfil sem role) → sempre falso.
pub fn has_permission(role: Option<Role>, required: &[&str]) -> bool {
    let Some(role) = role else {
        return false;
    };
    let granted = permissions_for(role);
    required.iter().any(|needed| granted.contains(needed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PERMISSIONS: &[&str] = &[
        VIEW,
        MANAGE_USERS,
        ADMIN_SETTINGS,
        MANAGE_CUSTOMERS,
        MANAGE_PARTS,
        MANAGE_INVOICES,
        VIEW_DASHBOARD,
        MANAGE_VENDORS,
        "test",
    ];

    #[test]
    fn concedida_sse_estiver_no_conjunto_estatico() {
        for role in Role::ALL {
            for permission in ALL_PERMISSIONS {
                let expected = permissions_for(role).contains(permission);
                assert_eq!(
                    has_permission(Some(role), &[permission]),
                    expected,
                    "papel {role:?}, permissão {permission}"
                );
            }
        }
    }

    #[test]
    fn sem_papel_nega_tudo() {
        for permission in ALL_PERMISSIONS {
            assert!(!has_permission(None, &[permission]));
        }
    }

    #[test]
    fn inativo_nega_tudo() {
        for permission in ALL_PERMISSIONS {
            assert!(!has_permission(Some(Role::Inactive), &[permission]));
        }
    }

    #[test]
    fn basta_intersecao_com_uma_das_pedidas() {
        assert!(has_permission(Some(Role::User), &[ADMIN_SETTINGS, VIEW]));
        assert!(!has_permission(Some(Role::User), &[ADMIN_SETTINGS, MANAGE_PARTS]));
    }
}
