// src/shell.rs

use serde_json::Value;

use crate::models::records::{ColumnDescriptor, OptionSource, SelectOption};
use crate::remote::data_api::Row;
use crate::services::grid::GridConfig;
use crate::services::session::{SessionContext, SessionState};
use crate::validation::Rule;

// =============================================================================
//  CASCA DO PAINEL: ROTAS, GUARDA E PRESETS DAS GRADES
// =============================================================================
//
// A guarda é fail-closed: sem estado resolvido ela segura a navegação, e
// permissão faltando nega acesso em vez de renderizar.

/// Rotas do painel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Parts,
    Customers,
    Invoices,
    Vendors,
    Admin,
    MyAccount,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Parts => "/parts",
            Route::Customers => "/customers",
            Route::Invoices => "/invoices",
            Route::Vendors => "/vendors",
            Route::Admin => "/admin",
            Route::MyAccount => "/myaccount",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }

    /// Permissões exigidas (basta UMA delas). Lista vazia em rota autenticada
    /// significa que só a sessão é exigida.
    pub fn required_permissions(&self) -> &'static [&'static str] {
        match self {
            Route::Login | Route::Signup | Route::MyAccount => &[],
            Route::Admin => &["adminSettings"],
            Route::Dashboard
            | Route::Parts
            | Route::Customers
            | Route::Invoices
            | Route::Vendors => &["view"],
        }
    }
}

/// Decisão da guarda para uma rota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// Sessão ainda resolvendo; segura a navegação sem redirecionar.
    Loading,
    RedirectToLogin,
    AccessDenied,
}

pub fn guard(route: Route, session: &SessionContext) -> RouteDecision {
    if !route.requires_auth() {
        return RouteDecision::Render;
    }
    match session.state() {
        SessionState::Uninitialized | SessionState::Loading => RouteDecision::Loading,
        SessionState::Anonymous | SessionState::Reset => RouteDecision::RedirectToLogin,
        SessionState::Authenticated(_) => {
            let required = route.required_permissions();
            if required.is_empty() || session.has_permission(required) {
                RouteDecision::Render
            } else {
                RouteDecision::AccessDenied
            }
        }
    }
}

// =============================================================================
//  Presets de grade por entidade
// =============================================================================
//
// Cada página monta sua grade a partir destes presets; a permissão de
// edição do papel logado entra por parâmetro. Os campos de importação
// obrigatórios são os que carregam regra obrigatória na grade.

fn default_row(fields: &[&str]) -> Row {
    let mut row = Row::new();
    for field in fields {
        row.insert((*field).into(), Value::String(String::new()));
    }
    row
}

fn required_fields(columns: &[ColumnDescriptor]) -> Vec<String> {
    columns
        .iter()
        .filter(|col| col.rule.is_some_and(|r| r.required))
        .map(|col| col.field.clone())
        .collect()
}

pub fn parts_grid(can_edit: bool) -> GridConfig {
    let columns = vec![
        ColumnDescriptor::new("name", "Part Name")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("description", "Description")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("cog", "Cost of Goods")
            .editable(can_edit)
            .with_rule(Rule::Price, true),
        ColumnDescriptor::new("selling_price", "Selling Price")
            .editable(can_edit)
            .with_rule(Rule::Price, false),
        ColumnDescriptor::new("tax", "Tax")
            .editable(can_edit)
            .with_rule(Rule::Price, false),
        ColumnDescriptor::new("total_price", "Total Price")
            .editable(can_edit)
            .with_rule(Rule::Price, false),
        ColumnDescriptor::new("quantity", "Quantity")
            .editable(can_edit)
            .with_rule(Rule::Number, true),
        ColumnDescriptor::new("product_number", "Product Number")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("vendor_id", "Vendor")
            .editable(can_edit)
            .with_rule(Rule::Required, true)
            .with_options(OptionSource::Vendors),
    ];
    let required_import_fields = required_fields(&columns);
    GridConfig {
        default_row: default_row(&[
            "name",
            "description",
            "cog",
            "selling_price",
            "tax",
            "total_price",
            "quantity",
            "product_number",
            "vendor_id",
        ]),
        edit_allowed: can_edit,
        sort_column: "id".into(),
        sort_ascending: false,
        lookup_vendors: true,
        required_import_fields,
        ..GridConfig::new("parts", columns)
    }
}

pub fn customers_grid(can_edit: bool) -> GridConfig {
    let columns = vec![
        ColumnDescriptor::new("company", "Company")
            .editable(can_edit)
            .with_rule(Rule::Name, true),
        ColumnDescriptor::new("email", "Email")
            .editable(can_edit)
            .with_rule(Rule::Email, true),
        ColumnDescriptor::new("phone", "Company Phone")
            .editable(can_edit)
            .with_rule(Rule::Phone, true),
        ColumnDescriptor::new("address", "Company Address")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("poc_name", "Point of Contact Name")
            .editable(can_edit)
            .with_rule(Rule::Name, false),
        ColumnDescriptor::new("poc_email", "POC Email")
            .editable(can_edit)
            .with_rule(Rule::Email, false),
        ColumnDescriptor::new("billing_name", "Billing Name")
            .editable(can_edit)
            .with_rule(Rule::Name, false),
        ColumnDescriptor::new("billing_email", "Billing Email")
            .editable(can_edit)
            .with_rule(Rule::Email, false),
    ];
    let required_import_fields = required_fields(&columns);
    GridConfig {
        default_row: default_row(&[
            "company",
            "email",
            "phone",
            "address",
            "poc_name",
            "poc_email",
            "billing_name",
            "billing_email",
        ]),
        edit_allowed: can_edit,
        sort_column: "company".into(),
        required_import_fields,
        ..GridConfig::new("customers", columns)
    }
}

pub fn vendors_grid(can_edit: bool) -> GridConfig {
    let columns = vec![
        ColumnDescriptor::new("name", "Vendor Name")
            .editable(can_edit)
            .with_rule(Rule::Name, true),
        ColumnDescriptor::new("email", "Email")
            .editable(can_edit)
            .with_rule(Rule::Email, true),
        ColumnDescriptor::new("website", "Website")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
    ];
    let required_import_fields = required_fields(&columns);
    GridConfig {
        default_row: default_row(&["name", "email", "website"]),
        edit_allowed: can_edit,
        sort_column: "name".into(),
        required_import_fields,
        ..GridConfig::new("vendors", columns)
    }
}

pub fn invoices_grid(can_edit: bool) -> GridConfig {
    let columns = vec![
        ColumnDescriptor::new("name", "Part Name")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("description", "Description")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("cog", "Cost of Goods")
            .editable(can_edit)
            .with_rule(Rule::Price, true),
        ColumnDescriptor::new("quantity", "Quantity")
            .editable(can_edit)
            .with_rule(Rule::Number, true),
        ColumnDescriptor::new("product_number", "Product Number")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
        ColumnDescriptor::new("vendor", "Vendor")
            .editable(can_edit)
            .with_rule(Rule::Required, true),
    ];
    let required_import_fields = required_fields(&columns);
    GridConfig {
        default_row: default_row(&[
            "name",
            "description",
            "cog",
            "quantity",
            "product_number",
            "vendor",
        ]),
        edit_allowed: can_edit,
        sort_column: "id".into(),
        sort_ascending: false,
        required_import_fields,
        ..GridConfig::new("invoices", columns)
    }
}

pub fn users_grid(can_edit: bool) -> GridConfig {
    let columns = vec![
        ColumnDescriptor::new("name", "Name").editable(can_edit),
        ColumnDescriptor::new("email", "Email").editable(can_edit),
        ColumnDescriptor::new("role", "Role")
            .editable(can_edit)
            .with_options(OptionSource::Static(vec![
                SelectOption::new("Admin", "Admin"),
                SelectOption::new("User", "User"),
                SelectOption::new("Service", "Service"),
                SelectOption::new("Inactive", "Inactive"),
            ])),
    ];
    GridConfig {
        default_row: default_row(&["name", "email", "role"]),
        edit_allowed: can_edit,
        sort_column: "name".into(),
        ..GridConfig::new("profiles", columns)
    }
}
