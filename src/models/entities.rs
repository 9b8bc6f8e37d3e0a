// src/models/entities.rs

use crate::models::records::{OptionSource, SelectOption};
use crate::validation::Rule;

// =============================================================================
//  ESQUEMAS DOS FORMULÁRIOS DE CADASTRO
// =============================================================================
//
// Um descritor estático por tipo de entidade dirige a renderização e a
// validação. O tipo é resolvido para o esquema uma única vez, na construção
// do formulário, e não a cada render.

/// Tipo de entidade cadastrável pelo painel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    User,
    Part,
    Invoice,
    Vendor,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::User => "user",
            EntityKind::Part => "part",
            EntityKind::Invoice => "invoice",
            EntityKind::Vendor => "vendor",
        }
    }

    /// Tabela de destino do insert.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::User => "profiles",
            EntityKind::Part => "parts",
            EntityKind::Invoice => "invoices",
            EntityKind::Vendor => "vendors",
        }
    }

    pub fn schema(&self) -> Vec<FieldDescriptor> {
        match self {
            EntityKind::Customer => vec![
                FieldDescriptor::new("Company Name", "company", InputKind::Text, true, Rule::Name),
                FieldDescriptor::new("Email", "email", InputKind::Email, true, Rule::Email),
                FieldDescriptor::new("Phone", "phone", InputKind::Tel, true, Rule::Phone),
                FieldDescriptor::new("Address", "address", InputKind::Text, true, Rule::Required),
            ],
            EntityKind::User => vec![
                FieldDescriptor::new("Name", "name", InputKind::Text, true, Rule::Name),
                FieldDescriptor::new("Email", "email", InputKind::Email, true, Rule::Email),
                FieldDescriptor::new("Password", "password", InputKind::Password, true, Rule::Required),
                FieldDescriptor::new("Role", "role", InputKind::Select, false, Rule::Required)
                    .with_options(OptionSource::Static(vec![
                        SelectOption::new("Admin", "Admin"),
                        SelectOption::new("User", "User"),
                        SelectOption::new("Service", "Service"),
                        SelectOption::new("Inactive", "Inactive"),
                    ])),
            ],
            EntityKind::Part => vec![
                FieldDescriptor::new("Part Name", "name", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Description", "description", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Cost of Good", "cog", InputKind::Number, true, Rule::Price),
                FieldDescriptor::new("Quantity", "quantity", InputKind::Number, true, Rule::Number),
                FieldDescriptor::new("Product Number", "product_number", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Vendor", "vendor_id", InputKind::Select, false, Rule::Required)
                    .with_options(OptionSource::Vendors),
            ],
            EntityKind::Invoice => vec![
                FieldDescriptor::new("Part Name", "name", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Description", "description", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Cost of Good", "cog", InputKind::Number, true, Rule::Price),
                FieldDescriptor::new("Quantity", "quantity", InputKind::Number, true, Rule::Number),
                FieldDescriptor::new("Product Number", "product_number", InputKind::Text, true, Rule::Required),
                FieldDescriptor::new("Vendor", "vendor", InputKind::Text, true, Rule::Required),
            ],
            EntityKind::Vendor => vec![
                FieldDescriptor::new("Vendor Name", "name", InputKind::Text, true, Rule::Name),
                FieldDescriptor::new("Email", "email", InputKind::Email, true, Rule::Email),
                FieldDescriptor::new("Website", "website", InputKind::Text, true, Rule::Required),
            ],
        }
    }
}

/// Tipo de input do campo, para a camada de renderização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Password,
    Number,
    Select,
}

/// Um campo de formulário: rótulo, nome de armazenamento, tipo de input,
/// obrigatoriedade e regra de validação.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub name: &'static str,
    pub input: InputKind,
    pub required: bool,
    pub rule: Rule,
    pub options: Option<OptionSource>,
}

impl FieldDescriptor {
    pub fn new(
        label: &'static str,
        name: &'static str,
        input: InputKind,
        required: bool,
        rule: Rule,
    ) -> Self {
        Self {
            label,
            name,
            input,
            required,
            rule,
            options: None,
        }
    }

    pub fn with_options(mut self, options: OptionSource) -> Self {
        self.options = Some(options);
        self
    }
}
