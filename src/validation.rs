// src/validation.rs

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
//  REGRAS DE VALIDAÇÃO DE CAMPO
// =============================================================================
//
// Função pura: roda a cada tecla digitada e no submit do formulário, sem
// efeito colateral. As mensagens são as que o painel sempre exibiu; não
// mude o texto sem atualizar a UI junto.

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s-]+$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\+]?[(]?[0-9]{3}[)]?[-\s\.]?[0-9]{3}[-\s\.]?[0-9]{4,6}$").unwrap()
});
// Aceita múltiplos grupos decimais ("1.2.3"). Comportamento de sempre,
// mantido de propósito: tem planilha de cliente que depende disso.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)*$").unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Regra de validação atribuível a um campo de formulário ou coluna da grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Name,
    Email,
    Phone,
    Price,
    Number,
    /// Apenas presença; nenhum padrão associado.
    Required,
}

impl Rule {
    fn pattern(&self) -> Option<&'static Regex> {
        match self {
            Rule::Name => Some(&NAME_RE),
            Rule::Email => Some(&EMAIL_RE),
            Rule::Phone => Some(&PHONE_RE),
            Rule::Price => Some(&PRICE_RE),
            Rule::Number => Some(&NUMBER_RE),
            Rule::Required => None,
        }
    }

    fn error_message(&self) -> &'static str {
        match self {
            Rule::Name => "Invalid name format",
            Rule::Email => "Invalid email format",
            Rule::Phone => "Invalid phone number",
            Rule::Price => "Invalid price",
            Rule::Number => "Invalid contains more than numbers",
            Rule::Required => REQUIRED_MESSAGE,
        }
    }
}

impl FromStr for Rule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Rule::Name),
            "email" => Ok(Rule::Email),
            "phone" => Ok(Rule::Phone),
            "price" => Ok(Rule::Price),
            "number" => Ok(Rule::Number),
            "required" => Ok(Rule::Required),
            _ => Err(()),
        }
    }
}

/// Valida um valor contra uma regra. Devolve a mensagem de erro, ou `None`
/// quando o valor passa.
///
/// Obrigatório + vazio curto-circuita: a mensagem de "required" vence
/// qualquer padrão da regra.
pub fn validate(rule: Rule, value: &str, required: bool) -> Option<&'static str> {
    if required && value.is_empty() {
        return Some(REQUIRED_MESSAGE);
    }
    if !value.is_empty() {
        if let Some(pattern) = rule.pattern() {
            if !pattern.is_match(value) {
                return Some(rule.error_message());
            }
        }
    }
    None
}

/// Variante por nome de regra, para descritores vindos de configuração.
/// Nome desconhecido não tem padrão: só vale o check de obrigatoriedade.
pub fn validate_field(rule_name: &str, value: &str, required: bool) -> Option<&'static str> {
    match rule_name.parse::<Rule>() {
        Ok(rule) => validate(rule, value, required),
        Err(()) => {
            if required && value.is_empty() {
                Some(REQUIRED_MESSAGE)
            } else {
                None
            }
        }
    }
}
