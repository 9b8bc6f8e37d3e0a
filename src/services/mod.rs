pub mod account;
pub mod dashboard;
pub mod forms;
pub mod grid;
pub mod session;
pub mod settings;
pub mod transfer;

pub use account::AccountService;
pub use dashboard::{DashboardCounts, DashboardService};
pub use forms::EntityForm;
pub use grid::{GridConfig, RecordGrid};
pub use session::{LoginOutcome, SessionContext, SessionState};
pub use settings::SettingsService;
