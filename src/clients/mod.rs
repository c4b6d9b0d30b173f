pub mod mail;
pub mod sheets;

pub use mail::{MailClient, OutboundMail, SendGridClient};
pub use sheets::{CellUpdate, GoogleSheetsClient, SheetStore};
